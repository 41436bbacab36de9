//! Reel Core - Frame Sequencing and Typing Animation for termreel
//!
//! This crate plays scripted terminal sessions: lanes of frames that loop
//! forever, typing frames that reveal their command one character at a time,
//! and one-shot cosmetic effects keyed by frame id. It has no rendering code;
//! everything visible goes through the [`Presentation`] trait, and time only
//! moves when the owner advances the [`Stage`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Surfaces                                │
//! │   ┌──────────────────┐          ┌─────────────────────────────┐  │
//! │   │  TUI (ratatui)   │          │  Headless (journal output)  │  │
//! │   └────────┬─────────┘          └──────────────┬──────────────┘  │
//! │            │  RealtimeDriver        advance_to │                  │
//! └────────────┼───────────────────────────────────┼──────────────────┘
//!              │                                   │
//! ┌────────────┼───────────────────────────────────┼──────────────────┐
//! │            ▼            REEL CORE              ▼                  │
//! │  ┌────────────────────────────────────────────────────────────┐   │
//! │  │                          Stage                             │   │
//! │  │  ┌────────────┐  ┌────────────────────┐  ┌──────────────┐  │   │
//! │  │  │ TimerQueue │  │   SequencerPool    │  │ EffectBoard  │  │   │
//! │  │  │ (virtual)  │  │  lane 0 │ lane 1 … │  │ (fill runs)  │  │   │
//! │  │  └────────────┘  │ Sequencer+Typing   │  └──────────────┘  │   │
//! │  │                  └────────────────────┘                    │   │
//! │  └──────────────────────────────┬─────────────────────────────┘   │
//! │                                 │ Presentation                    │
//! │                          ┌──────▼──────┐                          │
//! │                          │    Scene    │                          │
//! │                          └─────────────┘                          │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Stage`]: owns the timer queue, lanes, effects, presentation and random source
//! - [`FrameSequencer`]: plays one [`FrameRegistry`] in an endless loop
//! - [`TypingAnimator`]: reveals a command into a typing sink
//! - [`SequencerPool`]: one primary and any number of secondary lanes
//! - [`Scene`]: in-memory [`Presentation`] with an optional journal
//! - [`ReelConfig`]: lanes, frames and effects loaded from TOML
//!
//! # Module Overview
//!
//! - [`registry`]: frame descriptors and registries
//! - [`timer`]: virtual-time wake queue
//! - [`random`]: injectable jitter source
//! - [`typing`]: character-reveal animation
//! - [`sequencer`]: per-lane frame loop
//! - [`pool`]: lane collection
//! - [`effects`]: one-shot effects fired on frame activation
//! - [`presentation`]: rendering capability and the in-memory scene
//! - [`stage`]: wake dispatch
//! - [`driver`]: tokio real-time driver
//! - [`config`]: TOML configuration and the built-in reel
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod driver;
pub mod effects;
pub mod pool;
pub mod presentation;
pub mod random;
pub mod registry;
pub mod sequencer;
pub mod stage;
pub mod timer;
pub mod typing;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, FrameConfig, LaneConfig, ReelConfig,
};
pub use driver::RealtimeDriver;
pub use effects::{EffectBoard, EffectHook, FillHook};
pub use pool::SequencerPool;
pub use presentation::{
    FrameContent, FrameSlot, JournalEntry, PresentError, PresentResult, Presentation, Scene,
    SceneEvent, TargetKind, TransitionCue, Visibility,
};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use registry::{FrameDescriptor, FrameId, FrameKind, FrameRegistry, GroupId, RegistryError};
pub use sequencer::{CueSpec, FrameSequencer, HideStyle, LaneSpec, SequencerPhase};
pub use stage::{Stage, StageContext};
pub use timer::{EffectRunId, LaneId, TimerHandle, TimerQueue, TimerService, Wake};
pub use typing::{Cadence, TypingAnimator, TypingTask};
