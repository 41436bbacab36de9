//! termreel TUI - Terminal surface for reel-core
//!
//! This crate puts a [`reel_core::Stage`] on screen: one bordered pane per
//! lane, redrawn from the in-memory scene whenever it changes. It also hosts
//! the headless runner used for recordings and CI.
//!
//! # Architecture
//!
//! - **App**: event loop, real-time driver, redraw throttling
//! - **Render**: pane layout and the scene widget
//! - **Headless**: virtual-time run that prints the scene journal
//! - **Cli**: flags layered over the reel configuration

pub mod app;
pub mod cli;
pub mod headless;
pub mod render;
pub mod theme;

pub use app::App;
pub use cli::Args;
pub use headless::run_headless;
pub use render::{PaneInfo, SceneView};
