//! Presentation Capability
//!
//! The sequencing core never touches a rendering surface directly. Every
//! lookup and visual side effect goes through [`Presentation`], so the
//! engine runs the same against a terminal, a recording, or nothing at all.
//!
//! Lookups can fail with [`PresentError::MissingTarget`]. Callers inside the
//! engine absorb that error: a missing target means "render nothing this
//! step", never "stop the loop".

mod scene;

pub use scene::{FrameContent, FrameSlot, JournalEntry, Scene, SceneEvent};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::{FrameId, GroupId};

/// What kind of target failed to resolve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A frame container
    Frame,
    /// The text sink inside a typing frame
    TypingSink,
    /// A progress indicator
    Progress,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Frame => write!(f, "frame"),
            Self::TypingSink => write!(f, "typing sink"),
            Self::Progress => write!(f, "progress target"),
        }
    }
}

/// Errors surfaced by presentation lookups
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PresentError {
    /// The id does not resolve to anything on the surface
    #[error("missing {kind} '{id}'")]
    MissingTarget {
        /// Kind of target that was looked up
        kind: TargetKind,
        /// The unresolved id
        id: String,
    },
}

impl PresentError {
    /// Missing frame container
    pub fn missing_frame(id: &FrameId) -> Self {
        Self::MissingTarget {
            kind: TargetKind::Frame,
            id: id.to_string(),
        }
    }

    /// Missing typing sink
    pub fn missing_sink(id: &FrameId) -> Self {
        Self::MissingTarget {
            kind: TargetKind::TypingSink,
            id: id.to_string(),
        }
    }

    /// Missing progress indicator
    pub fn missing_progress(target: &str) -> Self {
        Self::MissingTarget {
            kind: TargetKind::Progress,
            id: target.to_string(),
        }
    }
}

/// Result alias for presentation calls
pub type PresentResult<T> = Result<T, PresentError>;

/// Visibility state of a frame container
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    /// The visible frame of its group
    Active,
    /// Not shown
    #[default]
    Hidden,
    /// Not shown, leaving with a fade
    FadedOut,
}

impl Visibility {
    /// Whether the container is currently shown
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Transient visual cue fired on a group container at each transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionCue {
    /// Brief distortion pulse
    Glitch,
}

/// Injected rendering capability
pub trait Presentation {
    /// Every container tagged with `group`, in display order
    fn group_members(&self, group: &GroupId) -> Vec<FrameId>;

    /// Change a container's visibility
    ///
    /// # Errors
    ///
    /// [`PresentError::MissingTarget`] if `frame` has no container.
    fn set_visibility(&mut self, frame: &FrameId, visibility: Visibility) -> PresentResult<()>;

    /// Literal text a typing frame reveals
    ///
    /// # Errors
    ///
    /// [`PresentError::MissingTarget`] if the frame or its sink is missing.
    fn typing_source(&self, frame: &FrameId) -> PresentResult<String>;

    /// Replace the displayed content of a typing frame's sink
    ///
    /// # Errors
    ///
    /// [`PresentError::MissingTarget`] if the frame or its sink is missing.
    fn write_typed(&mut self, frame: &FrameId, text: &str) -> PresentResult<()>;

    /// Switch a transition cue on or off for a group container
    fn set_cue(&mut self, group: &GroupId, cue: TransitionCue, active: bool);

    /// Update a progress indicator (`percent` in `0.0..=100.0`)
    ///
    /// # Errors
    ///
    /// [`PresentError::MissingTarget`] if `target` does not exist.
    fn set_progress(&mut self, target: &str, percent: f64) -> PresentResult<()>;

    /// Informs the surface of the timeline position before a batch of calls
    fn observe_time(&mut self, _now_ms: u64) {}
}
