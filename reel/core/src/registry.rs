//! Frame Registry
//!
//! Ordered, fixed lists of frame descriptors. A registry is pure data: it is
//! built once from configuration and then shared read-only with the single
//! sequencer that plays it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a registry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A registry must contain at least one frame
    #[error("frame registry is empty")]
    Empty,

    /// Every frame must stay visible for a positive amount of time
    #[error("frame '{id}' has a zero duration")]
    ZeroDuration {
        /// Offending frame id
        id: String,
    },
}

/// Opaque frame identifier, resolved by the presentation layer
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(String);

impl FrameId {
    /// Create a frame id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FrameId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Group tag: the set of containers among which visibility is exclusive
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Create a group id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// What a frame does when it becomes visible
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    /// Reveals its command character by character
    Typing,
    /// Shows a command in progress
    Running,
    /// Shows finished output
    #[default]
    Results,
}

impl FrameKind {
    /// Whether activation starts a typing task
    #[must_use]
    pub fn is_typing(self) -> bool {
        matches!(self, Self::Typing)
    }
}

/// One discrete state of a looping presentation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDescriptor {
    /// Identifier resolved by the presentation layer
    pub id: FrameId,
    /// How long the frame stays visible, in milliseconds
    pub duration_ms: u64,
    /// Frame behavior on activation
    pub kind: FrameKind,
}

impl FrameDescriptor {
    /// Create a descriptor
    pub fn new(id: impl Into<FrameId>, duration_ms: u64, kind: FrameKind) -> Self {
        Self {
            id: id.into(),
            duration_ms,
            kind,
        }
    }

    /// Shorthand for a typing frame
    pub fn typing(id: impl Into<FrameId>, duration_ms: u64) -> Self {
        Self::new(id, duration_ms, FrameKind::Typing)
    }

    /// Shorthand for a running frame
    pub fn running(id: impl Into<FrameId>, duration_ms: u64) -> Self {
        Self::new(id, duration_ms, FrameKind::Running)
    }

    /// Shorthand for a results frame
    pub fn results(id: impl Into<FrameId>, duration_ms: u64) -> Self {
        Self::new(id, duration_ms, FrameKind::Results)
    }
}

impl From<String> for FrameId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Ordered, non-empty sequence of frames
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRegistry {
    frames: Vec<FrameDescriptor>,
}

impl FrameRegistry {
    /// Build a registry, rejecting empty lists and zero durations
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the list is empty or a frame has a
    /// zero duration.
    pub fn new(frames: Vec<FrameDescriptor>) -> Result<Self, RegistryError> {
        if frames.is_empty() {
            return Err(RegistryError::Empty);
        }
        if let Some(frame) = frames.iter().find(|f| f.duration_ms == 0) {
            return Err(RegistryError::ZeroDuration {
                id: frame.id.to_string(),
            });
        }
        Ok(Self { frames })
    }

    /// Build a registry and wrap it for sharing with a sequencer
    ///
    /// # Errors
    ///
    /// Same as [`FrameRegistry::new`].
    pub fn shared(frames: Vec<FrameDescriptor>) -> Result<Arc<Self>, RegistryError> {
        Self::new(frames).map(Arc::new)
    }

    /// Number of frames (always at least one)
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; kept for API symmetry with collections
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at `index`, if in range
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FrameDescriptor> {
        self.frames.get(index)
    }

    /// Frame at `index` wrapped into range
    #[must_use]
    pub fn at(&self, index: usize) -> &FrameDescriptor {
        &self.frames[index % self.frames.len()]
    }

    /// Index following `index`, wrapping at the end
    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.frames.len()
    }

    /// Iterate frames in order
    pub fn iter(&self) -> impl Iterator<Item = &FrameDescriptor> {
        self.frames.iter()
    }

    /// Total time of one full cycle
    #[must_use]
    pub fn cycle_ms(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_ms).sum()
    }
}
