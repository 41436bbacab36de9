//! In-memory scene
//!
//! A [`Scene`] is the model a surface renders from: one slot per frame
//! container, the active cues per group and the progress indicators. It
//! implements [`Presentation`] directly, and can keep a timestamped journal
//! of every visible change for headless runs and tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{PresentError, PresentResult, Presentation, TransitionCue, Visibility};
use crate::config::ReelConfig;
use crate::registry::{FrameId, GroupId};

/// Static content of a frame container
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameContent {
    /// Command revealed by typing frames; `None` means no typing sink
    pub command: Option<String>,
    /// Body lines shown under the prompt
    pub lines: Vec<String>,
    /// Progress indicator rendered inside this frame
    pub progress: Option<String>,
}

impl FrameContent {
    /// Content with a typing sink for `command`
    pub fn command(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            ..Self::default()
        }
    }

    /// Content made of body lines only
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Attach a progress indicator
    #[must_use]
    pub fn with_progress(mut self, target: impl Into<String>) -> Self {
        self.progress = Some(target.into());
        self
    }
}

/// One frame container
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSlot {
    /// Group the container belongs to
    pub group: GroupId,
    /// Current visibility
    pub visibility: Visibility,
    /// Static content
    pub content: FrameContent,
    /// What the typing sink currently displays
    pub typed: String,
}

/// A visible change recorded in the journal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SceneEvent {
    /// A container became the visible frame of its group
    Activated {
        /// Frame id
        frame: FrameId,
    },
    /// A previously visible container was hidden
    Deactivated {
        /// Frame id
        frame: FrameId,
        /// How it was hidden
        visibility: Visibility,
    },
    /// A typing sink changed
    Typed {
        /// Frame id
        frame: FrameId,
        /// Full sink content after the change
        text: String,
    },
    /// A group cue switched on or off
    Cue {
        /// Group id
        group: GroupId,
        /// Which cue
        cue: TransitionCue,
        /// New state
        active: bool,
    },
    /// A progress indicator moved
    Progress {
        /// Target id
        target: String,
        /// New value
        percent: f64,
    },
}

/// Journal record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Timeline position of the change
    pub at_ms: u64,
    /// The change
    #[serde(flatten)]
    pub event: SceneEvent,
}

/// In-memory presentation model
#[derive(Debug, Default)]
pub struct Scene {
    /// Containers by id
    slots: HashMap<FrameId, FrameSlot>,
    /// Insertion order of containers
    order: Vec<FrameId>,
    /// Active cues per group
    cues: HashMap<GroupId, TransitionCue>,
    /// Progress indicators
    progress: HashMap<String, f64>,
    /// Recorded changes, if journaling is enabled
    journal: Option<Vec<JournalEntry>>,
    /// Last observed timeline position
    now_ms: u64,
    /// Bumped on every visible change
    revision: u64,
}

impl Scene {
    /// Empty scene without journal
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one container per configured frame
    #[must_use]
    pub fn from_config(config: &ReelConfig) -> Self {
        let mut scene = Self::new();
        for lane in &config.lanes {
            for frame in &lane.frames {
                scene.add_frame(lane.spec.group.clone(), frame.id.clone(), frame.content.clone());
            }
        }
        scene
    }

    /// Start recording changes
    #[must_use]
    pub fn with_journal(mut self) -> Self {
        self.journal = Some(Vec::new());
        self
    }

    /// Add (or replace) a container
    pub fn add_frame(&mut self, group: GroupId, id: FrameId, content: FrameContent) {
        if let Some(target) = &content.progress {
            self.progress.entry(target.clone()).or_insert(0.0);
        }
        if !self.slots.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.slots.insert(
            id,
            FrameSlot {
                group,
                visibility: Visibility::Hidden,
                content,
                typed: String::new(),
            },
        );
        self.revision += 1;
    }

    /// Remove a container, as if it were absent from the surface
    pub fn remove_frame(&mut self, id: &FrameId) -> Option<FrameSlot> {
        let slot = self.slots.remove(id)?;
        self.order.retain(|f| f != id);
        self.revision += 1;
        Some(slot)
    }

    /// Container by id
    #[must_use]
    pub fn slot(&self, id: &FrameId) -> Option<&FrameSlot> {
        self.slots.get(id)
    }

    /// The visible frame of `group`, if any
    #[must_use]
    pub fn active_frame(&self, group: &GroupId) -> Option<(&FrameId, &FrameSlot)> {
        self.order.iter().find_map(|id| {
            let slot = self.slots.get(id)?;
            (slot.group == *group && slot.visibility.is_active()).then_some((id, slot))
        })
    }

    /// Number of visible frames in `group`
    #[must_use]
    pub fn active_count(&self, group: &GroupId) -> usize {
        self.slots
            .values()
            .filter(|s| s.group == *group && s.visibility.is_active())
            .count()
    }

    /// Cue currently active on `group`
    #[must_use]
    pub fn cue(&self, group: &GroupId) -> Option<TransitionCue> {
        self.cues.get(group).copied()
    }

    /// Current value of a progress indicator
    #[must_use]
    pub fn progress(&self, target: &str) -> Option<f64> {
        self.progress.get(target).copied()
    }

    /// Recorded changes (empty when journaling is off)
    #[must_use]
    pub fn journal(&self) -> &[JournalEntry] {
        self.journal.as_deref().unwrap_or(&[])
    }

    /// Take the recorded changes, leaving the journal empty but enabled
    pub fn drain_journal(&mut self) -> Vec<JournalEntry> {
        self.journal.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Change counter, for redraw decisions
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn record(&mut self, event: SceneEvent) {
        self.revision += 1;
        if let Some(journal) = self.journal.as_mut() {
            journal.push(JournalEntry {
                at_ms: self.now_ms,
                event,
            });
        }
    }
}

impl Presentation for Scene {
    fn group_members(&self, group: &GroupId) -> Vec<FrameId> {
        self.order
            .iter()
            .filter(|id| self.slots.get(*id).is_some_and(|s| s.group == *group))
            .cloned()
            .collect()
    }

    fn set_visibility(&mut self, frame: &FrameId, visibility: Visibility) -> PresentResult<()> {
        let slot = self
            .slots
            .get_mut(frame)
            .ok_or_else(|| PresentError::missing_frame(frame))?;
        let was_active = slot.visibility.is_active();
        slot.visibility = visibility;

        match (was_active, visibility.is_active()) {
            (false, true) => self.record(SceneEvent::Activated {
                frame: frame.clone(),
            }),
            (true, false) => self.record(SceneEvent::Deactivated {
                frame: frame.clone(),
                visibility,
            }),
            _ => {}
        }
        Ok(())
    }

    fn typing_source(&self, frame: &FrameId) -> PresentResult<String> {
        self.slots
            .get(frame)
            .and_then(|s| s.content.command.clone())
            .ok_or_else(|| PresentError::missing_sink(frame))
    }

    fn write_typed(&mut self, frame: &FrameId, text: &str) -> PresentResult<()> {
        let slot = self
            .slots
            .get_mut(frame)
            .filter(|s| s.content.command.is_some())
            .ok_or_else(|| PresentError::missing_sink(frame))?;
        slot.typed.clear();
        slot.typed.push_str(text);
        self.record(SceneEvent::Typed {
            frame: frame.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn set_cue(&mut self, group: &GroupId, cue: TransitionCue, active: bool) {
        if active {
            self.cues.insert(group.clone(), cue);
        } else {
            self.cues.remove(group);
        }
        self.record(SceneEvent::Cue {
            group: group.clone(),
            cue,
            active,
        });
    }

    fn set_progress(&mut self, target: &str, percent: f64) -> PresentResult<()> {
        let value = self
            .progress
            .get_mut(target)
            .ok_or_else(|| PresentError::missing_progress(target))?;
        *value = percent.clamp(0.0, 100.0);
        let percent = *value;
        self.record(SceneEvent::Progress {
            target: target.to_string(),
            percent,
        });
        Ok(())
    }

    fn observe_time(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
    }
}
