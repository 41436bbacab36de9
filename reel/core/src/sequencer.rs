//! Frame Sequencer
//!
//! Plays one registry as an endless loop: show frame, wait its duration,
//! move to the next index (wrapping), repeat. Within its group exactly one
//! container is visible at a time.
//!
//! # State machine
//!
//! ```text
//!            start wake / start_at()
//!   Idle ───────────────────────────► FrameVisible
//!    ▲                                   │ schedule advance
//!    │ stop()                            ▼
//!    └──────────────────────────── AwaitingAdvance
//!                                        │ advance wake
//!                                        ▼
//!                                   FrameVisible (next index)
//! ```
//!
//! `FrameVisible` only lasts for the synchronous work of [`FrameSequencer::show_frame`].
//! Every wake carries the handle it was scheduled with; a wake whose handle
//! is not the one currently pending is ignored.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::presentation::{TransitionCue, Visibility};
use crate::registry::{FrameDescriptor, FrameRegistry, GroupId};
use crate::stage::StageContext;
use crate::timer::{LaneId, TimerHandle, TimerService, Wake};
use crate::typing::{Cadence, TypingAnimator};

/// Lifecycle phase of a sequencer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SequencerPhase {
    /// Not started, or stopped
    #[default]
    Idle,
    /// Showing a frame (synchronous work in progress)
    FrameVisible,
    /// Frame shown, advance scheduled
    AwaitingAdvance,
}

/// How siblings leave the screen on a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum HideStyle {
    /// Disappear immediately
    #[default]
    Hide,
    /// Fade out
    FadeOut,
}

impl HideStyle {
    /// Visibility applied to hidden siblings
    #[must_use]
    pub fn visibility(self) -> Visibility {
        match self {
            Self::Hide => Visibility::Hidden,
            Self::FadeOut => Visibility::FadedOut,
        }
    }
}

/// Cue pulsed on the group container at every transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueSpec {
    /// Which cue
    pub cue: TransitionCue,
    /// How long it stays on
    pub duration_ms: u64,
}

/// Per-lane behavior
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaneSpec {
    /// Human-readable lane name
    pub name: String,
    /// Group whose containers this lane toggles
    pub group: GroupId,
    /// Delay from pool start to the first frame
    pub start_delay_ms: u64,
    /// Index of the first frame
    pub start_index: usize,
    /// Typing tick profile
    pub cadence: Cadence,
    /// How siblings are hidden
    pub hide: HideStyle,
    /// Optional transition cue
    pub cue: Option<CueSpec>,
}

impl LaneSpec {
    /// Lane with no delay, primary cadence, plain hiding and no cue
    pub fn new(name: impl Into<String>, group: impl Into<GroupId>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            start_delay_ms: 0,
            start_index: 0,
            cadence: Cadence::PRIMARY,
            hide: HideStyle::Hide,
            cue: None,
        }
    }

    /// Set the start delay
    #[must_use]
    pub fn with_start_delay(mut self, delay_ms: u64) -> Self {
        self.start_delay_ms = delay_ms;
        self
    }

    /// Set the first frame index
    #[must_use]
    pub fn with_start_index(mut self, index: usize) -> Self {
        self.start_index = index;
        self
    }

    /// Set the typing cadence
    #[must_use]
    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Set the hide style
    #[must_use]
    pub fn with_hide(mut self, hide: HideStyle) -> Self {
        self.hide = hide;
        self
    }

    /// Set a transition cue
    #[must_use]
    pub fn with_cue(mut self, cue: TransitionCue, duration_ms: u64) -> Self {
        self.cue = Some(CueSpec { cue, duration_ms });
        self
    }
}

/// Cyclic player for one registry
#[derive(Debug)]
pub struct FrameSequencer {
    /// Address of this lane's wakes
    lane: LaneId,
    /// Lane behavior
    spec: LaneSpec,
    /// Frames, shared read-only
    registry: Arc<FrameRegistry>,
    /// Index of the visible frame
    current: usize,
    /// Lifecycle phase
    phase: SequencerPhase,
    /// This lane's typing loop
    typing: TypingAnimator,
    /// Scheduled start
    pending_start: Option<TimerHandle>,
    /// Scheduled advance
    pending_advance: Option<TimerHandle>,
    /// Scheduled cue switch-off
    pending_cue: Option<TimerHandle>,
    /// Advances since the last start
    advances: u64,
}

impl FrameSequencer {
    /// Idle sequencer
    #[must_use]
    pub fn new(lane: LaneId, spec: LaneSpec, registry: Arc<FrameRegistry>) -> Self {
        let typing = TypingAnimator::new(lane, spec.cadence);
        Self {
            lane,
            spec,
            registry,
            current: 0,
            phase: SequencerPhase::Idle,
            typing,
            pending_start: None,
            pending_advance: None,
            pending_cue: None,
            advances: 0,
        }
    }

    /// Lane id
    #[must_use]
    pub fn lane(&self) -> LaneId {
        self.lane
    }

    /// Lane behavior
    #[must_use]
    pub fn spec(&self) -> &LaneSpec {
        &self.spec
    }

    /// Frames played by this lane
    #[must_use]
    pub fn registry(&self) -> &Arc<FrameRegistry> {
        &self.registry
    }

    /// Index of the visible frame
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Descriptor of the visible frame
    #[must_use]
    pub fn current_frame(&self) -> &FrameDescriptor {
        self.registry.at(self.current)
    }

    /// Lifecycle phase
    #[must_use]
    pub fn phase(&self) -> SequencerPhase {
        self.phase
    }

    /// This lane's typing loop
    #[must_use]
    pub fn typing(&self) -> &TypingAnimator {
        &self.typing
    }

    /// Advances since the last start
    #[must_use]
    pub fn advances(&self) -> u64 {
        self.advances
    }

    /// Schedule the first frame after the lane's start delay
    pub fn schedule_start(&mut self, ctx: &mut StageContext<'_>) {
        self.stop(ctx);
        let handle = ctx
            .timer
            .schedule(self.spec.start_delay_ms, Wake::Start(self.lane));
        self.pending_start = Some(handle);
        debug!(lane = %self.lane, name = %self.spec.name, delay_ms = self.spec.start_delay_ms, "Lane start scheduled");
    }

    /// Show the first frame now and begin looping
    pub fn start(&mut self, ctx: &mut StageContext<'_>) {
        self.start_at(self.spec.start_index, ctx);
    }

    /// Show frame `index` (wrapped into range) now and begin looping
    pub fn start_at(&mut self, index: usize, ctx: &mut StageContext<'_>) {
        self.cancel_pending(ctx.timer);
        self.advances = 0;
        info!(lane = %self.lane, name = %self.spec.name, frames = self.registry.len(), "Lane started");
        self.show_frame(index % self.registry.len(), ctx);
        self.schedule_advance(ctx.timer);
    }

    /// Cancel everything this lane scheduled and return to `Idle`
    pub fn stop(&mut self, ctx: &mut StageContext<'_>) {
        self.cancel_pending(ctx.timer);
        if let Some(cue) = self.spec.cue {
            if self.phase != SequencerPhase::Idle {
                ctx.presentation.set_cue(&self.spec.group, cue.cue, false);
            }
        }
        self.typing.cancel(ctx.timer);
        self.current = 0;
        self.advances = 0;
        self.phase = SequencerPhase::Idle;
    }

    /// Handle a wake addressed to this lane
    ///
    /// Returns `false` if the wake was stale or not meant for this lane.
    pub fn on_wake(&mut self, handle: TimerHandle, wake: Wake, ctx: &mut StageContext<'_>) -> bool {
        if wake.lane() != Some(self.lane) {
            return false;
        }
        match wake {
            Wake::Start(_) => {
                if self.pending_start != Some(handle) {
                    return false;
                }
                self.pending_start = None;
                self.start(ctx);
            }
            Wake::Advance(_) => {
                if self.pending_advance != Some(handle) {
                    return false;
                }
                self.pending_advance = None;
                self.advance(ctx);
            }
            Wake::Type(_) => return self.typing.on_wake(handle, ctx),
            Wake::CueEnd(_) => {
                if self.pending_cue != Some(handle) {
                    return false;
                }
                self.pending_cue = None;
                if let Some(cue) = self.spec.cue {
                    ctx.presentation.set_cue(&self.spec.group, cue.cue, false);
                }
            }
            Wake::Effect(_) => return false,
        }
        true
    }

    /// Make frame `index` the only visible frame of the group
    ///
    /// Cancels the running typing task, pulses the transition cue, hides the
    /// siblings, activates the target, starts typing for typing frames and
    /// fires the frame's one-shot hooks. A missing container or sink only
    /// skips the affected side effects.
    pub fn show_frame(&mut self, index: usize, ctx: &mut StageContext<'_>) {
        self.phase = SequencerPhase::FrameVisible;
        self.current = index % self.registry.len();
        let registry = Arc::clone(&self.registry);
        let frame = registry.at(self.current);

        self.typing.cancel(ctx.timer);
        self.pulse_cue(ctx);

        let hidden = self.spec.hide.visibility();
        for member in ctx.presentation.group_members(&self.spec.group) {
            if member != frame.id {
                // Members come from the surface itself, so they resolve
                let _ = ctx.presentation.set_visibility(&member, hidden);
            }
        }

        debug!(lane = %self.lane, index = self.current, frame = %frame.id, kind = ?frame.kind, "Frame shown");
        match ctx.presentation.set_visibility(&frame.id, Visibility::Active) {
            Ok(()) => {
                if frame.kind.is_typing() {
                    match ctx.presentation.typing_source(&frame.id) {
                        Ok(text) => self.typing.start(frame.id.clone(), text, ctx),
                        Err(err) => debug!(lane = %self.lane, error = %err, "No typing sink, skipping reveal"),
                    }
                }
            }
            Err(err) => debug!(lane = %self.lane, error = %err, "Frame container missing, skipping presentation"),
        }

        ctx.effects.trigger(&frame.id, ctx.timer);
    }

    fn advance(&mut self, ctx: &mut StageContext<'_>) {
        let next = self.registry.next_index(self.current);
        self.advances += 1;
        self.show_frame(next, ctx);
        self.schedule_advance(ctx.timer);
    }

    fn schedule_advance(&mut self, timer: &mut dyn TimerService) {
        let duration = self.registry.at(self.current).duration_ms;
        self.pending_advance = Some(timer.schedule(duration, Wake::Advance(self.lane)));
        self.phase = SequencerPhase::AwaitingAdvance;
    }

    fn pulse_cue(&mut self, ctx: &mut StageContext<'_>) {
        let Some(cue) = self.spec.cue else {
            return;
        };
        if let Some(handle) = self.pending_cue.take() {
            ctx.timer.cancel(handle);
        }
        ctx.presentation.set_cue(&self.spec.group, cue.cue, true);
        self.pending_cue = Some(ctx.timer.schedule(cue.duration_ms, Wake::CueEnd(self.lane)));
    }

    fn cancel_pending(&mut self, timer: &mut dyn TimerService) {
        for handle in [
            self.pending_start.take(),
            self.pending_advance.take(),
            self.pending_cue.take(),
        ]
        .into_iter()
        .flatten()
        {
            timer.cancel(handle);
        }
    }
}
