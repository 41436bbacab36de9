//! Typing Animator
//!
//! Reveals a command into a typing sink one character per tick. The first
//! character appears as soon as the task starts; each later one follows after
//! `base + random * jitter` milliseconds, re-sampled every tick.
//!
//! A sequencer owns exactly one animator, so at most one reveal loop per lane
//! can be writing at any time. Starting a new task cancels the previous one
//! before anything is written.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::random::RandomSource;
use crate::registry::FrameId;
use crate::stage::StageContext;
use crate::timer::{LaneId, TimerHandle, TimerService, Wake};

/// Tick interval profile
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cadence {
    /// Fixed part of every interval
    pub base_ms: u64,
    /// Upper bound of the random part
    pub jitter_ms: u64,
}

impl Cadence {
    /// Main terminal profile
    pub const PRIMARY: Self = Self::new(40, 30);

    /// Mini terminal profile
    pub const SECONDARY: Self = Self::new(30, 20);

    /// Create a profile
    #[must_use]
    pub const fn new(base_ms: u64, jitter_ms: u64) -> Self {
        Self { base_ms, jitter_ms }
    }

    /// Draw the next interval
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn sample(&self, random: &mut dyn RandomSource) -> u64 {
        let jitter = (random.next_unit() * self.jitter_ms as f64).floor() as u64;
        self.base_ms + jitter.min(self.jitter_ms)
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::PRIMARY
    }
}

/// One reveal of one command into one sink
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypingTask {
    sink: FrameId,
    source: String,
    total: usize,
    revealed: usize,
}

impl TypingTask {
    fn new(sink: FrameId, source: String) -> Self {
        let total = source.chars().count();
        Self {
            sink,
            source,
            total,
            revealed: 0,
        }
    }

    /// Frame whose sink receives the text
    #[must_use]
    pub fn sink(&self) -> &FrameId {
        &self.sink
    }

    /// Full text being revealed
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Characters revealed so far
    #[must_use]
    pub fn revealed(&self) -> usize {
        self.revealed
    }

    /// Length of the text in characters
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether every character has been revealed
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.revealed >= self.total
    }

    /// Currently revealed prefix
    #[must_use]
    pub fn prefix(&self) -> &str {
        match self.source.char_indices().nth(self.revealed) {
            Some((end, _)) => &self.source[..end],
            None => &self.source,
        }
    }
}

/// Per-lane typing loop
#[derive(Debug)]
pub struct TypingAnimator {
    /// Lane the wakes are addressed to
    lane: LaneId,
    /// Tick interval profile
    cadence: Cadence,
    /// Current or last finished task
    task: Option<TypingTask>,
    /// The scheduled next tick
    pending: Option<TimerHandle>,
    /// Characters revealed over the animator's lifetime
    ticks: u64,
}

impl TypingAnimator {
    /// Idle animator for `lane`
    #[must_use]
    pub fn new(lane: LaneId, cadence: Cadence) -> Self {
        Self {
            lane,
            cadence,
            task: None,
            pending: None,
            ticks: 0,
        }
    }

    /// Tick interval profile
    #[must_use]
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Current or last finished task
    #[must_use]
    pub fn task(&self) -> Option<&TypingTask> {
        self.task.as_ref()
    }

    /// Whether a reveal is in progress
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_complete())
    }

    /// Handle of the scheduled next tick
    #[must_use]
    pub fn pending(&self) -> Option<TimerHandle> {
        self.pending
    }

    /// Characters revealed over the animator's lifetime
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Start revealing `text` into the sink of `sink`
    ///
    /// Cancels any running task, clears the sink, then reveals the first
    /// character immediately. If the sink cannot be cleared no task starts.
    pub fn start(&mut self, sink: FrameId, text: String, ctx: &mut StageContext<'_>) {
        self.cancel(ctx.timer);

        if let Err(err) = ctx.presentation.write_typed(&sink, "") {
            debug!(lane = %self.lane, error = %err, "Typing sink unavailable, skipping reveal");
            return;
        }

        debug!(lane = %self.lane, sink = %sink, chars = text.chars().count(), "Typing started");
        self.task = Some(TypingTask::new(sink, text));
        self.reveal_next(ctx);
    }

    /// Handle a `Type` wake
    ///
    /// Returns `false` for a stale handle (one that is not the pending tick).
    pub fn on_wake(&mut self, handle: TimerHandle, ctx: &mut StageContext<'_>) -> bool {
        if self.pending != Some(handle) {
            trace!(lane = %self.lane, handle = handle.raw(), "Ignoring stale typing wake");
            return false;
        }
        self.pending = None;
        self.reveal_next(ctx);
        true
    }

    /// Invalidate the pending tick and drop an unfinished task
    ///
    /// Safe to call at any time; a second call has no effect.
    pub fn cancel(&mut self, timer: &mut dyn TimerService) {
        if let Some(handle) = self.pending.take() {
            timer.cancel(handle);
        }
        if self.is_active() {
            trace!(lane = %self.lane, "Typing cancelled mid-reveal");
            self.task = None;
        }
    }

    fn reveal_next(&mut self, ctx: &mut StageContext<'_>) {
        let Some(task) = self.task.as_mut() else {
            return;
        };
        if task.is_complete() {
            return;
        }

        task.revealed += 1;
        self.ticks += 1;
        let written = ctx.presentation.write_typed(&task.sink, task.prefix());
        let complete = task.is_complete();

        if let Err(err) = written {
            debug!(lane = %self.lane, error = %err, "Typing sink vanished, dropping task");
            self.task = None;
            return;
        }

        trace!(lane = %self.lane, revealed = task.revealed, total = task.total, "Typing tick");
        if complete {
            debug!(lane = %self.lane, "Typing finished");
        } else {
            let delay = self.cadence.sample(ctx.random);
            self.pending = Some(ctx.timer.schedule(delay, Wake::Type(self.lane)));
        }
    }
}
