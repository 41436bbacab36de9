//! One-shot Effects
//!
//! Cosmetic side effects keyed by frame id. When a trigger frame becomes
//! active, the board starts an independent run with its own timer chain.
//! Runs are fire-and-forget: they are not tied to the trigger frame's
//! duration and may outlive its visible window. Re-triggering starts a new
//! run alongside any still going.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::presentation::Presentation;
use crate::random::RandomSource;
use crate::registry::FrameId;
use crate::timer::{EffectRunId, TimerService, Wake};

/// Progress fill: climbs from 0 to 100 in random steps
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FillHook {
    /// Frame whose activation starts a run
    pub trigger: FrameId,
    /// Progress indicator to drive
    pub target: String,
    /// Wait between activation and arming; arming resets the bar to 0
    #[serde(default = "default_fill_delay")]
    pub delay_ms: u64,
    /// Interval between steps
    #[serde(default = "default_fill_interval")]
    pub interval_ms: u64,
    /// Smallest step, in percent
    #[serde(default = "default_step_min")]
    pub step_min: f64,
    /// Upper bound of the random extra per step, in percent
    #[serde(default = "default_step_jitter")]
    pub step_jitter: f64,
}

fn default_fill_delay() -> u64 {
    300
}

fn default_fill_interval() -> u64 {
    100
}

fn default_step_min() -> f64 {
    5.0
}

fn default_step_jitter() -> f64 {
    15.0
}

impl FillHook {
    /// Fill hook with the default timing
    pub fn new(trigger: impl Into<FrameId>, target: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            target: target.into(),
            delay_ms: default_fill_delay(),
            interval_ms: default_fill_interval(),
            step_min: default_step_min(),
            step_jitter: default_step_jitter(),
        }
    }
}

/// A registered one-shot effect
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EffectHook {
    /// Progress fill
    Fill(FillHook),
}

impl EffectHook {
    /// Frame whose activation starts this effect
    #[must_use]
    pub fn trigger(&self) -> &FrameId {
        match self {
            Self::Fill(fill) => &fill.trigger,
        }
    }
}

#[derive(Debug, Clone)]
struct FillRun {
    hook: usize,
    progress: f64,
    armed: bool,
}

/// Registered hooks and their in-flight runs
#[derive(Debug, Default)]
pub struct EffectBoard {
    /// Hooks in registration order
    hooks: Vec<EffectHook>,
    /// Runs by id
    runs: HashMap<EffectRunId, FillRun>,
    /// Next run id
    next_run: u64,
}

impl EffectBoard {
    /// Board with `hooks` registered
    #[must_use]
    pub fn new(hooks: Vec<EffectHook>) -> Self {
        Self {
            hooks,
            runs: HashMap::new(),
            next_run: 0,
        }
    }

    /// Registered hooks
    #[must_use]
    pub fn hooks(&self) -> &[EffectHook] {
        &self.hooks
    }

    /// Number of runs still going
    #[must_use]
    pub fn active_runs(&self) -> usize {
        self.runs.len()
    }

    /// Start a run for every hook triggered by `frame`
    ///
    /// Returns the number of runs started.
    pub fn trigger(&mut self, frame: &FrameId, timer: &mut dyn TimerService) -> usize {
        let mut started = 0;
        for (index, hook) in self.hooks.iter().enumerate() {
            if hook.trigger() != frame {
                continue;
            }
            let EffectHook::Fill(fill) = hook;
            let id = EffectRunId(self.next_run);
            self.next_run += 1;
            self.runs.insert(
                id,
                FillRun {
                    hook: index,
                    progress: 0.0,
                    armed: false,
                },
            );
            timer.schedule(fill.delay_ms, Wake::Effect(id));
            debug!(frame = %frame, target = %fill.target, run = id.0, "Fill effect triggered");
            started += 1;
        }
        started
    }

    /// Handle an `Effect` wake
    pub fn on_wake(
        &mut self,
        id: EffectRunId,
        timer: &mut dyn TimerService,
        presentation: &mut dyn Presentation,
        random: &mut dyn RandomSource,
    ) {
        let Some(run) = self.runs.get_mut(&id) else {
            return;
        };
        let Some(EffectHook::Fill(fill)) = self.hooks.get(run.hook) else {
            self.runs.remove(&id);
            return;
        };

        if run.armed {
            run.progress += random.next_unit() * fill.step_jitter + fill.step_min;
        } else {
            run.armed = true;
            run.progress = 0.0;
        }
        let done = run.progress >= 100.0;
        if done {
            run.progress = 100.0;
        }

        if let Err(err) = presentation.set_progress(&fill.target, run.progress) {
            debug!(run = id.0, error = %err, "Fill target unavailable, dropping run");
            self.runs.remove(&id);
            return;
        }
        trace!(run = id.0, progress = run.progress, "Fill step");

        if done {
            debug!(run = id.0, target = %fill.target, "Fill effect finished");
            self.runs.remove(&id);
        } else {
            timer.schedule(fill.interval_ms.max(1), Wake::Effect(id));
        }
    }

    /// Forget every run; their pending wakes become no-ops
    pub fn clear_runs(&mut self) {
        self.runs.clear();
    }
}
