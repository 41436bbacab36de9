//! Stage
//!
//! The stage owns everything the engine needs at run time: the timer queue,
//! the sequencer pool, the effect board, the presentation and the random
//! source. Time only moves when the owner calls [`Stage::advance_to`], which
//! fires every wake that has fallen due, in order.
//!
//! # Example
//!
//! ```
//! use reel_core::{LaneSpec, FrameDescriptor, FrameRegistry, FrameContent};
//! use reel_core::{Scene, ScriptedRandom, SequencerPool, Stage, EffectBoard};
//!
//! let registry = FrameRegistry::shared(vec![
//!     FrameDescriptor::typing("a", 3000),
//!     FrameDescriptor::results("b", 2500),
//! ])
//! .unwrap();
//! let mut scene = Scene::new();
//! scene.add_frame("g".into(), "a".into(), FrameContent::command("ls"));
//! scene.add_frame("g".into(), "b".into(), FrameContent::lines(["README.md"]));
//!
//! let pool = SequencerPool::new(LaneSpec::new("main", "g"), registry);
//! let mut stage = Stage::new(pool, EffectBoard::default(), scene, ScriptedRandom::constant(0.5));
//! stage.start();
//! stage.advance_to(3000);
//! assert_eq!(stage.pool().primary().current_index(), 1);
//! ```

use tracing::{debug, info};

use crate::config::{ConfigError, ReelConfig};
use crate::effects::EffectBoard;
use crate::pool::SequencerPool;
use crate::presentation::Presentation;
use crate::random::RandomSource;
use crate::timer::{TimerQueue, TimerService, Wake};

/// Mutable borrows handed to lane code while it handles a wake
pub struct StageContext<'a> {
    /// Where new wakes are scheduled
    pub timer: &'a mut dyn TimerService,
    /// Rendering surface
    pub presentation: &'a mut dyn Presentation,
    /// Jitter source
    pub random: &'a mut dyn RandomSource,
    /// One-shot hooks fired on frame activation
    pub effects: &'a mut EffectBoard,
}

/// Owner of one running presentation
#[derive(Debug)]
pub struct Stage<P, R> {
    timer: TimerQueue,
    pool: SequencerPool,
    effects: EffectBoard,
    presentation: P,
    random: R,
    running: bool,
}

impl<P: Presentation, R: RandomSource> Stage<P, R> {
    /// Assemble a stage from its parts
    pub fn new(pool: SequencerPool, effects: EffectBoard, presentation: P, random: R) -> Self {
        Self {
            timer: TimerQueue::new(),
            pool,
            effects,
            presentation,
            random,
            running: false,
        }
    }

    /// Build the pool and effect board described by `config`
    ///
    /// The first configured lane becomes the primary.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration has no lanes or a lane's frames
    /// do not form a valid registry.
    pub fn from_config(config: &ReelConfig, presentation: P, random: R) -> Result<Self, ConfigError> {
        let mut lanes = config.lanes.iter();
        let primary = lanes
            .next()
            .ok_or_else(|| ConfigError::ValidationError("at least one lane is required".into()))?;

        let mut pool = SequencerPool::new(primary.spec.clone(), primary.registry()?);
        for lane in lanes {
            pool.add_secondary(lane.spec.clone(), lane.registry()?);
        }
        let effects = EffectBoard::new(config.effects.clone());

        debug!(lanes = pool.len(), effects = effects.hooks().len(), "Stage assembled from config");
        Ok(Self::new(pool, effects, presentation, random))
    }

    /// Environment is ready: schedule every lane's start
    ///
    /// Calling it again restarts the whole pool from pool-start time "now".
    pub fn start(&mut self) {
        self.presentation.observe_time(self.timer.now_ms());
        let mut ctx = StageContext {
            timer: &mut self.timer,
            presentation: &mut self.presentation,
            random: &mut self.random,
            effects: &mut self.effects,
        };
        self.pool.start_all(&mut ctx);
        self.running = true;
        info!(at_ms = self.timer.now_ms(), "Stage started");
    }

    /// Stop every lane and abandon running effects
    pub fn stop(&mut self) {
        let mut ctx = StageContext {
            timer: &mut self.timer,
            presentation: &mut self.presentation,
            random: &mut self.random,
            effects: &mut self.effects,
        };
        self.pool.stop_all(&mut ctx);
        self.effects.clear_runs();
        self.running = false;
        info!(at_ms = self.timer.now_ms(), "Stage stopped");
    }

    /// Fire every wake due at or before `now_ms`
    ///
    /// Wakes scheduled while dispatching that also fall due by `now_ms` fire
    /// in the same call. Returns the number of wakes fired.
    pub fn advance_to(&mut self, now_ms: u64) -> usize {
        let mut fired = 0;
        while let Some((handle, wake)) = self.timer.pop_due(now_ms) {
            self.presentation.observe_time(self.timer.now_ms());
            match wake {
                Wake::Effect(run) => {
                    self.effects
                        .on_wake(run, &mut self.timer, &mut self.presentation, &mut self.random);
                }
                _ => {
                    let mut ctx = StageContext {
                        timer: &mut self.timer,
                        presentation: &mut self.presentation,
                        random: &mut self.random,
                        effects: &mut self.effects,
                    };
                    self.pool.dispatch(handle, wake, &mut ctx);
                }
            }
            fired += 1;
        }
        self.timer.set_now(now_ms);
        fired
    }

    /// Due time of the next wake, if any
    pub fn next_due_ms(&mut self) -> Option<u64> {
        self.timer.next_due_ms()
    }

    /// Current virtual time
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.timer.now_ms()
    }

    /// Whether [`Stage::start`] was called without a later [`Stage::stop`]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The lanes
    #[must_use]
    pub fn pool(&self) -> &SequencerPool {
        &self.pool
    }

    /// The one-shot effects
    #[must_use]
    pub fn effects(&self) -> &EffectBoard {
        &self.effects
    }

    /// The presentation
    #[must_use]
    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    /// The presentation, mutably
    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }
}
