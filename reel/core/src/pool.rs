//! Sequencer Pool
//!
//! One primary lane plus any number of secondary lanes. Every lane loops
//! over its own registry in its own group; the only thing they share is the
//! timer queue. Start delays are all measured from the moment the pool
//! starts, never from another lane's start.

use std::sync::Arc;

use tracing::{debug, info};

use crate::registry::FrameRegistry;
use crate::sequencer::{FrameSequencer, LaneSpec};
use crate::stage::StageContext;
use crate::timer::{LaneId, TimerHandle, Wake};

/// Independent frame sequencers addressed by [`LaneId`]
#[derive(Debug)]
pub struct SequencerPool {
    /// Lane 0 is the primary
    lanes: Vec<FrameSequencer>,
}

impl SequencerPool {
    /// Pool holding only the primary lane
    #[must_use]
    pub fn new(primary: LaneSpec, registry: Arc<FrameRegistry>) -> Self {
        Self {
            lanes: vec![FrameSequencer::new(LaneId::PRIMARY, primary, registry)],
        }
    }

    /// Add a secondary lane and return its id
    pub fn add_secondary(&mut self, spec: LaneSpec, registry: Arc<FrameRegistry>) -> LaneId {
        let lane = LaneId(self.lanes.len());
        debug!(lane = %lane, name = %spec.name, group = %spec.group, "Secondary lane added");
        self.lanes.push(FrameSequencer::new(lane, spec, registry));
        lane
    }

    /// Number of lanes, primary included
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Always false; a pool has at least its primary lane
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// The primary lane
    #[must_use]
    pub fn primary(&self) -> &FrameSequencer {
        &self.lanes[LaneId::PRIMARY.0]
    }

    /// Secondary lanes in the order they were added
    #[must_use]
    pub fn secondaries(&self) -> &[FrameSequencer] {
        &self.lanes[1..]
    }

    /// Every lane, primary first
    #[must_use]
    pub fn lanes(&self) -> &[FrameSequencer] {
        &self.lanes
    }

    /// Look up a lane
    #[must_use]
    pub fn lane(&self, lane: LaneId) -> Option<&FrameSequencer> {
        self.lanes.get(lane.0)
    }

    /// Schedule every lane's first frame after its own start delay
    pub fn start_all(&mut self, ctx: &mut StageContext<'_>) {
        info!(lanes = self.lanes.len(), "Starting sequencer pool");
        for lane in &mut self.lanes {
            lane.schedule_start(ctx);
        }
    }

    /// Stop every lane and reset it to its first frame
    pub fn stop_all(&mut self, ctx: &mut StageContext<'_>) {
        for lane in &mut self.lanes {
            lane.stop(ctx);
        }
        info!("Sequencer pool stopped");
    }

    /// Route a lane wake to its sequencer
    ///
    /// Returns `false` if no lane took it (unknown lane or stale handle).
    pub fn dispatch(&mut self, handle: TimerHandle, wake: Wake, ctx: &mut StageContext<'_>) -> bool {
        let Some(lane) = wake.lane() else {
            return false;
        };
        match self.lanes.get_mut(lane.0) {
            Some(sequencer) => sequencer.on_wake(handle, wake, ctx),
            None => {
                debug!(lane = %lane, "Wake for unknown lane dropped");
                false
            }
        }
    }
}
