//! Timer Service
//!
//! Every animation in the engine is a chain of one-shot wakes on a single
//! timeline. [`TimerService`] is the capability the sequencers see:
//! schedule a wake after a delay, cancel a wake they scheduled.
//!
//! [`TimerQueue`] is the deterministic implementation. It never reads a
//! clock: time only moves when a driver pops due wakes, so tests run on
//! virtual time and the terminal surface feeds it wall-clock milliseconds.
//!
//! Ordering is by due time, ties broken by scheduling order.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a sequencer within the pool (`0` is the primary lane)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneId(pub usize);

impl LaneId {
    /// The primary lane
    pub const PRIMARY: Self = Self(0);
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lane-{}", self.0)
    }
}

/// Identifier of one running effect instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectRunId(pub u64);

/// What should happen when a scheduled wake fires
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wake {
    /// A lane's start delay elapsed
    Start(LaneId),
    /// A lane's current frame duration elapsed
    Advance(LaneId),
    /// A lane's typing task should reveal its next character
    Type(LaneId),
    /// A lane's transition cue should switch off
    CueEnd(LaneId),
    /// An effect run should take its next step
    Effect(EffectRunId),
}

impl Wake {
    /// Lane owning this wake, if any
    #[must_use]
    pub fn lane(self) -> Option<LaneId> {
        match self {
            Self::Start(lane) | Self::Advance(lane) | Self::Type(lane) | Self::CueEnd(lane) => {
                Some(lane)
            }
            Self::Effect(_) => None,
        }
    }
}

/// Handle to a pending wake, used for cancellation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Raw handle value
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Timer capability handed to sequencers and effects
pub trait TimerService {
    /// Current position on the timeline, in milliseconds
    fn now_ms(&self) -> u64;

    /// Schedule `wake` to fire `delay_ms` from now
    fn schedule(&mut self, delay_ms: u64, wake: Wake) -> TimerHandle;

    /// Cancel a pending wake
    ///
    /// Returns `true` if the wake was still pending. Cancelling a handle that
    /// already fired or was already cancelled is a no-op.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}

#[derive(Debug, Clone)]
struct Entry {
    due_ms: u64,
    handle: TimerHandle,
    wake: Wake,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.handle == other.handle
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Handles are issued monotonically, so they double as sequence numbers
        self.due_ms
            .cmp(&other.due_ms)
            .then_with(|| self.handle.cmp(&other.handle))
    }
}

/// Deterministic virtual-time wake queue
#[derive(Debug, Default)]
pub struct TimerQueue {
    /// Min-heap ordered by (due, handle)
    queue: BinaryHeap<Reverse<Entry>>,
    /// Handles that are scheduled and not cancelled
    pending: HashSet<TimerHandle>,
    /// Current virtual time
    now_ms: u64,
    /// Next handle to issue
    next_handle: u64,
}

impl TimerQueue {
    /// Create an empty queue at time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (uncancelled) wakes
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether `handle` is still waiting to fire
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.contains(&handle)
    }

    /// Due time of the earliest live wake
    pub fn next_due_ms(&mut self) -> Option<u64> {
        self.discard_cancelled();
        self.queue.peek().map(|Reverse(e)| e.due_ms)
    }

    /// Pop the earliest live wake due at or before `until_ms`
    ///
    /// The queue clock moves to the wake's due time, so work done while
    /// handling it schedules relative to the moment it was due.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerHandle, Wake)> {
        self.discard_cancelled();
        let due = self.queue.peek().map(|Reverse(e)| e.due_ms)?;
        if due > until_ms {
            return None;
        }
        let Reverse(entry) = self.queue.pop()?;
        self.pending.remove(&entry.handle);
        self.now_ms = self.now_ms.max(entry.due_ms);
        Some((entry.handle, entry.wake))
    }

    /// Move the clock forward without firing anything
    ///
    /// The clock never moves backwards.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Drop every pending wake and rewind to time zero
    pub fn clear(&mut self) {
        self.queue.clear();
        self.pending.clear();
        self.now_ms = 0;
    }

    fn discard_cancelled(&mut self) {
        while let Some(Reverse(top)) = self.queue.peek() {
            if self.pending.contains(&top.handle) {
                break;
            }
            self.queue.pop();
        }
    }
}

impl TimerService for TimerQueue {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn schedule(&mut self, delay_ms: u64, wake: Wake) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.insert(handle);
        self.queue.push(Reverse(Entry {
            due_ms: self.now_ms.saturating_add(delay_ms),
            handle,
            wake,
        }));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.pending.remove(&handle)
    }
}
