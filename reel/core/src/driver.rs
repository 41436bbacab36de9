//! Real-time driver
//!
//! The engine itself only knows virtual milliseconds. This driver maps them
//! onto the tokio clock: virtual time zero is the moment the driver was
//! created, scaled by `time_scale` (2.0 plays twice as fast). The driver
//! decides *when* to call [`Stage::advance_to`]; it never runs engine code on
//! another task.

use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::presentation::Presentation;
use crate::random::RandomSource;
use crate::stage::Stage;

/// Maps tokio time onto a stage's virtual clock
#[derive(Debug, Clone, Copy)]
pub struct RealtimeDriver {
    /// Instant of virtual time zero
    origin: Instant,
    /// Virtual milliseconds per real millisecond
    time_scale: f64,
}

impl RealtimeDriver {
    /// Driver anchored at the current instant
    ///
    /// Non-positive or non-finite scales fall back to 1.0.
    #[must_use]
    pub fn new(time_scale: f64) -> Self {
        Self::with_origin(Instant::now(), time_scale)
    }

    /// Driver anchored at `origin`
    #[must_use]
    pub fn with_origin(origin: Instant, time_scale: f64) -> Self {
        let time_scale = if time_scale.is_finite() && time_scale > 0.0 {
            time_scale
        } else {
            1.0
        };
        Self { origin, time_scale }
    }

    /// Playback speed multiplier
    #[must_use]
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Virtual time corresponding to the current instant
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn virtual_now_ms(&self) -> u64 {
        let real_ms = self.origin.elapsed().as_secs_f64() * 1000.0;
        (real_ms * self.time_scale).floor() as u64
    }

    /// Instant at which virtual time reaches `virtual_ms`
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn instant_for(&self, virtual_ms: u64) -> Instant {
        // One extra nanosecond keeps float rounding from landing just short
        let nanos = (virtual_ms as f64 * 1_000_000.0 / self.time_scale).ceil() as u64;
        let nanos = nanos.saturating_add(1);
        self.origin + Duration::from_nanos(nanos)
    }

    /// Fire everything that is due by now
    ///
    /// Returns the number of wakes fired.
    pub fn catch_up<P: Presentation, R: RandomSource>(&self, stage: &mut Stage<P, R>) -> usize {
        let now = self.virtual_now_ms();
        let fired = stage.advance_to(now);
        if fired > 0 {
            trace!(virtual_ms = now, fired, "Caught up");
        }
        fired
    }

    /// Sleep until the stage's next wake is due, but no longer than `cap`
    pub async fn sleep_until_next<P: Presentation, R: RandomSource>(
        &self,
        stage: &mut Stage<P, R>,
        cap: Duration,
    ) {
        let capped = Instant::now() + cap;
        let deadline = stage
            .next_due_ms()
            .map_or(capped, |due| self.instant_for(due).min(capped));
        tokio::time::sleep_until(deadline).await;
    }
}
