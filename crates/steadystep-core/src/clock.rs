//! Monotonic time sampling.
//!
//! The clock is the only source of real time in the system. Its absolute
//! value is meaningless; only the difference between two samples is used.
//!
//! # Design Principles
//!
//! - Time is sampled as signed 64-bit milliseconds. Explicit width, no
//!   overflow in any realistic process lifetime.
//! - The clock is a capability ([`Clock`]) injected into the frame runner,
//!   so tests drive exact frame sequences with a [`ManualClock`].
//! - Frame deltas never go negative and never exceed the configured
//!   maximum once clamped.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic, non-decreasing millisecond time source.
pub trait Clock {
    /// Sample the current time in milliseconds.
    ///
    /// Only differences between two samples are meaningful.
    fn now_ms(&self) -> i64;
}

/// Wall-clock-immune clock backed by [`Instant`].
///
/// Samples are milliseconds elapsed since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> i64 {
        i64::try_from(self.origin.elapsed().as_millis()).unwrap_or(i64::MAX)
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle
/// and hand another to the frame runner.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a manual clock reading `start_ms`.
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    /// Jump to an absolute time. Ignored if it would move the clock
    /// backwards.
    pub fn set(&self, ms: i64) {
        self.now.fetch_max(ms, Ordering::AcqRel);
    }

    /// Move the clock forward by `delta_ms`. Negative deltas are ignored.
    pub fn advance(&self, delta_ms: i64) {
        if delta_ms > 0 {
            let _ = self
                .now
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |now| {
                    Some(now.saturating_add(delta_ms))
                });
        }
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::Acquire)
    }
}

/// Elapsed milliseconds between two samples, never negative.
pub const fn frame_delta_ms(now_ms: i64, last_ms: i64) -> i64 {
    let delta = now_ms.saturating_sub(last_ms);
    if delta < 0 { 0 } else { delta }
}

/// Convert a frame delta to a [`Duration`] clamped to `[0, max_dt]`.
///
/// This is the gate that keeps a stall (debugger, OS scheduling) from
/// turning into a burst of simulation work.
pub fn clamp_dt(delta_ms: i64, max_dt: Duration) -> Duration {
    let millis = u64::try_from(delta_ms).unwrap_or(0);
    Duration::from_millis(millis).min(max_dt)
}
