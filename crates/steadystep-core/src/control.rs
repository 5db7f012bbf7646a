//! Shared control state for the frame loop.
//!
//! The loop itself has no exit condition. This module provides the
//! external levers: a stop request (wired to a signal handler in the
//! engine), pause/resume, a runtime-adjustable frame pacing delay, and an
//! optional frame bound.
//!
//! # Architecture
//!
//! All mutable fields are atomics so the loop can read them on every frame
//! without locking, while other tasks flip them through a shared [`Arc`].
//!
//! [`Arc`]: std::sync::Arc

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tracing::warn;

/// Default delay between frames, in milliseconds.
pub const FRAME_PACING_MS: u64 = 16;

/// Largest accepted frame pacing delay, in milliseconds.
pub const MAX_FRAME_PACING_MS: u64 = 1_000;

/// Why the frame loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopEndReason {
    /// The configured `max_frames` bound was reached.
    MaxFramesReached,
    /// A stop was requested.
    Stopped,
}

/// Shared frame loop control state.
#[derive(Debug)]
pub struct LoopControl {
    /// Whether the loop is paused.
    paused: AtomicBool,

    /// Wakes the loop when resumed.
    resume_notify: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Delay after each frame in milliseconds.
    frame_pacing_ms: AtomicU64,

    /// Maximum number of frames (0 = unlimited).
    max_frames: u64,
}

impl LoopControl {
    /// Create loop control with the given pacing delay and frame bound.
    ///
    /// A pacing delay above [`MAX_FRAME_PACING_MS`] is clamped to it and a
    /// warning is logged.
    pub fn new(frame_pacing_ms: u64, max_frames: u64) -> Self {
        if frame_pacing_ms > MAX_FRAME_PACING_MS {
            warn!(
                requested_ms = frame_pacing_ms,
                max_ms = MAX_FRAME_PACING_MS,
                "Frame pacing above limit, clamping"
            );
        }
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            frame_pacing_ms: AtomicU64::new(frame_pacing_ms.min(MAX_FRAME_PACING_MS)),
            max_frames,
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether the loop is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the loop after the current frame.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the loop and wake it.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the loop is no longer paused or a stop is requested.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            self.resume_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request the loop to stop before its next frame.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Pacing
    // -----------------------------------------------------------------------

    /// Current delay after each frame in milliseconds.
    pub fn frame_pacing_ms(&self) -> u64 {
        self.frame_pacing_ms.load(Ordering::Acquire)
    }

    /// Change the frame pacing delay.
    ///
    /// Returns the previous delay, or `None` if `ms` exceeds
    /// [`MAX_FRAME_PACING_MS`].
    pub fn set_frame_pacing_ms(&self, ms: u64) -> Option<u64> {
        if ms > MAX_FRAME_PACING_MS {
            return None;
        }
        Some(self.frame_pacing_ms.swap(ms, Ordering::AcqRel))
    }

    // -----------------------------------------------------------------------
    // Bounds
    // -----------------------------------------------------------------------

    /// Configured frame bound (0 = unlimited).
    pub const fn max_frames(&self) -> u64 {
        self.max_frames
    }

    /// Whether `frames` completed frames reach the bound.
    pub const fn frame_limit_reached(&self, frames: u64) -> bool {
        self.max_frames > 0 && frames >= self.max_frames
    }
}

impl Default for LoopControl {
    fn default() -> Self {
        Self::new(FRAME_PACING_MS, 0)
    }
}
