//! Frame runner and the cooperative frame loop.
//!
//! [`FrameRunner::run_frame`] executes one pass of the pipeline:
//!
//! 1. **Measure** -- sample the [`Clock`] once and compute the frame delta.
//! 2. **Clamp** -- bound the delta to `max_dt`.
//! 3. **Simulate** -- feed the scheduler, which runs zero or more ticks.
//! 4. **Produce** -- let an optional [`FrameHook`] enqueue new commands.
//! 5. **Present** -- blend the last two ticks and hand the frame to the
//!    [`PresentationSink`].
//!
//! [`run_loop`] repeats that forever (or until stopped), yielding for the
//! pacing delay after each frame. The pacing delay only throttles the loop;
//! simulation time is always measured by the clock.

use std::time::Duration;

use steadystep_types::SystemState;
use tracing::{debug, info};

use crate::clock::{self, Clock};
use crate::control::{LoopControl, LoopEndReason};
use crate::intake::{CommandQueue, CommandSource};
use crate::scheduler::Scheduler;
use crate::sink::{FrameReport, PresentationSink, SinkError};

/// Errors that can occur while running frames.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The presentation sink failed.
    #[error("sink error: {source}")]
    Sink {
        /// The underlying sink error.
        #[from]
        source: SinkError,
    },
}

/// Called once per frame after the simulation layer, before presentation.
///
/// This is where command producers that live on the loop itself (as
/// opposed to a separate task) push their intent.
pub trait FrameHook<Q> {
    /// Called after the scheduler has run this frame's ticks.
    fn after_simulation(&mut self, frame_index: u64, queue: &mut Q);
}

/// A frame hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHook;

impl<Q> FrameHook<Q> for NoHook {
    fn after_simulation(&mut self, _frame_index: u64, _queue: &mut Q) {}
}

/// Result of a frame loop run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSummary {
    /// Why the loop returned.
    pub end_reason: LoopEndReason,
    /// Frames executed.
    pub frames: u64,
    /// Ticks executed.
    pub ticks: u64,
    /// Authoritative state when the loop returned.
    pub final_state: SystemState,
}

/// Pairs a [`Clock`] with a [`Scheduler`] and runs frames.
#[derive(Debug)]
pub struct FrameRunner<C, Q = CommandQueue> {
    clock: C,
    scheduler: Scheduler<Q>,
    start_ms: i64,
    last_ms: i64,
    frames: u64,
}

impl<C: Clock, Q: CommandSource> FrameRunner<C, Q> {
    /// Create a runner. The clock is sampled once here to anchor the first
    /// frame delta.
    pub fn new(clock: C, scheduler: Scheduler<Q>) -> Self {
        let now = clock.now_ms();
        Self {
            clock,
            scheduler,
            start_ms: now,
            last_ms: now,
            frames: 0,
        }
    }

    /// Run one frame and present it.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Sink`] if the sink fails to present the frame.
    /// The simulation has already advanced when that happens.
    pub fn run_frame(
        &mut self,
        sink: &mut dyn PresentationSink,
    ) -> Result<FrameReport, RunnerError> {
        self.run_frame_with(sink, &mut NoHook)
    }

    /// Run one frame, calling `hook` between simulation and presentation.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Sink`] if the sink fails to present the frame.
    pub fn run_frame_with(
        &mut self,
        sink: &mut dyn PresentationSink,
        hook: &mut dyn FrameHook<Q>,
    ) -> Result<FrameReport, RunnerError> {
        let now = self.clock.now_ms();
        let dt_ms = clock::frame_delta_ms(now, self.last_ms);
        self.last_ms = now;

        let dt = clock::clamp_dt(dt_ms, self.scheduler.config().max_dt);
        let outcome = self.scheduler.advance_frame(dt);
        self.frames = self.frames.saturating_add(1);

        hook.after_simulation(self.frames, self.scheduler.queue_mut());

        let report = FrameReport {
            index: self.frames,
            elapsed_ms: now.saturating_sub(self.start_ms),
            dt_ms,
            steps: outcome.steps,
            capped: outcome.capped,
            alpha: outcome.alpha,
            display: self.scheduler.display_state(),
        };
        sink.consume(&report)?;
        Ok(report)
    }

    /// Frames executed so far.
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// The scheduler driven by this runner.
    pub const fn scheduler(&self) -> &Scheduler<Q> {
        &self.scheduler
    }

    /// The clock sampled by this runner.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    fn summary(&self, end_reason: LoopEndReason) -> LoopSummary {
        LoopSummary {
            end_reason,
            frames: self.frames,
            ticks: self.scheduler.ticks(),
            final_state: *self.scheduler.current(),
        }
    }
}

/// Run frames until a stop is requested or the frame bound is reached.
///
/// With default [`LoopControl`] there is no frame bound, so this only
/// returns after [`LoopControl::request_stop`] or on a sink failure.
///
/// # Errors
///
/// Returns [`RunnerError`] if presenting a frame fails.
pub async fn run_loop<C: Clock, Q: CommandSource>(
    runner: &mut FrameRunner<C, Q>,
    sink: &mut dyn PresentationSink,
    hook: &mut dyn FrameHook<Q>,
    control: &LoopControl,
) -> Result<LoopSummary, RunnerError> {
    info!(
        max_frames = control.max_frames(),
        frame_pacing_ms = control.frame_pacing_ms(),
        "Frame loop starting"
    );

    loop {
        // --- Check pause ---
        if control.is_paused() {
            info!(frame = runner.frames(), "Frame loop paused, waiting for resume...");
            control.wait_if_paused().await;
            info!(frame = runner.frames(), "Frame loop resumed");
        }

        // --- Check stop request (before frame) ---
        if control.is_stop_requested() {
            info!(frame = runner.frames(), "Stop requested");
            return Ok(runner.summary(LoopEndReason::Stopped));
        }

        // --- Execute frame ---
        let report = runner.run_frame_with(sink, hook)?;
        if report.capped {
            debug!(frame = report.index, dt_ms = report.dt_ms, "Frame hit the step cap");
        }

        // --- Check frame limit (after frame) ---
        if control.frame_limit_reached(runner.frames()) {
            info!(
                frame = runner.frames(),
                max_frames = control.max_frames(),
                "Frame limit reached"
            );
            return Ok(runner.summary(LoopEndReason::MaxFramesReached));
        }

        // --- Yield for the pacing delay ---
        let pacing_ms = control.frame_pacing_ms();
        if pacing_ms > 0 {
            tokio::time::sleep(Duration::from_millis(pacing_ms)).await;
        }
    }
}

/// Log the end of a frame loop run.
pub fn log_loop_end(summary: &LoopSummary) {
    info!(
        reason = ?summary.end_reason,
        frames = summary.frames,
        ticks = summary.ticks,
        position = summary.final_state.position,
        velocity = summary.final_state.velocity,
        valid = summary.final_state.valid,
        "Frame loop ended"
    );
}
