//! Fixed-step scheduler: the accumulator that turns irregular frame time
//! into a bounded number of deterministic ticks.
//!
//! Each frame the clamped frame delta is added to the accumulator. While at
//! least one fixed step of owed time is available, and the per-frame step
//! cap has not been reached, one tick runs:
//!
//! 1. **Snapshot** -- the current state is copied to `previous` for
//!    interpolation.
//! 2. **Drain** -- up to `max_commands_per_step` queued commands are applied
//!    in FIFO order.
//! 3. **Integrate** -- the state advances by one fixed step.
//!
//! If the cap is hit the remaining owed time is discarded instead of carried
//! forward. Under sustained overload the simulation runs slower than real
//! time; work per frame never grows.
//!
//! Owed time is held as an integer-nanosecond [`Duration`], so conservation
//! is exact: a 50 ms frame always yields exactly five 10 ms ticks.
//!
//! Given the same sequence of frame deltas and enqueued commands, the
//! sequence of states after each tick is bit-identical across runs.

use std::time::Duration;

use steadystep_types::{Command, SystemState};
use tracing::{debug, warn};

use crate::intake::{CommandQueue, CommandSource};
use crate::integrator;
use crate::interpolate;

/// Largest frame delta fed to the accumulator, in seconds.
pub const MAX_DT_SECONDS: f64 = 0.05;

/// Simulation tick length, in seconds.
pub const FIXED_DT_SECONDS: f64 = 0.01;

/// Hard cap on ticks executed in a single frame.
pub const MAX_SIMULATION_STEPS_PER_FRAME: u32 = 5;

/// Commands applied at most per tick.
pub const MAX_COMMANDS_PER_STEP: usize = 4;

/// [`MAX_DT_SECONDS`] as a [`Duration`].
pub const MAX_DT: Duration = Duration::from_millis(50);

/// [`FIXED_DT_SECONDS`] as a [`Duration`].
pub const FIXED_DT: Duration = Duration::from_millis(10);

/// Errors that can occur when building a scheduler.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The scheduler parameters cannot produce progress.
    #[error("invalid scheduler configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },

    /// The initial state is valid but its position is negative or a value
    /// is not finite.
    #[error("inconsistent initial state: position={position}, velocity={velocity}")]
    InconsistentInitialState {
        /// The rejected initial position.
        position: f64,
        /// The rejected initial velocity.
        velocity: f64,
    },
}

/// Timing and budget parameters of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Largest frame delta the accumulator accepts.
    pub max_dt: Duration,
    /// Length of one simulation tick.
    pub fixed_dt: Duration,
    /// Maximum ticks per frame before owed time is discarded.
    pub max_steps_per_frame: u32,
    /// Maximum commands drained per tick.
    pub max_commands_per_step: usize,
}

impl SchedulerConfig {
    /// Check that the parameters allow the scheduler to make progress.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] if the fixed step, the step
    /// cap, or the per-step command budget is zero.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.fixed_dt.is_zero() {
            return Err(SchedulerError::InvalidConfig {
                reason: "fixed_dt must be greater than zero".to_owned(),
            });
        }
        if self.max_steps_per_frame == 0 {
            return Err(SchedulerError::InvalidConfig {
                reason: "max_steps_per_frame must be at least 1".to_owned(),
            });
        }
        if self.max_commands_per_step == 0 {
            return Err(SchedulerError::InvalidConfig {
                reason: "max_commands_per_step must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// The fixed tick length in seconds, as passed to the integrator.
    pub const fn fixed_dt_seconds(&self) -> f64 {
        self.fixed_dt.as_secs_f64()
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_dt: MAX_DT,
            fixed_dt: FIXED_DT,
            max_steps_per_frame: MAX_SIMULATION_STEPS_PER_FRAME,
            max_commands_per_step: MAX_COMMANDS_PER_STEP,
        }
    }
}

/// What happened during one frame of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    /// Ticks executed this frame.
    pub steps: u32,
    /// Whether the step cap was hit and owed time discarded.
    pub capped: bool,
    /// Commands drained and applied across all ticks of the frame.
    pub commands_applied: usize,
    /// Interpolation factor after the frame, in `[0, 1)` unless capped.
    pub alpha: f64,
}

/// The fixed-step scheduler context.
///
/// Owns the accumulator, the current and previous simulation states, and
/// the drain side of the command intake. Nothing here is process-global,
/// so any number of schedulers can run side by side.
#[derive(Debug)]
pub struct Scheduler<Q = CommandQueue> {
    config: SchedulerConfig,
    accumulator: Duration,
    current: SystemState,
    previous: SystemState,
    queue: Q,
    ticks: u64,
}

impl<Q: CommandSource> Scheduler<Q> {
    /// Create a scheduler starting from `initial`, draining `queue`.
    ///
    /// Until the first tick runs, `previous` equals `initial`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] if `config` is invalid, or
    /// [`SchedulerError::InconsistentInitialState`] if `initial` is valid
    /// with a negative position or a non-finite value.
    pub fn new(
        config: SchedulerConfig,
        initial: SystemState,
        queue: Q,
    ) -> Result<Self, SchedulerError> {
        config.validate()?;
        if !initial.is_consistent() {
            return Err(SchedulerError::InconsistentInitialState {
                position: initial.position,
                velocity: initial.velocity,
            });
        }
        Ok(Self {
            config,
            accumulator: Duration::ZERO,
            current: initial,
            previous: initial,
            queue,
            ticks: 0,
        })
    }

    /// Feed one frame's delta into the accumulator and run the ticks it
    /// pays for, up to the per-frame cap.
    ///
    /// `dt` is clamped to `max_dt` before it is accumulated.
    pub fn advance_frame(&mut self, dt: Duration) -> FrameOutcome {
        self.accumulator = self
            .accumulator
            .saturating_add(dt.min(self.config.max_dt));

        let mut steps: u32 = 0;
        let mut commands_applied: usize = 0;

        while self.accumulator >= self.config.fixed_dt && steps < self.config.max_steps_per_frame
        {
            commands_applied = commands_applied.saturating_add(self.run_tick());
            self.accumulator = self.accumulator.saturating_sub(self.config.fixed_dt);
            steps = steps.saturating_add(1);
        }

        let capped = steps == self.config.max_steps_per_frame;
        if capped {
            debug!(
                tick = self.ticks,
                discarded_ms = self.accumulator.as_millis(),
                "Step cap reached, discarding owed time"
            );
            self.accumulator = Duration::ZERO;
        }

        FrameOutcome {
            steps,
            capped,
            commands_applied,
            alpha: self.alpha(),
        }
    }

    /// Run one tick: snapshot, drain, integrate. Returns commands applied.
    fn run_tick(&mut self) -> usize {
        self.previous = self.current;

        let mut applied: usize = 0;
        while applied < self.config.max_commands_per_step {
            let Some(command) = self.queue.next_command() else {
                break;
            };
            self.current = integrator::apply_command(self.current, command);
            applied = applied.saturating_add(1);
        }

        let was_valid = self.current.valid;
        self.current = integrator::advance(self.current, self.config.fixed_dt_seconds());
        self.ticks = self.ticks.saturating_add(1);

        if was_valid && !self.current.valid {
            warn!(tick = self.ticks, "State became invalid, simulation frozen");
        }

        applied
    }

    /// Fractional progress between the last two ticks.
    pub fn alpha(&self) -> f64 {
        self.accumulator.div_duration_f64(self.config.fixed_dt)
    }

    /// The interpolated state for presentation.
    pub fn display_state(&self) -> SystemState {
        interpolate::blend(&self.previous, &self.current, self.alpha())
    }

    /// The authoritative state after the most recent tick.
    pub const fn current(&self) -> &SystemState {
        &self.current
    }

    /// The state captured just before the most recent tick.
    pub const fn previous(&self) -> &SystemState {
        &self.previous
    }

    /// Unconsumed simulated time.
    pub const fn accumulator(&self) -> Duration {
        self.accumulator
    }

    /// Unconsumed simulated time in seconds.
    pub const fn accumulator_seconds(&self) -> f64 {
        self.accumulator.as_secs_f64()
    }

    /// Total ticks executed since creation.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The scheduler parameters.
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The command source drained by this scheduler.
    pub const fn queue(&self) -> &Q {
        &self.queue
    }

    /// Mutable access to the command source.
    pub const fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }
}

impl Scheduler<CommandQueue> {
    /// Create a scheduler with default parameters and an owned queue of
    /// default capacity.
    ///
    /// An inconsistent `initial` state is treated like a boundary failure:
    /// the scheduler starts in the terminal invalid state at the origin.
    /// Use [`Scheduler::new`] to reject it instead.
    pub fn with_defaults(initial: SystemState) -> Self {
        let initial = if initial.is_consistent() {
            initial
        } else {
            warn!(
                position = initial.position,
                velocity = initial.velocity,
                "Inconsistent initial state, starting invalid"
            );
            SystemState {
                position: 0.0,
                velocity: 0.0,
                valid: false,
            }
        };
        Self {
            config: SchedulerConfig::default(),
            accumulator: Duration::ZERO,
            current: initial,
            previous: initial,
            queue: CommandQueue::default(),
            ticks: 0,
        }
    }

    /// Enqueue a command on the owned queue. Returns `false` if it was
    /// dropped because the queue is full.
    pub fn enqueue(&mut self, command: Command) -> bool {
        self.queue.enqueue(command)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn partial_frame_runs_no_tick() {
        let mut s = Scheduler::with_defaults(SystemState::new(0.0, 1.0));
        let out = s.advance_frame(ms(6));
        assert_eq!(out.steps, 0);
        assert!(!out.capped);
        assert_eq!(s.accumulator(), ms(6));
        assert!((out.alpha - 0.6).abs() < 1e-9);
    }

    #[test]
    fn leftover_carries_into_next_frame() {
        let mut s = Scheduler::with_defaults(SystemState::new(0.0, 1.0));
        assert_eq!(s.advance_frame(ms(16)).steps, 1);
        assert_eq!(s.accumulator(), ms(6));
        assert_eq!(s.advance_frame(ms(16)).steps, 2);
        assert_eq!(s.accumulator(), ms(2));
        assert_eq!(s.ticks(), 3);
    }

    #[test]
    fn oversized_delta_is_clamped() {
        let mut s = Scheduler::with_defaults(SystemState::new(0.0, 1.0));
        let out = s.advance_frame(Duration::from_secs(10));
        assert_eq!(out.steps, MAX_SIMULATION_STEPS_PER_FRAME);
        assert!(out.capped);
        assert_eq!(s.accumulator(), Duration::ZERO);
    }

    #[test]
    fn cap_discards_leftover() {
        let mut s = Scheduler::with_defaults(SystemState::new(0.0, 1.0));
        s.advance_frame(ms(9));
        let out = s.advance_frame(ms(50));
        assert_eq!(out.steps, 5);
        assert!(out.capped);
        assert_eq!(s.accumulator(), Duration::ZERO);
        assert!(out.alpha.abs() < f64::EPSILON);
    }

    #[test]
    fn per_step_command_budget() {
        let mut s = Scheduler::with_defaults(SystemState::new(0.0, 0.0));
        for _ in 0..10 {
            assert!(s.enqueue(Command::accelerate(1.0)));
        }
        let out = s.advance_frame(ms(10));
        assert_eq!(out.commands_applied, 4);
        assert_eq!(s.queue().len(), 6);
        let out = s.advance_frame(ms(20));
        assert_eq!(out.commands_applied, 6);
        assert!(s.queue().is_empty());
    }

    #[test]
    fn previous_holds_pre_tick_snapshot() {
        let mut s = Scheduler::with_defaults(SystemState::new(0.0, 1.0));
        s.advance_frame(ms(10));
        assert_eq!(s.previous().position.to_bits(), 0.0_f64.to_bits());
        assert_eq!(s.current().position.to_bits(), 0.01_f64.to_bits());
    }

    #[test]
    fn display_state_interpolates() {
        let mut s = Scheduler::with_defaults(SystemState::new(0.0, 1.0));
        s.advance_frame(ms(15));
        // Halfway between the pre-tick 0.0 and post-tick 0.01.
        let shown = s.display_state();
        assert!((shown.position - 0.005).abs() < 1e-9);
    }

    #[test]
    fn rejects_zero_fixed_step() {
        let config = SchedulerConfig {
            fixed_dt: Duration::ZERO,
            ..SchedulerConfig::default()
        };
        let result = Scheduler::new(config, SystemState::default(), CommandQueue::default());
        assert!(result.is_err());
    }

    #[test]
    fn rejects_negative_initial_position() {
        let result = Scheduler::new(
            SchedulerConfig::default(),
            SystemState::new(-3.0, 0.0),
            CommandQueue::default(),
        );
        assert!(matches!(
            result,
            Err(SchedulerError::InconsistentInitialState { .. })
        ));
    }

    #[test]
    fn accepts_invalid_initial_state_as_is() {
        let frozen = SystemState {
            position: 0.0,
            velocity: 0.0,
            valid: false,
        };
        let s = Scheduler::new(SchedulerConfig::default(), frozen, CommandQueue::default());
        assert!(s.is_ok_and(|s| !s.display_state().valid));
    }

    #[test]
    fn defaults_never_display_negative_valid_state() {
        let s = Scheduler::with_defaults(SystemState::new(-3.0, 0.0));
        let shown = s.display_state();
        assert!(!shown.valid);
        assert_eq!(shown.position.to_bits(), 0.0_f64.to_bits());
    }

    #[test]
    fn accumulator_seconds_tracks_owed_time() {
        let mut s = Scheduler::with_defaults(SystemState::new(0.0, 1.0));
        assert_eq!(s.accumulator_seconds().to_bits(), 0.0_f64.to_bits());
        s.advance_frame(ms(16));
        assert_eq!(s.accumulator(), ms(6));
        assert!((s.accumulator_seconds() - 0.006).abs() < 1e-12);
        assert!(s.accumulator_seconds() < s.config().fixed_dt_seconds());
    }

    #[test]
    fn rejects_zero_step_cap() {
        let config = SchedulerConfig {
            max_steps_per_frame: 0,
            ..SchedulerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn fixed_dt_seconds_matches_constant() {
        let config = SchedulerConfig::default();
        assert_eq!(config.fixed_dt_seconds().to_bits(), FIXED_DT_SECONDS.to_bits());
        assert_eq!(MAX_DT.as_secs_f64().to_bits(), MAX_DT_SECONDS.to_bits());
    }
}
