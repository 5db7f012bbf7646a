//! Clock, command intake, fixed-step scheduler, and frame loop for the
//! Steadystep scheduler.
//!
//! This crate turns irregular wall-clock time into bounded, deterministic
//! simulation ticks. Per frame: sample the clock, clamp the delta,
//! accumulate, run at most a capped number of fixed ticks (each draining a
//! bounded batch of commands, then integrating), and hand an interpolated
//! state to the presentation sink.
//!
//! # Modules
//!
//! - [`clock`] -- [`Clock`] capability, monotonic and manual clocks, delta
//!   clamping.
//! - [`config`] -- Configuration loading from `steadystep-config.yaml` into
//!   strongly-typed structs.
//! - [`control`] -- Shared pause/stop/pacing control for the frame loop.
//! - [`intake`] -- Bounded command queues and the [`CommandSource`] trait.
//! - [`integrator`] -- Pure per-tick state integration and command
//!   application.
//! - [`interpolate`] -- Presentation blend between the last two ticks.
//! - [`runner`] -- [`FrameRunner`] and the cooperative [`run_loop`].
//! - [`scheduler`] -- The fixed-step accumulator with step cap.
//! - [`sink`] -- [`PresentationSink`] trait and frame reports.
//!
//! [`Clock`]: clock::Clock
//! [`CommandSource`]: intake::CommandSource
//! [`FrameRunner`]: runner::FrameRunner
//! [`run_loop`]: runner::run_loop
//! [`PresentationSink`]: sink::PresentationSink

pub mod clock;
pub mod config;
pub mod control;
pub mod intake;
pub mod integrator;
pub mod interpolate;
pub mod runner;
pub mod scheduler;
pub mod sink;
