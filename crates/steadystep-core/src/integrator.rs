//! State integration and command application for one fixed tick.
//!
//! Both functions are pure: they take a state by value and return the next
//! one. An invalid state is terminal and passes through unchanged.

use steadystep_types::{Command, CommandKind, SystemState};

/// Advance `state` by `dt_seconds` of simulated time.
///
/// Integrates position from velocity. A position that would become
/// negative is pinned to zero, velocity is cleared, and the state is
/// marked invalid. There is no transition back to valid.
#[allow(clippy::suboptimal_flops)]
pub const fn advance(state: SystemState, dt_seconds: f64) -> SystemState {
    if !state.valid {
        return state;
    }

    let position = state.position + state.velocity * dt_seconds;
    if position < 0.0 {
        return SystemState {
            position: 0.0,
            velocity: 0.0,
            valid: false,
        };
    }

    SystemState { position, ..state }
}

/// Apply a single command to `state`.
///
/// `Accelerate` adds to velocity without bound. `Stop` zeroes velocity,
/// overriding anything applied earlier in the same tick.
pub const fn apply_command(state: SystemState, command: Command) -> SystemState {
    if !state.valid {
        return state;
    }

    match command.kind {
        CommandKind::Accelerate => SystemState {
            velocity: state.velocity + command.value,
            ..state
        },
        CommandKind::Stop => SystemState {
            velocity: 0.0,
            ..state
        },
    }
}
