//! Presentation-time interpolation between the last two ticks.

use steadystep_types::SystemState;

/// Blend `previous` and `current` by `alpha` for display.
///
/// Position and velocity are linearly interpolated; validity is taken from
/// `current`. The result is presentation-only and never fed back into the
/// simulation.
#[allow(clippy::suboptimal_flops)]
pub const fn blend(previous: &SystemState, current: &SystemState, alpha: f64) -> SystemState {
    let keep = 1.0 - alpha;
    SystemState {
        position: previous.position * keep + current.position * alpha,
        velocity: previous.velocity * keep + current.velocity * alpha,
        valid: current.valid,
    }
}
