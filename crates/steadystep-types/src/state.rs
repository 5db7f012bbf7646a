//! The simulated entity.
//!
//! A single scalar position/velocity pair plus a validity flag. The state
//! is `Copy` so the scheduler can snapshot it before every tick without
//! allocation.

use serde::{Deserialize, Serialize};

/// Position, velocity, and validity of the simulated entity.
///
/// While `valid` is `true`, `position >= 0`. Once `valid` becomes `false`
/// the state no longer changes through integration or command
/// application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    /// Continuous position along one axis.
    pub position: f64,
    /// Rate of change of position, in units per second.
    pub velocity: f64,
    /// Whether the entity still evolves.
    pub valid: bool,
}

impl SystemState {
    /// Create a valid state at the given position and velocity.
    pub const fn new(position: f64, velocity: f64) -> Self {
        Self {
            position,
            velocity,
            valid: true,
        }
    }

    /// Return whether the state still evolves.
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Return whether a valid state has a finite, non-negative position and
    /// a finite velocity. Invalid states are always consistent.
    pub const fn is_consistent(&self) -> bool {
        !self.valid
            || (self.position.is_finite() && self.position >= 0.0 && self.velocity.is_finite())
    }
}

impl Default for SystemState {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
