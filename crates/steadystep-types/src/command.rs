//! Commands: small, copyable units of intent.
//!
//! Commands carry no timestamp. Their ordering is their position in the
//! intake queue, nothing else.

use serde::{Deserialize, Serialize};

/// The kind of intent a [`Command`] expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Add `value` to the current velocity.
    Accelerate,
    /// Set the velocity to zero.
    Stop,
}

/// A time-agnostic instruction for the simulated entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// What the command does.
    pub kind: CommandKind,
    /// Parameter of the command. Only meaningful for
    /// [`CommandKind::Accelerate`].
    pub value: f64,
}

impl Command {
    /// An acceleration command adding `value` to the velocity.
    pub const fn accelerate(value: f64) -> Self {
        Self {
            kind: CommandKind::Accelerate,
            value,
        }
    }

    /// A stop command.
    pub const fn stop() -> Self {
        Self {
            kind: CommandKind::Stop,
            value: 0.0,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_kind() {
        assert_eq!(Command::accelerate(0.1).kind, CommandKind::Accelerate);
        assert_eq!(Command::stop().kind, CommandKind::Stop);
    }

    #[test]
    fn kind_serializes_as_variant_name() {
        let json = serde_json::to_string(&Command::stop()).unwrap();
        assert!(json.contains("\"Stop\""), "unexpected json: {json}");
    }
}
