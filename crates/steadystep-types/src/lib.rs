//! Shared type definitions for the Steadystep scheduler.
//!
//! This crate holds the data model that flows between the scheduler, the
//! command producers, and the presentation layer. It has no knowledge of
//! time or scheduling.
//!
//! # Modules
//!
//! - [`state`] -- The simulated entity ([`SystemState`]).
//! - [`command`] -- Time-agnostic units of intent ([`Command`]).

pub mod command;
pub mod state;

pub use command::{Command, CommandKind};
pub use state::SystemState;
