//! Bounded command intake.
//!
//! Commands arrive from producers (UI, sensors, network) at any rate and
//! wait in a fixed-capacity FIFO until the scheduler drains them during a
//! tick. When the queue is full the newest command is rejected; nothing
//! already queued is ever evicted.
//!
//! Two flavours are provided:
//!
//! - [`CommandQueue`] -- owned, single-threaded. The scheduler holds it
//!   directly.
//! - [`SharedCommandQueue`] -- a mutex-guarded queue behind an [`Arc`] for a
//!   producer that runs concurrently with the scheduler. The scheduler is
//!   the single consumer.
//!
//! Both implement [`CommandSource`], the drain side the scheduler consumes.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use steadystep_types::Command;
use tracing::debug;

/// Default hard upper bound on pending commands.
pub const MAX_COMMAND_QUEUE_SIZE: usize = 32;

/// The drain side of a command intake.
pub trait CommandSource {
    /// Remove and return the oldest pending command, if any.
    fn next_command(&mut self) -> Option<Command>;
}

/// Fixed-capacity FIFO of pending commands.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    commands: VecDeque<Command>,
    capacity: usize,
    dropped: u64,
}

impl CommandQueue {
    /// Create an empty queue holding at most `capacity` commands.
    pub fn new(capacity: usize) -> Self {
        Self {
            commands: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append `command` to the tail of the queue.
    ///
    /// Returns `false` and leaves the queue untouched when it is full.
    pub fn enqueue(&mut self, command: Command) -> bool {
        if self.commands.len() >= self.capacity {
            self.dropped = self.dropped.saturating_add(1);
            debug!(
                kind = ?command.kind,
                capacity = self.capacity,
                "Command queue full, dropping newest command"
            );
            return false;
        }
        self.commands.push_back(command);
        true
    }

    /// Remove and return the oldest command.
    pub fn pop_front(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    /// Number of pending commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no commands are pending.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Whether the next [`enqueue`](Self::enqueue) would be rejected.
    pub fn is_full(&self) -> bool {
        self.commands.len() >= self.capacity
    }

    /// Maximum number of pending commands.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of commands rejected since creation.
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new(MAX_COMMAND_QUEUE_SIZE)
    }
}

impl CommandSource for CommandQueue {
    fn next_command(&mut self) -> Option<Command> {
        self.pop_front()
    }
}

/// A [`CommandQueue`] that can be fed from another thread or task.
///
/// Clones are handles to the same queue. Producers call
/// [`enqueue`](Self::enqueue); the scheduler drains through
/// [`CommandSource`].
#[derive(Debug, Clone, Default)]
pub struct SharedCommandQueue {
    inner: Arc<Mutex<CommandQueue>>,
}

impl SharedCommandQueue {
    /// Create an empty shared queue holding at most `capacity` commands.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CommandQueue::new(capacity))),
        }
    }

    /// Append `command`, returning `false` if the queue is full.
    pub fn enqueue(&self, command: Command) -> bool {
        self.lock().enqueue(command)
    }

    /// Number of pending commands.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no commands are pending.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of pending commands.
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Total number of commands rejected since creation.
    pub fn dropped(&self) -> u64 {
        self.lock().dropped()
    }

    // A panicking producer cannot leave the queue half-modified: every
    // mutation is a single push or pop. Recover the guard instead of
    // propagating the poison.
    fn lock(&self) -> MutexGuard<'_, CommandQueue> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CommandSource for SharedCommandQueue {
    fn next_command(&mut self) -> Option<Command> {
        self.lock().pop_front()
    }
}
