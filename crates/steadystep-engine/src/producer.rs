//! Demo command producer.
//!
//! Stands in for a UI or sensor feed: after each frame's simulation layer
//! it pushes a burst of accelerate commands into the intake. Bursts larger
//! than the per-tick drain rate fill the queue, so the drop policy is
//! exercised continuously.

use steadystep_core::intake::SharedCommandQueue;
use steadystep_core::runner::FrameHook;
use steadystep_types::Command;
use tracing::trace;

/// Enqueues a fixed burst of `Accelerate` commands every frame.
#[derive(Debug, Clone)]
pub struct BurstProducer {
    burst_size: u32,
    value: f64,
    accepted: u64,
    rejected: u64,
}

impl BurstProducer {
    /// Create a producer enqueuing `burst_size` commands of `value` per
    /// frame.
    pub const fn new(burst_size: u32, value: f64) -> Self {
        Self {
            burst_size,
            value,
            accepted: 0,
            rejected: 0,
        }
    }

    /// Commands accepted by the queue so far.
    pub const fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Commands rejected because the queue was full.
    pub const fn rejected(&self) -> u64 {
        self.rejected
    }
}

impl FrameHook<SharedCommandQueue> for BurstProducer {
    fn after_simulation(&mut self, frame_index: u64, queue: &mut SharedCommandQueue) {
        let mut rejected_now: u32 = 0;
        for _ in 0..self.burst_size {
            if queue.enqueue(Command::accelerate(self.value)) {
                self.accepted = self.accepted.saturating_add(1);
            } else {
                rejected_now = rejected_now.saturating_add(1);
            }
        }
        self.rejected = self.rejected.saturating_add(u64::from(rejected_now));
        if rejected_now > 0 {
            trace!(frame = frame_index, rejected = rejected_now, "Burst partially dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_fills_queue_then_drops() {
        let mut queue = SharedCommandQueue::new(32);
        let mut producer = BurstProducer::new(10, 0.1);

        for frame in 1..=4 {
            producer.after_simulation(frame, &mut queue);
        }

        assert_eq!(queue.len(), 32);
        assert_eq!(producer.accepted(), 32);
        assert_eq!(producer.rejected(), 8);
    }

    #[test]
    fn empty_burst_does_nothing() {
        let mut queue = SharedCommandQueue::new(4);
        let mut producer = BurstProducer::new(0, 1.0);
        producer.after_simulation(1, &mut queue);
        assert!(queue.is_empty());
    }
}
