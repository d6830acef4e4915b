//! Deferred start times handed from the render loop to animations.

use std::sync::atomic::{AtomicU64, Ordering};

const EMPTY: u64 = u64::MAX;

/// A single-slot mailbox for an animation start time.
///
/// A node registers the latch with the render loop when it wants its
/// animation to start on the frame that first shows it. After that frame the
/// loop stores the frame timestamp; the node takes it on its next render and
/// passes it to [`Animation::set_start_time`](super::Animation::set_start_time).
#[derive(Debug)]
pub struct LaunchLatch {
    slot: AtomicU64,
}

impl Default for LaunchLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchLatch {
    /// Creates an empty latch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: AtomicU64::new(EMPTY),
        }
    }

    /// Stores a frame timestamp.
    pub fn set(&self, time_ms: u64) {
        self.slot.store(time_ms.min(EMPTY - 1), Ordering::Release);
    }

    /// Takes the stored timestamp, leaving the latch empty.
    #[must_use]
    pub fn take(&self) -> Option<u64> {
        match self.slot.swap(EMPTY, Ordering::AcqRel) {
            EMPTY => None,
            time => Some(time),
        }
    }

    /// Returns true if a timestamp is waiting.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.slot.load(Ordering::Acquire) != EMPTY
    }
}
