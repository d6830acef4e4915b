//! # Admission Gate
//!
//! A counting semaphore that bounds how many decode-heavy tasks run at once.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
struct GateInner {
    available: Mutex<usize>,
    released: Condvar,
    permits: usize,
}

/// Counting gate shared between background tasks.
///
/// Cloning shares the same permit count.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    inner: Arc<GateInner>,
}

/// A held permit. Dropping it returns the permit to the gate.
#[derive(Debug)]
#[must_use = "dropping the permit releases it immediately"]
pub struct GatePermit {
    inner: Arc<GateInner>,
}

impl AdmissionGate {
    /// Creates a gate with `permits` slots.
    ///
    /// # Panics
    ///
    /// Panics if `permits` is zero.
    #[must_use]
    pub fn new(permits: usize) -> Self {
        assert!(permits > 0, "admission gate needs at least one permit");
        Self {
            inner: Arc::new(GateInner {
                available: Mutex::new(permits),
                released: Condvar::new(),
                permits,
            }),
        }
    }

    /// Blocks until a permit is available.
    pub fn acquire(&self) -> GatePermit {
        let mut available = self.inner.available.lock();
        while *available == 0 {
            self.inner.released.wait(&mut available);
        }
        *available -= 1;
        GatePermit {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Returns the number of free permits.
    #[must_use]
    pub fn available(&self) -> usize {
        *self.inner.available.lock()
    }

    /// Returns the total number of permits.
    #[must_use]
    pub fn permits(&self) -> usize {
        self.inner.permits
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        let mut available = self.inner.available.lock();
        *available += 1;
        drop(available);
        self.inner.released.notify_one();
    }
}
