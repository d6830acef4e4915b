//! Display orientation as seen by the render loop.
//!
//! The compensation is the difference between the orientation the content
//! is laid out for and the one the display is in. The root rotates the
//! canvas by minus the compensation and maps touches through the inverse.

use std::sync::atomic::{AtomicI32, Ordering};

/// Supplies rotation values, queried on every frame.
pub trait OrientationSource: Send + Sync {
    /// Current display rotation in degrees (0, 90, 180 or 270).
    fn display_rotation(&self) -> i32;

    /// Current compensation in degrees (0, 90, 180 or 270).
    fn compensation(&self) -> i32;
}

/// An orientation source set by hand.
#[derive(Debug, Default)]
pub struct FixedOrientation {
    rotation: AtomicI32,
    compensation: AtomicI32,
}

impl FixedOrientation {
    /// Creates a source with the given values.
    #[must_use]
    pub const fn new(rotation: i32, compensation: i32) -> Self {
        Self {
            rotation: AtomicI32::new(rotation),
            compensation: AtomicI32::new(compensation),
        }
    }

    /// Changes both values. The root picks them up on its next frame.
    pub fn set(&self, rotation: i32, compensation: i32) {
        self.compensation.store(compensation, Ordering::Release);
        self.rotation.store(rotation, Ordering::Release);
    }
}

impl OrientationSource for FixedOrientation {
    fn display_rotation(&self) -> i32 {
        self.rotation.load(Ordering::Acquire)
    }

    fn compensation(&self) -> i32 {
        self.compensation.load(Ordering::Acquire)
    }
}
