//! Touch input delivered to the scene tree.

use glview_core::Matrix;

/// Phase of a touch gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchAction {
    /// First finger went down. Starts a gesture.
    Down,
    /// A finger moved.
    Move,
    /// Last finger went up. Ends the gesture.
    Up,
    /// The gesture was taken away. Ends the gesture.
    Cancel,
}

impl TouchAction {
    /// Whether this action ends a gesture.
    #[must_use]
    pub const fn ends_gesture(self) -> bool {
        matches!(self, Self::Up | Self::Cancel)
    }
}

/// One touch event in the coordinates of its receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    /// Gesture phase.
    pub action: TouchAction,
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Event time (ms).
    pub time_ms: u64,
}

impl TouchEvent {
    /// Creates an event.
    #[must_use]
    pub const fn new(action: TouchAction, x: f32, y: f32, time_ms: u64) -> Self {
        Self {
            action,
            x,
            y,
            time_ms,
        }
    }

    /// The same event moved by `(dx, dy)`.
    #[must_use]
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// The same event with its position mapped through `matrix`.
    #[must_use]
    pub fn transformed(&self, matrix: &Matrix) -> Self {
        let (x, y) = matrix.map_point(self.x, self.y);
        Self { x, y, ..*self }
    }

    /// The same event with another action.
    #[must_use]
    pub fn with_action(&self, action: TouchAction) -> Self {
        Self { action, ..*self }
    }
}
