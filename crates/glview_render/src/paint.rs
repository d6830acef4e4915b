//! Stroke parameters for line and outline primitives.

use crate::color::Color;

/// Color and line width for stroked primitives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    color: Color,
    line_width: f32,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: Color::TRANSPARENT,
            line_width: 1.0,
        }
    }
}

impl Paint {
    /// Creates a paint with a 1px line.
    #[must_use]
    pub fn new(color: Color) -> Self {
        Self {
            color,
            line_width: 1.0,
        }
    }

    /// Sets the line width.
    ///
    /// # Panics
    ///
    /// Panics if `width` is negative.
    #[must_use]
    pub fn with_line_width(mut self, width: f32) -> Self {
        self.set_line_width(width);
        self
    }

    /// Returns the stroke color.
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Sets the stroke color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Returns the line width.
    #[must_use]
    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    /// Sets the line width.
    ///
    /// # Panics
    ///
    /// Panics if `width` is negative.
    pub fn set_line_width(&mut self, width: f32) {
        assert!(width >= 0.0, "line width must be non-negative, got {width}");
        self.line_width = width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "line width must be non-negative")]
    fn test_negative_line_width_panics() {
        let _ = Paint::new(Color::WHITE).with_line_width(-1.0);
    }
}
