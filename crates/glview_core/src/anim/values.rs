//! Stock value calculators.

use super::{Animation, Calculate, Step};

/// Linear interpolation between two floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatValue {
    from: f32,
    to: f32,
    current: f32,
}

impl FloatValue {
    /// Creates a calculator resting at `from`.
    #[must_use]
    pub fn new(from: f32, to: f32) -> Self {
        Self {
            from,
            to,
            current: from,
        }
    }

    /// Returns the last computed value.
    #[must_use]
    pub fn get(&self) -> f32 {
        self.current
    }
}

impl Calculate for FloatValue {
    fn on_calculate(&mut self, progress: f32) -> Step {
        self.current = self.from + (self.to - self.from) * progress;
        Step::Continue
    }
}

/// Animates a float from one value to another.
pub type FloatAnimation = Animation<FloatValue>;

/// Animates an opacity in `[0, 1]`.
pub type AlphaAnimation = Animation<FloatValue>;

impl Animation<FloatValue> {
    /// Creates an idle float animation.
    #[must_use]
    pub fn float(from: f32, to: f32, duration_ms: u64) -> Self {
        Self::new(FloatValue::new(from, to), duration_ms)
    }

    /// Creates an idle opacity animation.
    ///
    /// # Panics
    ///
    /// Panics if either endpoint is outside `[0, 1]`.
    #[must_use]
    pub fn alpha(from: f32, to: f32, duration_ms: u64) -> Self {
        assert!((0.0..=1.0).contains(&from), "alpha out of range: {from}");
        assert!((0.0..=1.0).contains(&to), "alpha out of range: {to}");
        Self::float(from, to, duration_ms)
    }

    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.calculator().get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_animation_values() {
        let mut anim = FloatAnimation::float(10.0, 20.0, 100);
        assert!((anim.value() - 10.0).abs() < f32::EPSILON);
        anim.start_at(0);
        anim.calculate(50);
        assert!((anim.value() - 15.0).abs() < 1e-5);
        anim.calculate(100);
        assert!((anim.value() - 20.0).abs() < 1e-5);
        assert!(!anim.is_running());
    }

    #[test]
    #[should_panic(expected = "alpha out of range")]
    fn test_alpha_rejects_out_of_range() {
        let _ = AlphaAnimation::alpha(0.0, 1.5, 100);
    }
}
