//! Easing curves applied to raw animation progress.

/// Maps linear progress in `[0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, Default)]
pub enum Interpolator {
    /// Identity curve.
    #[default]
    Linear,
    /// Starts slow and speeds up: `t^(2 * factor)`.
    Accelerate(f32),
    /// Starts fast and slows down: `1 - (1 - t)^(2 * factor)`.
    Decelerate(f32),
    /// Cosine curve, slow at both ends.
    AccelerateDecelerate,
    /// Exponential ease-in (accelerating).
    ExponentialIn,
    /// Exponential ease-out (sharp snap to target).
    ExponentialOut,
    /// Exponential ease-in-out.
    ExponentialInOut,
    /// Caller supplied curve.
    Custom(fn(f32) -> f32),
}

impl Interpolator {
    /// Applies the curve to `t`, which is clamped to `[0, 1]` first.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::Accelerate(factor) => {
                if (factor - 1.0).abs() < f32::EPSILON {
                    t * t
                } else {
                    t.powf(2.0 * factor)
                }
            }
            Self::Decelerate(factor) => {
                if (factor - 1.0).abs() < f32::EPSILON {
                    1.0 - (1.0 - t) * (1.0 - t)
                } else {
                    1.0 - (1.0 - t).powf(2.0 * factor)
                }
            }
            Self::AccelerateDecelerate => {
                ((t + 1.0) * std::f32::consts::PI).cos() / 2.0 + 0.5
            }
            Self::ExponentialIn => {
                if t <= 0.0 {
                    0.0
                } else {
                    2.0_f32.powf(10.0 * (t - 1.0))
                }
            }
            Self::ExponentialOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * t)
                }
            }
            Self::ExponentialInOut => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Self::Custom(curve) => curve(t),
        }
    }
}
