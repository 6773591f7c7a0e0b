//! Easing curves for blend progress.
//!
//! Pure functions mapping [0,1] to [0,1]. The scheduler applies the
//! configured curve to the raw transition progress before reporting it as
//! the src-alpha weight.

use std::f64::consts::FRAC_PI_2;

/// Easing curve applied to blend progress.
///
/// Every curve fixes `f(0) = 0` and `f(1) = 1` and is monotonic on [0,1].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum InterpolationMethod {
    #[default]
    Linear,
    SmoothStep,
    /// `smoothstep` composed with itself.
    SmoothStep2,
    /// `smoothstep` composed three times.
    SmoothStep3,
    SmootherStep,
    Squared,
    InvSquared,
    Cubed,
    InvCubed,
    SineIn,
    SineOut,
}

impl InterpolationMethod {
    /// Applies the curve to `t`, clamped to [0,1].
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::SmoothStep => smoothstep(t),
            Self::SmoothStep2 => smoothstep(smoothstep(t)),
            Self::SmoothStep3 => smoothstep(smoothstep(smoothstep(t))),
            Self::SmootherStep => t * t * t * (t * (t * 6.0 - 15.0) + 10.0),
            Self::Squared => t * t,
            Self::InvSquared => 1.0 - (1.0 - t) * (1.0 - t),
            Self::Cubed => t * t * t,
            Self::InvCubed => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::SineIn => 1.0 - (t * FRAC_PI_2).cos(),
            Self::SineOut => (t * FRAC_PI_2).sin(),
        }
    }
}

#[inline]
fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}
