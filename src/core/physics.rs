//! Blend / decay / normalize — the scalar physics behind the tracker.
//!
//! A new sample is blended into the running velocity (exponential moving
//! average toward `velocity + instantaneous`) and clamped.  Each tick the
//! velocity decays toward zero through friction and attraction, snapping to
//! exactly zero once it drops under the threshold.
//!
//! Bounds are applied with `max`/`min` chains instead of `f64::clamp`, which
//! panics on inverted bounds; a non-positive `max_velocity` must degrade, not
//! abort.

use crate::config::TrackerConfig;

/// Exponent of the perceptual boost curve.
const POW_EXPONENT: f64 = 0.7;
/// Gain of the perceptual boost curve.
const POW_GAIN: f64 = 1.35;

/// Blend an instantaneous estimate into `velocity` and clamp to
/// `±max_velocity`.
pub fn blend(velocity: f64, instantaneous: f64, responsiveness: f64, max_velocity: f64) -> f64 {
    let target = velocity + instantaneous;
    let blended = velocity * (1.0 - responsiveness) + target * responsiveness;
    clamp_symmetric(blended, max_velocity)
}

/// One tick of friction and attraction.  Returns exactly `0.0` once the
/// magnitude falls below `threshold`.
pub fn decay(velocity: f64, friction: f64, attraction: f64, threshold: f64) -> f64 {
    let mut v = velocity;
    v *= friction;
    v *= 1.0 - attraction;
    if v.abs() < threshold {
        0.0
    } else {
        v
    }
}

/// `velocity / max_velocity` bounded to `[-1, 1]`; `0` when `max_velocity`
/// is not positive (NaN included).
pub fn normalize(velocity: f64, max_velocity: f64) -> f64 {
    if !(max_velocity > 0.0) {
        return 0.0;
    }
    (velocity / max_velocity).max(-1.0).min(1.0)
}

/// Perceptual boost curve: lifts mid-range magnitudes, saturates at 1.
pub fn perceptual(abs_normalized: f64) -> f64 {
    (abs_normalized.powf(POW_EXPONENT) * POW_GAIN).min(1.0)
}

fn clamp_symmetric(value: f64, bound: f64) -> f64 {
    value.max(-bound).min(bound)
}

// ───────────────────────────────────────── frame ─────────────

/// The four values published on every output step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityFrame {
    /// Normalized velocity in `[-1, 1]`.
    pub normalized: f64,
    /// `|normalized|`.
    pub magnitude: f64,
    /// Perceptual curve of `magnitude`.
    pub pow: f64,
    /// Raw velocity.
    pub raw: f64,
}

impl VelocityFrame {
    pub const ZERO: VelocityFrame = VelocityFrame {
        normalized: 0.0,
        magnitude: 0.0,
        pow: 0.0,
        raw: 0.0,
    };

    pub fn from_velocity(velocity: f64, config: &TrackerConfig) -> Self {
        let normalized = normalize(velocity, config.max_velocity);
        let magnitude = normalized.abs();
        Self {
            normalized,
            magnitude,
            pow: perceptual(magnitude),
            raw: velocity,
        }
    }
}
