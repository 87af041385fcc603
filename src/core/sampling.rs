//! Sampling strategies — one raw position delta in, one instantaneous
//! velocity estimate out.
//!
//! The hybrid curve is tuned for touch devices, where scroll events arrive in
//! bursts or with wide gaps.  Every constant below is a fixed tuning value.

use crate::config::SampleMode;

/// Elapsed time substituted when a sample arrives with zero or negative
/// `delta_time` (one frame at 60 Hz).
pub const FALLBACK_FRAME_MS: f64 = 16.7;

/// Scale applied to position/ms in [`SampleMode::Time`] so its output is
/// comparable in magnitude to [`SampleMode::Delta`].
const TIME_SCALE: f64 = 12.0;

// ── hybrid tuning ─────────────────────────────────────────────
const HYBRID_MIN_DT: f64 = 4.0;
const HYBRID_NOISE_FLOOR: f64 = 0.3;
const HYBRID_RAPID_DT: f64 = 10.0;
const HYBRID_SPARSE_DT: f64 = 25.0;

/// Elapsed time to feed into [`instantaneous`]: the raw difference, or
/// [`FALLBACK_FRAME_MS`] when the clock did not move forward.
pub fn effective_delta_time(now: f64, last: f64) -> f64 {
    let dt = now - last;
    if dt > 0.0 {
        dt
    } else {
        FALLBACK_FRAME_MS
    }
}

/// Instantaneous estimate for one position change.
///
/// `delta_time` must be positive; see [`effective_delta_time`].
pub fn instantaneous(mode: SampleMode, delta_position: f64, delta_time: f64) -> f64 {
    match mode {
        SampleMode::Delta => delta_position,
        SampleMode::Time => (delta_position / delta_time) * TIME_SCALE,
        SampleMode::Hybrid => hybrid(delta_position, delta_time),
    }
}

fn hybrid(delta_position: f64, delta_time: f64) -> f64 {
    let t = delta_time.max(HYBRID_MIN_DT);
    // Settle noise: sub-pixel jitter after a fling comes to rest.
    let d = if delta_position.abs() < HYBRID_NOISE_FLOOR {
        0.0
    } else {
        delta_position
    };

    if t < HYBRID_RAPID_DT {
        d * (0.85 + 0.15 * (t / HYBRID_RAPID_DT))
    } else if t > HYBRID_SPARSE_DT {
        let adaptive_scale = 6.0 + 2.0 * t.ln();
        (d / t) * adaptive_scale
    } else {
        // 1 at t = 10, 0 at t = 25.
        let r = (HYBRID_SPARSE_DT - t) / 15.0;
        r * (d * 0.7) + (1.0 - r) * ((d / t) * 8.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn delta_mode_passes_displacement_through() {
        assert_eq!(instantaneous(SampleMode::Delta, 50.0, 3.0), 50.0);
        assert_eq!(instantaneous(SampleMode::Delta, 50.0, 400.0), 50.0);
        assert_eq!(instantaneous(SampleMode::Delta, -0.1, 16.0), -0.1);
    }

    #[test]
    fn time_mode_scales_rate() {
        assert!(close(instantaneous(SampleMode::Time, 100.0, 50.0), 24.0));
        assert!(close(instantaneous(SampleMode::Time, -16.0, 16.0), -12.0));
    }

    #[test]
    fn hybrid_sparse_branch_uses_log_scale() {
        let v = instantaneous(SampleMode::Hybrid, 100.0, 50.0);
        let expected = 2.0 * (6.0 + 2.0 * 50f64.ln());
        assert!(close(v, expected));
        assert!((v - 27.64).abs() < 0.01);
    }

    #[test]
    fn hybrid_rapid_branch_is_nearly_pure_delta() {
        // t = 8 → 0.85 + 0.12 = 0.97
        assert!(close(instantaneous(SampleMode::Hybrid, 10.0, 8.0), 9.7));
    }

    #[test]
    fn hybrid_floors_tiny_time_steps() {
        // t floored to 4 → 0.85 + 0.06 = 0.91
        assert!(close(instantaneous(SampleMode::Hybrid, 10.0, 0.5), 9.1));
    }

    #[test]
    fn hybrid_mid_branch_blends_delta_and_rate() {
        // t = 10 → r = 1, pure 0.7 * d
        assert!(close(instantaneous(SampleMode::Hybrid, 10.0, 10.0), 7.0));
        // t = 25 → r = 0, pure rate * 8
        assert!(close(instantaneous(SampleMode::Hybrid, 10.0, 25.0), 3.2));
        // t = 17.5 → r = 0.5
        let expected = 0.5 * 7.0 + 0.5 * (10.0 / 17.5) * 8.0;
        assert!(close(instantaneous(SampleMode::Hybrid, 10.0, 17.5), expected));
    }

    #[test]
    fn hybrid_drops_settle_noise() {
        assert_eq!(instantaneous(SampleMode::Hybrid, 0.29, 16.0), 0.0);
        assert_eq!(instantaneous(SampleMode::Hybrid, -0.2, 40.0), 0.0);
        assert!(instantaneous(SampleMode::Hybrid, 0.3, 16.0) > 0.0);
    }

    #[test]
    fn non_positive_elapsed_time_falls_back_to_one_frame() {
        assert_eq!(effective_delta_time(100.0, 100.0), FALLBACK_FRAME_MS);
        assert_eq!(effective_delta_time(90.0, 100.0), FALLBACK_FRAME_MS);
        assert_eq!(effective_delta_time(120.0, 100.0), 20.0);
    }
}
