//! Easing and periodic modulation functions.
//!
//! The smoothed progress scalar passes through [`cubic_in_out`] before it is
//! used as an interpolation factor, and the sparkle/twinkle helpers turn
//! elapsed time plus per-particle randomness into intermittent brightness.
//! All of this is plain scalar math so it produces identical results whether
//! it runs CPU-side (as here) or in a vertex stage.

/// Standard ease-in-out cubic.
///
/// `t < 0.5` maps to `4t³`, otherwise `1 − (−2t + 2)³ / 2`. Range-preserving
/// on `[0, 1]` with fixed points at 0, 0.5 and 1.
#[inline]
pub fn cubic_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Linear interpolation between two scalars.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep between two edges, clamped.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Intermittent gold-flash intensity in `[0, 1]`.
///
/// A sine of time offset by `100 · random` is thresholded near its crest, so
/// each particle flashes briefly and rarely instead of pulsing continuously.
#[inline]
pub fn sparkle(time: f32, random: f32) -> f32 {
    let wave = (time * 3.0 + random * 100.0).sin();
    smoothstep(0.9, 1.0, wave)
}

/// Continuous twinkle alpha in `[0.2, 1.0]`.
///
/// Gentle brightness modulation for garland points: a bias of 0.6 with a
/// 0.4 swing at three radians per second, phased per particle.
#[inline]
pub fn twinkle(time: f32, phase: f32) -> f32 {
    0.6 + 0.4 * (time * 3.0 + phase * 10.0).sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_fixed_points() {
        assert_eq!(cubic_in_out(0.0), 0.0);
        assert_eq!(cubic_in_out(1.0), 1.0);
        assert!((cubic_in_out(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ease_is_monotone_and_range_preserving() {
        let mut last = 0.0f32;
        for i in 0..=1000 {
            let t = i as f32 / 1000.0;
            let e = cubic_in_out(t);
            assert!(e >= last - 1e-7);
            assert!((0.0..=1.0).contains(&e));
            last = e;
        }
    }

    #[test]
    fn test_ease_matches_reference_shape() {
        // Slow start, slow end: the curve sits below the diagonal in the
        // first half and above it in the second.
        assert!(cubic_in_out(0.25) < 0.25);
        assert!(cubic_in_out(0.75) > 0.75);
        assert!((cubic_in_out(0.25) - 4.0 * 0.25f32.powi(3)).abs() < 1e-6);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(-3.0, 5.0, 0.0), -3.0);
        assert_eq!(lerp(-3.0, 5.0, 1.0), 5.0);
        assert_eq!(lerp(-3.0, 5.0, 0.5), 1.0);
    }

    #[test]
    fn test_smoothstep_clamps() {
        assert_eq!(smoothstep(0.9, 1.0, 0.5), 0.0);
        assert_eq!(smoothstep(0.9, 1.0, 1.5), 1.0);
        let mid = smoothstep(0.9, 1.0, 0.95);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_sparkle_is_mostly_dark() {
        // The threshold keeps flashes rare: well under a quarter of sampled
        // instants should be lit at all.
        let lit = (0..10_000)
            .filter(|i| sparkle(*i as f32 * 0.01, 0.37) > 0.0)
            .count();
        assert!(lit > 0);
        assert!((lit as f32 / 10_000.0) < 0.25);
    }

    #[test]
    fn test_twinkle_range() {
        for i in 0..1000 {
            let t = twinkle(i as f32 * 0.05, 1.3);
            assert!(t >= 0.2 - 1e-6 && t <= 1.0 + 1e-6);
        }
    }
}
