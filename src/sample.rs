//! Spatial sampling for dataset generation.
//!
//! Provides a [`SampleContext`] with helper methods for drawing the random
//! positions a dual-position dataset is built from: uniform-by-volume sphere
//! points for the scattered configuration and layered-cone points for the
//! tree configuration.
//!
//! ```ignore
//! let mut ctx = SampleContext::new(i, count, Some(seed));
//! let scatter = ctx.random_in_sphere(35.0);
//! let target = ctx.random_in_tree(&TreeShape::default());
//! ```

use crate::shape::{SpiralShape, TreeShape};
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Context provided to dataset generation, one per particle.
///
/// Owns its RNG so generation can run particle-by-particle without shared
/// state. With a user seed the stream is fully deterministic (seed mixed with
/// the particle index); without one it is seeded from the wall clock, which
/// matches the reference behavior of a different scene every run.
pub struct SampleContext {
    /// Index of the particle being generated (0 to count-1).
    pub index: u32,
    /// Total number of particles in the batch.
    pub count: u32,
    rng: SmallRng,
}

impl SampleContext {
    /// Create a sampling context for one particle.
    pub fn new(index: u32, count: u32, seed: Option<u64>) -> Self {
        let base = seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });
        // SplitMix-style index mixing keeps per-particle streams decorrelated
        // even for consecutive indices.
        let mixed = (base ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)).wrapping_add(1);

        Self {
            index,
            count,
            rng: SmallRng::seed_from_u64(mixed),
        }
    }

    /// Normalized position of this particle within the batch (0.0 to 1.0).
    ///
    /// Used by parametric shapes (the spiral) to spread particles evenly.
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.count <= 1 {
            0.0
        } else {
            self.index as f32 / (self.count - 1) as f32
        }
    }

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in the given range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        self.rng.gen_range(min..max)
    }

    /// Random angle in `[0, 2π)`.
    #[inline]
    pub fn random_angle(&mut self) -> f32 {
        self.rng.gen_range(0.0..TAU)
    }

    /// Random point inside a sphere of given radius, centered at origin.
    ///
    /// Uniform throughout the volume: the polar angle comes from
    /// `acos(2u - 1)` so directions are uniform over the sphere, and the
    /// cube root on the radial draw compensates for shell volume growth.
    pub fn random_in_sphere(&mut self, radius: f32) -> Vec3 {
        let theta = self.rng.gen_range(0.0..TAU);
        let phi = (2.0 * self.rng.gen::<f32>() - 1.0).acos();
        let r = radius * self.rng.gen::<f32>().cbrt();

        Vec3::new(
            r * phi.sin() * theta.cos(),
            r * phi.sin() * theta.sin(),
            r * phi.cos(),
        )
    }

    /// Random point inside a layered-cone tree volume, vertically centered
    /// at the origin.
    ///
    /// Height and azimuth are uniform; the radial draw is raised to the
    /// shape's `surface_bias` exponent (below 0.5), pushing density toward
    /// the outer boughs while still filling some inner volume.
    pub fn random_in_tree(&mut self, tree: &TreeShape) -> Vec3 {
        let y = self.rng.gen_range(0.0..tree.height);
        let angle = self.rng.gen_range(0.0..TAU);

        let max_r = tree.radius_at(y);
        let r = max_r * self.rng.gen::<f32>().powf(tree.surface_bias);

        Vec3::new(r * angle.cos(), y - tree.half_height(), r * angle.sin())
    }

    /// Random point near the outer surface of the tree, vertically centered.
    ///
    /// Radius is held to 80-100% of the surface radius at the sampled height
    /// so ornaments sit on the boughs instead of vanishing into the trunk.
    pub fn random_on_tree_surface(&mut self, tree: &TreeShape) -> Vec3 {
        let y = self.rng.gen_range(0.0..tree.height);
        let angle = self.rng.gen_range(0.0..TAU);

        let max_r = tree.radius_at(y);
        let r = max_r * self.rng.gen_range(0.8..1.0f32);

        Vec3::new(r * angle.cos(), y - tree.half_height(), r * angle.sin())
    }

    /// Point on a spiral band, placed by particle index and jittered within
    /// the band's spread.
    pub fn spiral_point(&mut self, spiral: &SpiralShape) -> Vec3 {
        let (x, y, z) = spiral.point_at(self.progress());

        let spread = if spiral.spread_max > spiral.spread_min {
            self.rng.gen_range(spiral.spread_min..spiral.spread_max)
        } else {
            spiral.spread_min
        };
        let jitter_angle = self.rng.gen_range(0.0..TAU);

        Vec3::new(
            x + jitter_angle.cos() * spread,
            y + (self.rng.gen::<f32>() - 0.5) * spread,
            z + jitter_angle.sin() * spread,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_points_within_radius() {
        let mut ctx = SampleContext::new(0, 1, Some(7));
        for _ in 0..1000 {
            let p = ctx.random_in_sphere(35.0);
            assert!(p.length() <= 35.0 + 0.001);
        }
    }

    #[test]
    fn test_sphere_radial_distribution_is_cubic() {
        // r = R * cbrt(u), so P(r/R <= x) = x^3. At x = 0.5 that is 12.5%,
        // far from the 50% a uniform radial draw would give.
        let mut ctx = SampleContext::new(0, 1, Some(11));
        let n = 20_000;
        let below_half = (0..n)
            .filter(|_| ctx.random_in_sphere(1.0).length() <= 0.5)
            .count();
        let fraction = below_half as f32 / n as f32;
        assert!(fraction > 0.10 && fraction < 0.15, "got {}", fraction);
    }

    #[test]
    fn test_tree_points_within_envelope() {
        let tree = TreeShape::default();
        let mut ctx = SampleContext::new(0, 1, Some(3));
        for _ in 0..2000 {
            let p = ctx.random_in_tree(&tree);
            assert!(p.y >= -tree.half_height() - 0.001);
            assert!(p.y <= tree.half_height() + 0.001);

            let radial = (p.x * p.x + p.z * p.z).sqrt();
            let surface = tree.radius_at(p.y + tree.half_height());
            assert!(radial <= surface + 0.001);
        }
    }

    #[test]
    fn test_surface_points_hug_boughs() {
        let tree = TreeShape::default();
        let mut ctx = SampleContext::new(0, 1, Some(5));
        for _ in 0..2000 {
            let p = ctx.random_on_tree_surface(&tree);
            let radial = (p.x * p.x + p.z * p.z).sqrt();
            let surface = tree.radius_at(p.y + tree.half_height());
            assert!(radial <= surface + 0.001);
            assert!(radial >= surface * 0.8 - 0.001);
        }
    }

    #[test]
    fn test_seeded_context_is_deterministic() {
        let mut a = SampleContext::new(4, 10, Some(99));
        let mut b = SampleContext::new(4, 10, Some(99));
        for _ in 0..32 {
            assert_eq!(a.random_in_sphere(10.0), b.random_in_sphere(10.0));
        }
    }

    #[test]
    fn test_spiral_point_stays_near_curve() {
        let spiral = SpiralShape::default();
        let count = 500;
        for i in 0..count {
            let mut ctx = SampleContext::new(i, count, Some(13));
            let p = ctx.spiral_point(&spiral);
            let (x, y, z) = spiral.point_at(ctx.progress());
            let ideal = Vec3::new(x, y, z);
            assert!(p.distance(ideal) <= spiral.spread_max * 1.8);
        }
    }

    #[test]
    fn test_spiral_with_fixed_spread_does_not_panic() {
        // spread_min == spread_max is a valid "constant jitter" band.
        let spiral = SpiralShape {
            spread_min: 0.1,
            spread_max: 0.1,
            ..SpiralShape::default()
        };
        let mut ctx = SampleContext::new(3, 10, Some(17));
        let p = ctx.spiral_point(&spiral);
        let (x, y, z) = spiral.point_at(ctx.progress());
        assert!(p.distance(Vec3::new(x, y, z)) <= 0.1 * 1.8);
    }

    #[test]
    fn test_progress_spans_unit_interval() {
        let first = SampleContext::new(0, 100, Some(1));
        let last = SampleContext::new(99, 100, Some(1));
        assert_eq!(first.progress(), 0.0);
        assert!((last.progress() - 1.0).abs() < 1e-6);
    }
}
