//! Dual-position dataset generation.
//!
//! Every particle in a morphing group carries two positions generated
//! together: where it floats when the scene is scattered, and where it
//! settles when the scene gathers into the tree. The dataset is built once
//! when a group is created and never regenerated; regenerating would reassign
//! particle identities and visibly teleport every particle mid-animation.

use crate::sample::SampleContext;
use crate::shape::{SpiralShape, TreeShape};
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Target configuration a dataset settles into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetShape {
    /// Fill the tree volume (foliage points).
    TreeVolume(TreeShape),
    /// Sit near the tree surface (ornament placement).
    TreeSurface(TreeShape),
    /// Wind along a spiral band (garland points).
    Spiral(SpiralShape),
    /// A single fixed anchor (the tree topper).
    Point(Vec3),
}

/// One particle's generation-time record.
///
/// Immutable after generation: all per-frame variation is computed from these
/// base values, never written back into them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualPosition {
    /// Position in the scattered configuration.
    pub scatter: Vec3,
    /// Position in the settled (tree) configuration.
    pub target: Vec3,
    /// Base size factor, drawn from the group's scale range.
    pub scale: f32,
    /// Base orientation (Euler angles), for instanced meshes.
    pub rotation: Vec3,
    /// Per-particle animation speed multiplier in `[0.5, 1.5]`.
    pub speed: f32,
    /// Per-particle animation phase offset in `[0, 2π)`.
    pub phase: f32,
    /// Flat random in `[0, 1)` for render-time effects (sparkle, size).
    pub random: f32,
    /// Normalized height of the target position within its shape, in
    /// `[0, 1]`. Drives the bottom-to-top color gradient.
    pub height_t: f32,
}

/// Generation parameters for a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetConfig {
    /// Number of particles to generate. Zero is valid and yields an empty
    /// dataset.
    pub count: u32,
    /// Radius of the scattered-configuration sphere.
    pub scatter_radius: f32,
    /// Shape of the settled configuration.
    pub shape: TargetShape,
    /// Range the per-particle size factor is drawn from.
    pub scale_range: (f32, f32),
    /// Seed for deterministic generation. `None` seeds from the wall clock.
    pub seed: Option<u64>,
}

impl DatasetConfig {
    /// Config with reference defaults for the given count and target shape.
    pub fn new(count: u32, shape: TargetShape) -> Self {
        Self {
            count,
            scatter_radius: 35.0,
            shape,
            scale_range: (0.5, 1.0),
            seed: None,
        }
    }

    /// Set the scatter sphere radius.
    pub fn with_scatter_radius(mut self, radius: f32) -> Self {
        self.scatter_radius = radius;
        self
    }

    /// Set the size factor range.
    pub fn with_scale_range(mut self, min: f32, max: f32) -> Self {
        self.scale_range = (min, max);
        self
    }

    /// Seed the generator for reproducible datasets.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// An immutable batch of [`DualPosition`] records.
pub struct MorphDataset {
    records: Vec<DualPosition>,
}

impl MorphDataset {
    /// Generate a fresh dataset.
    ///
    /// Side-effect free apart from RNG draws; each call allocates new
    /// storage, so two generations with the same config (and no seed) are
    /// independent datasets.
    pub fn generate(config: &DatasetConfig) -> Self {
        let mut records = Vec::with_capacity(config.count as usize);

        for i in 0..config.count {
            let mut ctx = SampleContext::new(i, config.count, config.seed);

            let target = match &config.shape {
                TargetShape::TreeVolume(tree) => ctx.random_in_tree(tree),
                TargetShape::TreeSurface(tree) => ctx.random_on_tree_surface(tree),
                TargetShape::Spiral(spiral) => ctx.spiral_point(spiral),
                TargetShape::Point(p) => *p,
            };

            let (scale_min, scale_max) = config.scale_range;
            let scale = if scale_max > scale_min {
                ctx.random_range(scale_min, scale_max)
            } else {
                scale_min
            };

            records.push(DualPosition {
                scatter: ctx.random_in_sphere(config.scatter_radius),
                target,
                scale,
                rotation: Vec3::new(ctx.random_range(0.0, PI), ctx.random_range(0.0, PI), 0.0),
                speed: ctx.random_range(0.5, 1.5),
                phase: ctx.random_range(0.0, TAU),
                random: ctx.random(),
                height_t: normalized_height(target.y, &config.shape),
            });
        }

        Self { records }
    }

    /// Number of particles in the dataset.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty (a zero-count group).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The generated records.
    #[inline]
    pub fn records(&self) -> &[DualPosition] {
        &self.records
    }

    /// Scatter positions as a flat buffer (3 floats per particle), for
    /// consumers that interpolate shader-side.
    pub fn scatter_flat(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.records.len() * 3);
        for r in &self.records {
            out.extend_from_slice(&[r.scatter.x, r.scatter.y, r.scatter.z]);
        }
        out
    }

    /// Target positions as a flat buffer (3 floats per particle).
    pub fn target_flat(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.records.len() * 3);
        for r in &self.records {
            out.extend_from_slice(&[r.target.x, r.target.y, r.target.z]);
        }
        out
    }
}

/// Normalized height of a target position within its shape, clamped to
/// `[0, 1]`.
fn normalized_height(y: f32, shape: &TargetShape) -> f32 {
    let t = match shape {
        TargetShape::TreeVolume(tree) | TargetShape::TreeSurface(tree) => {
            (y + tree.half_height()) / tree.height
        }
        TargetShape::Spiral(spiral) => (y - spiral.start_y) / spiral.height,
        TargetShape::Point(_) => 0.5,
    };
    t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_config(count: u32) -> DatasetConfig {
        DatasetConfig::new(count, TargetShape::TreeVolume(TreeShape::default())).with_seed(42)
    }

    #[test]
    fn test_generates_exact_count() {
        for count in [0u32, 1, 17, 1000] {
            let dataset = MorphDataset::generate(&tree_config(count));
            assert_eq!(dataset.len(), count as usize);
        }
    }

    #[test]
    fn test_zero_count_is_empty() {
        let dataset = MorphDataset::generate(&tree_config(0));
        assert!(dataset.is_empty());
        assert!(dataset.scatter_flat().is_empty());
    }

    #[test]
    fn test_attribute_ranges() {
        let dataset = MorphDataset::generate(&tree_config(2000));
        for r in dataset.records() {
            assert!(r.scale >= 0.5 && r.scale < 1.0);
            assert!(r.speed >= 0.5 && r.speed < 1.5);
            assert!(r.phase >= 0.0 && r.phase < TAU);
            assert!(r.random >= 0.0 && r.random < 1.0);
            assert!(r.height_t >= 0.0 && r.height_t <= 1.0);
        }
    }

    #[test]
    fn test_scatter_positions_within_radius() {
        let config = tree_config(1000).with_scatter_radius(30.0);
        let dataset = MorphDataset::generate(&config);
        for r in dataset.records() {
            assert!(r.scatter.length() <= 30.0 + 0.001);
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = MorphDataset::generate(&tree_config(64));
        let b = MorphDataset::generate(&tree_config(64));
        assert_eq!(a.records(), b.records());
    }

    #[test]
    fn test_unseeded_generations_are_independent() {
        let config = DatasetConfig::new(64, TargetShape::TreeVolume(TreeShape::default()));
        let a = MorphDataset::generate(&config);
        let b = MorphDataset::generate(&config);
        // Fresh allocations, and (overwhelmingly likely) different draws.
        assert_ne!(a.records().as_ptr(), b.records().as_ptr());
        assert_ne!(a.records(), b.records());
    }

    #[test]
    fn test_fixed_point_target() {
        let anchor = Vec3::new(0.0, 8.0, 0.0);
        let config = DatasetConfig::new(1, TargetShape::Point(anchor)).with_seed(5);
        let dataset = MorphDataset::generate(&config);
        assert_eq!(dataset.records()[0].target, anchor);
    }

    #[test]
    fn test_degenerate_scale_range_is_constant() {
        let config = tree_config(8).with_scale_range(1.0, 1.0);
        let dataset = MorphDataset::generate(&config);
        for r in dataset.records() {
            assert_eq!(r.scale, 1.0);
        }
    }

    #[test]
    fn test_flat_buffers_interleave_xyz() {
        let dataset = MorphDataset::generate(&tree_config(3));
        let flat = dataset.target_flat();
        assert_eq!(flat.len(), 9);
        let r = &dataset.records()[1];
        assert_eq!(&flat[3..6], &[r.target.x, r.target.y, r.target.z]);
    }
}
