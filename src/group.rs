//! Morphing particle groups.
//!
//! A group owns one dual-position dataset, one progress smoother, and one set
//! of visual parameters. Every frame the host calls [`PointGroup::advance`]
//! (or [`MeshGroup::advance`]) with the shared scene target, then
//! `fill(time)` to recompute the renderable buffer: the eased interpolation
//! between scatter and target positions, the secondary floating motion, and
//! the sparkle/twinkle channels.
//!
//! Groups never regenerate their dataset. Toggling the scene only moves the
//! attractor the smoother chases; particle identities stay fixed for the
//! whole run.

use crate::dataset::{DatasetConfig, DualPosition, MorphDataset, TargetShape};
use crate::ease::{cubic_in_out, lerp, sparkle, twinkle};
use crate::progress::ProgressSmoother;
use crate::visuals::{InstanceVisuals, PointVisuals};
use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat, Vec3};

/// Secondary motion overlaid on the base interpolation.
///
/// Amplitudes shrink as the group settles so the tree reads as calm while
/// the scattered cloud drifts freely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionProfile {
    /// Free-floating drift on all three axes (foliage). Gains blend from
    /// `scattered` to `settled` with eased progress; axis frequencies are
    /// deliberately incommensurate (1.0 / 0.8 / 0.5) so no two particles
    /// ever move in visible sync.
    Drift {
        /// Motion gain while fully scattered.
        scattered: f32,
        /// Motion gain while fully settled.
        settled: f32,
    },
    /// Gentle vertical bobbing with slight horizontal sway (ornaments).
    Bob {
        /// Amplitude while scattered; settles down to a residual 0.1.
        gain: f32,
    },
    /// Fixed-amplitude shimmer that ignores progress (the garland).
    Shimmer {
        /// Offset amplitude on every axis.
        amplitude: f32,
    },
    /// No secondary motion.
    Still,
}

impl MotionProfile {
    /// Positional offset for one particle at the given time and eased
    /// progress.
    pub fn offset(&self, time: f32, ease_t: f32, d: &DualPosition) -> Vec3 {
        match *self {
            MotionProfile::Drift { scattered, settled } => {
                let speed = lerp(0.5, 2.0, ease_t);
                let amp = lerp(scattered, settled, ease_t) * 0.1;
                Vec3::new(
                    (time * speed + d.random * 10.0).sin() * amp,
                    (time * speed * 0.8 + d.random * 20.0).cos() * amp,
                    (time * speed * 0.5 + d.random * 5.0).sin() * amp,
                )
            }
            MotionProfile::Bob { gain } => {
                let amp = (1.0 - ease_t) * gain + 0.1;
                Vec3::new(
                    (time * d.speed * 0.5 + d.phase).cos() * amp * 0.1,
                    (time * d.speed + d.phase).sin() * amp * 0.2,
                    0.0,
                )
            }
            MotionProfile::Shimmer { amplitude } => Vec3::new(
                (time + d.phase).sin() * amplitude,
                (time * 0.8 + d.phase).cos() * amplitude,
                (time * 0.5 + d.phase).sin() * amplitude,
            ),
            MotionProfile::Still => Vec3::ZERO,
        }
    }
}

/// Per-particle brightness behavior over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flicker {
    /// Rare thresholded gold flashes (foliage).
    #[default]
    Sparkle,
    /// Continuous soft twinkle on alpha (garland).
    Twinkle,
    /// Constant brightness.
    Steady,
}

/// One billboard vertex as uploaded to the renderer, recomputed per frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    /// World position after interpolation and secondary motion.
    pub position: [f32; 3],
    /// Pre-attenuation point size.
    pub size: f32,
    /// Glow-color mix factor in `[0, 1]`.
    pub glow: f32,
    /// Alpha multiplier in `[0, 1]`.
    pub alpha: f32,
    /// Normalized target height for the vertical color gradient.
    pub height_t: f32,
}

/// One mesh instance as uploaded to the renderer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Column-major model matrix.
    pub model: [[f32; 4]; 4],
}

/// Configuration for a [`PointGroup`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointGroupConfig {
    /// Dataset generation parameters.
    pub dataset: DatasetConfig,
    /// Per-frame smoothing constant for this group.
    pub alpha: f32,
    /// Secondary motion profile.
    pub motion: MotionProfile,
    /// Brightness behavior.
    pub flicker: Flicker,
    /// Rendering parameters.
    pub visuals: PointVisuals,
}

impl PointGroupConfig {
    /// Defaults for a point group of `count` particles settling into `shape`.
    pub fn new(count: u32, shape: TargetShape) -> Self {
        Self {
            dataset: DatasetConfig::new(count, shape),
            alpha: 0.05,
            motion: MotionProfile::Drift {
                scattered: 2.0,
                settled: 0.1,
            },
            flicker: Flicker::Sparkle,
            visuals: PointVisuals::default(),
        }
    }

    /// Set the smoothing constant.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Seed the dataset generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.dataset = self.dataset.with_seed(seed);
        self
    }

    /// Set the scatter sphere radius.
    pub fn with_scatter_radius(mut self, radius: f32) -> Self {
        self.dataset = self.dataset.with_scatter_radius(radius);
        self
    }

    /// Set the per-particle size factor range.
    pub fn with_scale_range(mut self, min: f32, max: f32) -> Self {
        self.dataset = self.dataset.with_scale_range(min, max);
        self
    }

    /// Set the secondary motion profile.
    pub fn with_motion(mut self, motion: MotionProfile) -> Self {
        self.motion = motion;
        self
    }

    /// Set the brightness behavior.
    pub fn with_flicker(mut self, flicker: Flicker) -> Self {
        self.flicker = flicker;
        self
    }

    /// Set the rendering parameters.
    pub fn with_visuals(mut self, visuals: PointVisuals) -> Self {
        self.visuals = visuals;
        self
    }
}

/// A group of billboard particles morphing between two configurations.
pub struct PointGroup {
    dataset: MorphDataset,
    smoother: ProgressSmoother,
    motion: MotionProfile,
    flicker: Flicker,
    visuals: PointVisuals,
    vertices: Vec<PointVertex>,
}

impl PointGroup {
    /// Create the group and generate its dataset. This is the only time
    /// generation runs for the group's lifetime.
    pub fn new(config: PointGroupConfig) -> Self {
        let dataset = MorphDataset::generate(&config.dataset);
        let vertices = vec![PointVertex::zeroed(); dataset.len()];
        Self {
            dataset,
            smoother: ProgressSmoother::new(config.alpha),
            motion: config.motion,
            flicker: config.flicker,
            visuals: config.visuals,
            vertices,
        }
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// Whether this is an empty (no-op) group.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// The group's generation-time dataset.
    #[inline]
    pub fn dataset(&self) -> &MorphDataset {
        &self.dataset
    }

    /// The group's rendering parameters.
    #[inline]
    pub fn visuals(&self) -> &PointVisuals {
        &self.visuals
    }

    /// Current smoothed progress.
    #[inline]
    pub fn smoothed(&self) -> f32 {
        self.smoother.value()
    }

    /// Pull this group's progress one frame toward the shared target.
    pub fn advance(&mut self, target: f32) -> f32 {
        self.smoother.advance(target)
    }

    /// Recompute the vertex buffer for the current progress and time.
    pub fn fill(&mut self, time: f32) {
        let ease_t = cubic_in_out(self.smoother.value());
        let size_base = lerp(
            self.visuals.size_scattered,
            self.visuals.size_settled,
            ease_t,
        );

        for (v, d) in self.vertices.iter_mut().zip(self.dataset.records()) {
            let pos = d.scatter.lerp(d.target, ease_t) + self.motion.offset(time, ease_t, d);

            let (glow, alpha) = match self.flicker {
                Flicker::Sparkle => (sparkle(time, d.random), 1.0),
                Flicker::Twinkle => (0.0, twinkle(time, d.phase)),
                Flicker::Steady => (0.0, 1.0),
            };

            *v = PointVertex {
                position: pos.to_array(),
                size: size_base * d.scale + self.visuals.size_boost,
                glow,
                alpha,
                height_t: d.height_t,
            };
        }
    }

    /// The vertex buffer computed by the last [`fill`](Self::fill).
    #[inline]
    pub fn vertices(&self) -> &[PointVertex] {
        &self.vertices
    }
}

/// Configuration for a [`MeshGroup`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshGroupConfig {
    /// Dataset generation parameters.
    pub dataset: DatasetConfig,
    /// Per-frame smoothing constant for this group.
    pub alpha: f32,
    /// Secondary motion profile.
    pub motion: MotionProfile,
    /// Rendering parameters.
    pub visuals: InstanceVisuals,
    /// Extra scale multiplier while fully scattered / fully settled.
    /// `(1.0, 1.0)` keeps instance size constant; the topper grows from a
    /// speck to full size with `(0.1, 1.1)`.
    pub grow: (f32, f32),
    /// Ignore the dataset's random base rotation (the topper stays upright).
    pub upright: bool,
}

impl MeshGroupConfig {
    /// Defaults for a mesh group of `count` instances settling into `shape`.
    pub fn new(count: u32, shape: TargetShape) -> Self {
        Self {
            dataset: DatasetConfig::new(count, shape),
            alpha: 0.04,
            motion: MotionProfile::Bob { gain: 2.0 },
            visuals: InstanceVisuals::default(),
            grow: (1.0, 1.0),
            upright: false,
        }
    }

    /// Set the smoothing constant.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Seed the dataset generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.dataset = self.dataset.with_seed(seed);
        self
    }

    /// Set the scatter sphere radius.
    pub fn with_scatter_radius(mut self, radius: f32) -> Self {
        self.dataset = self.dataset.with_scatter_radius(radius);
        self
    }

    /// Set the secondary motion profile.
    pub fn with_motion(mut self, motion: MotionProfile) -> Self {
        self.motion = motion;
        self
    }

    /// Set the rendering parameters.
    pub fn with_visuals(mut self, visuals: InstanceVisuals) -> Self {
        self.visuals = visuals;
        self
    }

    /// Set the progress-driven growth curve.
    pub fn with_grow(mut self, scattered: f32, settled: f32) -> Self {
        self.grow = (scattered, settled);
        self
    }

    /// Keep instances upright, ignoring the random base rotation.
    pub fn with_upright(mut self) -> Self {
        self.upright = true;
        self
    }
}

/// A group of instanced meshes morphing between two configurations.
pub struct MeshGroup {
    dataset: MorphDataset,
    smoother: ProgressSmoother,
    motion: MotionProfile,
    visuals: InstanceVisuals,
    grow: (f32, f32),
    upright: bool,
    instances: Vec<InstanceData>,
}

impl MeshGroup {
    /// Create the group and generate its dataset once.
    pub fn new(config: MeshGroupConfig) -> Self {
        let dataset = MorphDataset::generate(&config.dataset);
        let instances = vec![InstanceData::zeroed(); dataset.len()];
        Self {
            dataset,
            smoother: ProgressSmoother::new(config.alpha),
            motion: config.motion,
            visuals: config.visuals,
            grow: config.grow,
            upright: config.upright,
            instances,
        }
    }

    /// Number of instances.
    #[inline]
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// Whether this is an empty (no-op) group.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// The group's rendering parameters.
    #[inline]
    pub fn visuals(&self) -> &InstanceVisuals {
        &self.visuals
    }

    /// Current smoothed progress.
    #[inline]
    pub fn smoothed(&self) -> f32 {
        self.smoother.value()
    }

    /// Pull this group's progress one frame toward the shared target.
    pub fn advance(&mut self, target: f32) -> f32 {
        self.smoother.advance(target)
    }

    /// Recompute all instance transforms for the current progress and time.
    pub fn fill(&mut self, time: f32) {
        let ease_t = cubic_in_out(self.smoother.value());
        let grow = lerp(self.grow.0, self.grow.1, ease_t);
        let spin = self.visuals.spin * time;

        for (out, d) in self.instances.iter_mut().zip(self.dataset.records()) {
            let pos = d.scatter.lerp(d.target, ease_t) + self.motion.offset(time, ease_t, d);

            let base = if self.upright { Vec3::ZERO } else { d.rotation };
            let rotation = Quat::from_euler(
                EulerRot::XYZ,
                base.x + spin.x,
                base.y + spin.y,
                base.z + spin.z,
            );

            let scale = d.scale * self.visuals.scale_multiplier * grow;
            let model = Mat4::from_scale_rotation_translation(Vec3::splat(scale), rotation, pos);
            *out = InstanceData {
                model: model.to_cols_array_2d(),
            };
        }
    }

    /// The instance buffer computed by the last [`fill`](Self::fill).
    #[inline]
    pub fn instances(&self) -> &[InstanceData] {
        &self.instances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::TreeShape;
    use crate::visuals::MeshKind;

    fn point_group(count: u32) -> PointGroup {
        PointGroup::new(
            PointGroupConfig::new(count, TargetShape::TreeVolume(TreeShape::default()))
                .with_seed(42),
        )
    }

    #[test]
    fn test_vertex_buffer_matches_count() {
        let mut g = point_group(257);
        g.fill(0.0);
        assert_eq!(g.vertices().len(), 257);
    }

    #[test]
    fn test_empty_group_is_noop() {
        let mut g = point_group(0);
        g.advance(1.0);
        g.fill(1.0);
        assert!(g.is_empty());
        assert!(g.vertices().is_empty());
    }

    #[test]
    fn test_size_endpoints_have_no_pop() {
        // At ease 0 and ease 1 the computed size must equal the static
        // endpoint formula exactly.
        let mut g = point_group(64);
        g.fill(0.0);
        for (v, d) in g.vertices().iter().zip(g.dataset().records()) {
            let expected = g.visuals().size_scattered * d.scale + g.visuals().size_boost;
            assert!((v.size - expected).abs() < 1e-5);
        }

        for _ in 0..2000 {
            g.advance(1.0);
        }
        g.fill(0.0);
        for (v, d) in g.vertices().iter().zip(g.dataset().records()) {
            let expected = g.visuals().size_settled * d.scale + g.visuals().size_boost;
            assert!((v.size - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_positions_settle_onto_targets() {
        let mut g = point_group(128);
        for _ in 0..4000 {
            g.advance(1.0);
        }
        // Fill at a fixed time; the residual drift amplitude at settle is
        // 0.1 * 0.1 = 0.01 per axis.
        g.fill(12.3);
        for (v, d) in g.vertices().iter().zip(g.dataset().records()) {
            let pos = Vec3::from(v.position);
            assert!(pos.distance(d.target) < 0.05);
        }
    }

    #[test]
    fn test_drift_amplitude_shrinks_when_settled() {
        let d = crate::dataset::DualPosition {
            scatter: Vec3::ZERO,
            target: Vec3::ZERO,
            scale: 1.0,
            rotation: Vec3::ZERO,
            speed: 1.0,
            phase: 0.0,
            random: 0.5,
            height_t: 0.5,
        };
        let motion = MotionProfile::Drift {
            scattered: 2.0,
            settled: 0.1,
        };

        let mut max_scattered = 0.0f32;
        let mut max_settled = 0.0f32;
        for i in 0..1000 {
            let t = i as f32 * 0.05;
            max_scattered = max_scattered.max(motion.offset(t, 0.0, &d).length());
            max_settled = max_settled.max(motion.offset(t, 1.0, &d).length());
        }
        assert!(max_settled < max_scattered * 0.1);
    }

    #[test]
    fn test_sparkle_channel_flashes_rarely() {
        let mut g = point_group(512);
        let mut lit = 0usize;
        let mut total = 0usize;
        for i in 0..20 {
            g.fill(i as f32 * 0.37);
            lit += g.vertices().iter().filter(|v| v.glow > 0.0).count();
            total += g.vertices().len();
        }
        assert!(lit > 0);
        assert!((lit as f32 / total as f32) < 0.25);
    }

    #[test]
    fn test_topper_grows_with_progress() {
        let anchor = Vec3::new(0.0, 8.0, 0.0);
        let config = MeshGroupConfig::new(1, TargetShape::Point(anchor))
            .with_seed(7)
            .with_grow(0.1, 1.1)
            .with_upright()
            .with_motion(MotionProfile::Still)
            .with_visuals(InstanceVisuals {
                mesh: MeshKind::Star,
                scale_multiplier: 1.0,
                spin: Vec3::ZERO,
                ..InstanceVisuals::default()
            });
        let mut g = MeshGroup::new(config);

        g.fill(0.0);
        let scattered_scale = g.instances()[0].model[0][0];

        for _ in 0..4000 {
            g.advance(1.0);
        }
        g.fill(0.0);
        let settled_scale = g.instances()[0].model[0][0];

        assert!(settled_scale > scattered_scale * 5.0);

        // Settled position is the anchor.
        let m = g.instances()[0].model;
        let pos = Vec3::new(m[3][0], m[3][1], m[3][2]);
        assert!(pos.distance(anchor) < 0.01);
    }

    #[test]
    fn test_mesh_group_instances_match_count() {
        let config = MeshGroupConfig::new(
            100,
            TargetShape::TreeSurface(TreeShape::default()),
        )
        .with_seed(9);
        let mut g = MeshGroup::new(config);
        g.advance(1.0);
        g.fill(0.5);
        assert_eq!(g.instances().len(), 100);
    }
}
