//! Scene composition: groups plus the single shared target.
//!
//! A [`Scene`] owns any number of independently-smoothed groups and the one
//! [`SceneState`] they all chase. The host loop flips the state from a user
//! interaction handler (outside the frame callback) and calls
//! [`Scene::update`] once per frame (inside it); that single-writer /
//! multiple-reader split is the entire concurrency model, so no locking is
//! involved anywhere.

use crate::dataset::TargetShape;
use crate::group::{
    Flicker, MeshGroup, MeshGroupConfig, MotionProfile, PointGroup, PointGroupConfig,
};
use crate::progress::SceneState;
use crate::shape::{SpiralShape, TreeShape};
use crate::visuals::{palette, BlendMode, InstanceVisuals, MeshKind, PointVisuals};
use glam::Vec3;

/// A composed morphing scene.
#[derive(Default)]
pub struct Scene {
    state: SceneState,
    point_groups: Vec<PointGroup>,
    mesh_groups: Vec<MeshGroup>,
}

impl Scene {
    /// An empty scene in the default (tree) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a point group.
    pub fn with_points(mut self, config: PointGroupConfig) -> Self {
        self.point_groups.push(PointGroup::new(config));
        self
    }

    /// Add an instanced-mesh group.
    pub fn with_meshes(mut self, config: MeshGroupConfig) -> Self {
        self.mesh_groups.push(MeshGroup::new(config));
        self
    }

    /// Current scene state.
    #[inline]
    pub fn state(&self) -> SceneState {
        self.state
    }

    /// Set the state directly.
    pub fn set_state(&mut self, state: SceneState) {
        self.state = state;
    }

    /// Flip between scattered and tree.
    pub fn toggle(&mut self) {
        self.state = self.state.toggled();
    }

    /// Advance every group one frame toward the shared target and recompute
    /// all renderable buffers for the given elapsed time.
    pub fn update(&mut self, elapsed: f32) {
        let target = self.state.target();
        for group in &mut self.point_groups {
            group.advance(target);
            group.fill(elapsed);
        }
        for group in &mut self.mesh_groups {
            group.advance(target);
            group.fill(elapsed);
        }
    }

    /// The scene's point groups.
    #[inline]
    pub fn point_groups(&self) -> &[PointGroup] {
        &self.point_groups
    }

    /// The scene's mesh groups.
    #[inline]
    pub fn mesh_groups(&self) -> &[MeshGroup] {
        &self.mesh_groups
    }

    /// Total particle count across all groups.
    pub fn particle_count(&self) -> usize {
        self.point_groups.iter().map(|g| g.len()).sum::<usize>()
            + self.mesh_groups.iter().map(|g| g.len()).sum::<usize>()
    }

    /// The full holiday composition from the reference scene: dense foliage,
    /// a spiral light garland, five ornament groups, and the tree topper.
    ///
    /// `seed` makes the whole scene reproducible; pass `None` for a fresh
    /// arrangement every run.
    pub fn holiday(seed: Option<u64>) -> Self {
        let tree = TreeShape::default();
        let mut scene = Self::new();
        let mut next_seed = {
            let mut counter = 0u64;
            move || {
                counter += 1;
                seed.map(|s| s.wrapping_add(counter))
            }
        };

        // Foliage: the reference asks for 12 000 points and quietly renders
        // 20% more for density.
        let foliage_count = (12_000.0f32 * 1.2) as u32;
        let mut foliage =
            PointGroupConfig::new(foliage_count, TargetShape::TreeVolume(tree))
                .with_alpha(0.05)
                .with_scatter_radius(30.0)
                .with_scale_range(0.0, 1.0)
                .with_motion(MotionProfile::Drift {
                    scattered: 2.0,
                    settled: 0.1,
                })
                .with_flicker(Flicker::Sparkle)
                .with_visuals(PointVisuals::default());
        if let Some(s) = next_seed() {
            foliage = foliage.with_seed(s);
        }
        scene = scene.with_points(foliage);

        // Garland: a tight ribbon of twinkling gold points.
        let mut garland =
            PointGroupConfig::new(2_500, TargetShape::Spiral(SpiralShape::default()))
                .with_alpha(0.05)
                .with_scatter_radius(40.0)
                .with_scale_range(0.5, 2.0)
                .with_motion(MotionProfile::Shimmer { amplitude: 0.05 })
                .with_flicker(Flicker::Twinkle)
                .with_visuals(PointVisuals {
                    color_bottom: palette::gold_bright(),
                    color_top: palette::gold_bright(),
                    color_glow: palette::gold_bright(),
                    size_scattered: 50.0,
                    size_settled: 50.0,
                    size_boost: 0.0,
                    blend: BlendMode::Additive,
                });
        if let Some(s) = next_seed() {
            garland = garland.with_seed(s);
        }
        scene = scene.with_points(garland);

        // Ornaments: heavy gift boxes and light baubles in descending sizes.
        let ornaments: [(u32, MeshKind, Vec3, f32, f32); 5] = [
            (100, MeshKind::Cube, palette::red_deep(), 0.9, 0.2),
            (100, MeshKind::Cube, palette::gold(), 0.7, 0.2),
            (450, MeshKind::Sphere, palette::gold_light(), 0.5, 0.2),
            (350, MeshKind::Sphere, palette::pearl(), 0.25, 0.2),
            (200, MeshKind::Sphere, palette::gold_bright(), 0.15, 0.2),
        ];
        for (count, mesh, color, multiplier, emissive) in ornaments {
            let mut config = MeshGroupConfig::new(count, TargetShape::TreeSurface(tree))
                .with_alpha(0.04)
                .with_scatter_radius(35.0)
                .with_motion(MotionProfile::Bob { gain: 2.0 })
                .with_visuals(InstanceVisuals {
                    mesh,
                    color,
                    emissive,
                    scale_multiplier: multiplier,
                    ..InstanceVisuals::default()
                });
            if let Some(s) = next_seed() {
                config = config.with_seed(s);
            }
            scene = scene.with_meshes(config);
        }

        // Tree topper: a single gold star that grows in as the tree forms.
        let mut topper =
            MeshGroupConfig::new(1, TargetShape::Point(Vec3::new(0.0, 8.0, 0.0)))
                .with_alpha(0.05)
                .with_scatter_radius(30.0)
                .with_grow(0.1, 1.1)
                .with_upright()
                .with_motion(MotionProfile::Still)
                .with_visuals(InstanceVisuals {
                    mesh: MeshKind::Star,
                    color: palette::gold_bright(),
                    emissive: 0.8,
                    scale_multiplier: 1.0,
                    halo_scale: 0.0,
                    halo_opacity: 0.0,
                    spin: Vec3::new(0.0, 0.5, 0.0),
                });
        topper.dataset = topper.dataset.with_scale_range(1.0, 1.0);
        if let Some(s) = next_seed() {
            topper = topper.with_seed(s);
        }
        scene = scene.with_meshes(topper);

        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holiday_composition() {
        let scene = Scene::holiday(Some(1));
        assert_eq!(scene.point_groups().len(), 2);
        assert_eq!(scene.mesh_groups().len(), 6);
        assert_eq!(scene.point_groups()[0].len(), 14_400);
        assert_eq!(scene.point_groups()[1].len(), 2_500);
        assert_eq!(scene.mesh_groups()[5].len(), 1);
        assert_eq!(scene.particle_count(), 14_400 + 2_500 + 1_200 + 1);
    }

    #[test]
    fn test_toggle_flips_state() {
        let mut scene = Scene::new();
        assert_eq!(scene.state(), SceneState::TreeShape);
        scene.toggle();
        assert_eq!(scene.state(), SceneState::Scattered);
        scene.toggle();
        assert_eq!(scene.state(), SceneState::TreeShape);
    }

    #[test]
    fn test_groups_desynchronize() {
        // Foliage (alpha 0.05) must lead ornaments (alpha 0.04) while both
        // chase the same target.
        let mut scene = Scene::holiday(Some(2));
        for i in 0..60 {
            scene.update(i as f32 / 60.0);
        }
        let foliage = scene.point_groups()[0].smoothed();
        let ornaments = scene.mesh_groups()[0].smoothed();
        assert!(foliage > ornaments);
        assert!(foliage < 1.0 && ornaments > 0.0);
    }

    #[test]
    fn test_update_fills_all_buffers() {
        let mut scene = Scene::holiday(Some(3));
        scene.update(0.016);
        for g in scene.point_groups() {
            assert_eq!(g.vertices().len(), g.len());
        }
        for g in scene.mesh_groups() {
            assert_eq!(g.instances().len(), g.len());
        }
    }
}
