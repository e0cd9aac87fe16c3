//! # DMPE - Dual Morph Particle Engine
//!
//! Particle scenes that morph between a scattered cloud and a structured
//! shape, driven by a single state toggle.
//!
//! Every particle carries two precomputed homes: a random point in a
//! scattered sphere and a point on or in a target shape. Flipping the scene
//! state retargets per-group smoothers; each frame eases the smoothed value
//! and interpolates every particle between its homes, layering drift, bob,
//! or shimmer motion on top. The renderer only uploads what the groups
//! computed.
//!
//! ## Quick Start
//!
//! ```no_run
//! use dmpe::prelude::*;
//!
//! let scene = Scene::holiday(None);
//! Viewer::new(scene).run().unwrap();
//! ```
//!
//! Press space in the viewer to toggle between the scattered cloud and the
//! assembled tree. Drag to orbit, scroll to zoom.
//!
//! ## Building a custom scene
//!
//! ```
//! use dmpe::prelude::*;
//!
//! let mut scene = Scene::new()
//!     .with_points(
//!         PointGroupConfig::new(5_000, TargetShape::TreeVolume(TreeShape::default()))
//!             .with_seed(7)
//!             .with_motion(MotionProfile::Drift { scattered: 2.0, settled: 0.1 }),
//!     );
//!
//! scene.set_state(SceneState::TreeShape);
//! scene.update(0.016);
//! let vertices = scene.point_groups()[0].vertices();
//! assert_eq!(vertices.len(), 5_000);
//! ```
//!
//! ## Core Concepts
//!
//! - [`MorphDataset`] generates the per-particle attribute table once per
//!   group: both homes, scale, rotation, speed, phase, random.
//! - [`ProgressSmoother`] turns the boolean scene state into a continuous
//!   0..1 value with exponential smoothing; groups with smaller smoothing
//!   factors visibly lag behind, which is what staggers the assembly.
//! - [`PointGroup`] and [`MeshGroup`] apply easing, interpolation, and
//!   secondary motion to produce GPU-ready buffers.
//! - [`Scene`] owns the groups and the shared state toggle.
//! - [`Viewer`] and the `gpu` module render the buffers with wgpu.

pub mod dataset;
pub mod ease;
pub mod error;
pub mod gpu;
pub mod group;
pub mod progress;
pub mod sample;
pub mod scene;
pub mod shape;
pub mod time;
pub mod visuals;
pub mod window;

pub use dataset::{DatasetConfig, DualPosition, MorphDataset, TargetShape};
pub use ease::cubic_in_out;
pub use error::{RenderError, ViewerError};
pub use glam::{Quat, Vec3};
pub use group::{
    Flicker, InstanceData, MeshGroup, MeshGroupConfig, MotionProfile, PointGroup,
    PointGroupConfig, PointVertex,
};
pub use progress::{ProgressSmoother, SceneState};
pub use sample::SampleContext;
pub use scene::Scene;
pub use shape::{SpiralShape, TreeShape};
pub use time::FrameClock;
pub use visuals::{BlendMode, InstanceVisuals, MeshKind, PointVisuals};
pub use window::Viewer;

/// Common imports for building and viewing morph scenes.
pub mod prelude {
    pub use crate::dataset::{DatasetConfig, MorphDataset, TargetShape};
    pub use crate::group::{
        Flicker, MeshGroup, MeshGroupConfig, MotionProfile, PointGroup, PointGroupConfig,
    };
    pub use crate::progress::SceneState;
    pub use crate::scene::Scene;
    pub use crate::shape::{SpiralShape, TreeShape};
    pub use crate::visuals::{BlendMode, InstanceVisuals, MeshKind, PointVisuals};
    pub use crate::window::Viewer;
    pub use glam::Vec3;
}
