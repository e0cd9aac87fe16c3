//! Visual configuration for morphing groups.
//!
//! Rendering options live here, separate from the motion math: colors, blend
//! modes, size curves, instanced-mesh material parameters. Groups are handed
//! a visuals struct at construction and never change it afterwards.
//!
//! ```ignore
//! let visuals = PointVisuals {
//!     color_bottom: palette::green_deep() * 0.8,
//!     color_top: palette::green_deep() * 1.5,
//!     color_glow: palette::gold() * 1.5,
//!     ..PointVisuals::default()
//! };
//! ```

use glam::Vec3;

/// Convert a packed `0xRRGGBB` color to an RGB vector in `[0, 1]`.
pub fn hex(rgb: u32) -> Vec3 {
    Vec3::new(
        ((rgb >> 16) & 0xFF) as f32 / 255.0,
        ((rgb >> 8) & 0xFF) as f32 / 255.0,
        (rgb & 0xFF) as f32 / 255.0,
    )
}

/// Reference scene palette.
pub mod palette {
    use super::hex;
    use glam::Vec3;

    /// Deep conifer green, the foliage base.
    pub fn green_deep() -> Vec3 {
        hex(0x022D18)
    }

    /// Classic metallic gold.
    pub fn gold() -> Vec3 {
        hex(0xD4AF37)
    }

    /// Bright gold for the garland and topper.
    pub fn gold_bright() -> Vec3 {
        hex(0xFFD700)
    }

    /// Pale gold for baubles.
    pub fn gold_light() -> Vec3 {
        hex(0xF5E080)
    }

    /// Deep ornament red.
    pub fn red_deep() -> Vec3 {
        hex(0x8B0000)
    }

    /// Silver/pearl white.
    pub fn pearl() -> Vec3 {
        hex(0xFFFFFF)
    }
}

/// How a group's fragments combine with what is already on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha blending with depth write.
    #[default]
    Alpha,
    /// Additive glow blending, no depth write.
    Additive,
}

/// Visual parameters for a point (billboard) group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointVisuals {
    /// Color at the bottom of the target shape.
    pub color_bottom: Vec3,
    /// Color at the top of the target shape.
    pub color_top: Vec3,
    /// Color mixed in by the sparkle channel.
    pub color_glow: Vec3,
    /// Point-size coefficient while fully scattered.
    pub size_scattered: f32,
    /// Point-size coefficient while fully settled.
    pub size_settled: f32,
    /// Constant size added after the per-particle factor.
    pub size_boost: f32,
    /// Blend mode for the group.
    pub blend: BlendMode,
}

impl Default for PointVisuals {
    fn default() -> Self {
        Self {
            color_bottom: palette::green_deep() * 0.8,
            color_top: palette::green_deep() * 1.5,
            color_glow: palette::gold() * 1.5,
            size_scattered: 60.0,
            size_settled: 35.0,
            size_boost: 10.0,
            blend: BlendMode::Additive,
        }
    }
}

/// Mesh rendered for each instance of a mesh group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    /// Unit cube (gift boxes).
    Cube,
    /// UV sphere of radius 0.6 (baubles).
    Sphere,
    /// Extruded five-point star (the tree topper).
    Star,
}

/// Visual parameters for an instanced mesh group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceVisuals {
    /// Mesh drawn per instance.
    pub mesh: MeshKind,
    /// Base material color.
    pub color: Vec3,
    /// Emissive contribution of the base color (0..1).
    pub emissive: f32,
    /// Uniform scale applied on top of each particle's base scale.
    pub scale_multiplier: f32,
    /// Relative size of the additive halo shell; 0 disables the halo pass.
    pub halo_scale: f32,
    /// Opacity of the halo shell.
    pub halo_opacity: f32,
    /// Constant spin rate per axis, radians per second.
    pub spin: Vec3,
}

impl Default for InstanceVisuals {
    fn default() -> Self {
        Self {
            mesh: MeshKind::Sphere,
            color: palette::gold_light(),
            emissive: 0.2,
            scale_multiplier: 1.0,
            halo_scale: 1.3,
            halo_opacity: 0.1,
            spin: Vec3::new(0.2, 0.1, 0.0),
        }
    }
}
