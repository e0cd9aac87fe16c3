//! Volumetric shape models for target configurations.
//!
//! A morphing group needs a target shape to settle into. The two shapes the
//! engine ships with are a layered conifer volume (the tree) and a tapered
//! spiral band (a garland winding around it). Both are plain config structs:
//! construct one, tweak the fields or builder methods, and hand it to a
//! [`TargetShape`](crate::dataset::TargetShape) when generating a dataset.
//!
//! ```ignore
//! let tree = TreeShape::default();        // reference proportions
//! let tall = TreeShape::new(20.0, 5.0);   // custom height/base radius
//! ```

use std::f32::consts::TAU;

/// Layered-cone ("conifer") volume description.
///
/// The silhouette is a slightly curved cone whose surface radius is carved by
/// periodic indentations, producing ring-like foliage bands rather than a
/// smooth funnel. The shape is vertically centered at the origin: sampled
/// points span `[-height/2, height/2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeShape {
    /// Total height of the tree.
    pub height: f32,
    /// Surface radius at the base (y = 0 before re-centering).
    pub base_radius: f32,
    /// Number of bough bands over the full height.
    pub layers: u32,
    /// How deep each band cuts into the cone radius, as a fraction (0..1).
    pub layer_indent: f32,
    /// Exponent applied to the radial random variable when sampling the
    /// interior. Values below 0.5 bias samples toward the outer surface,
    /// giving denser foliage at the boughs than at the trunk.
    pub surface_bias: f32,
}

impl TreeShape {
    /// Create a tree with the given height and base radius, keeping the
    /// default bough layering.
    pub fn new(height: f32, base_radius: f32) -> Self {
        Self {
            height,
            base_radius,
            ..Self::default()
        }
    }

    /// Set the number of bough bands.
    pub fn with_layers(mut self, layers: u32) -> Self {
        self.layers = layers;
        self
    }

    /// Set the band indentation depth (fraction of the cone radius).
    pub fn with_layer_indent(mut self, indent: f32) -> Self {
        self.layer_indent = indent;
        self
    }

    /// Set the radial bias exponent for interior sampling.
    pub fn with_surface_bias(mut self, bias: f32) -> Self {
        self.surface_bias = bias;
        self
    }

    /// Surface radius at height `y`, where `y` runs from `0` at the base to
    /// `height` at the tip (before vertical re-centering).
    ///
    /// A power of 0.9 on the taper keeps the profile slightly convex, and a
    /// cosine over `layers` full periods indents the radius by up to
    /// `layer_indent` at each trough.
    pub fn radius_at(&self, y: f32) -> f32 {
        let normalized = (y / self.height).clamp(0.0, 1.0);
        let cone = self.base_radius * (1.0 - normalized).powf(0.9);

        let band_phase = normalized * self.layers as f32 * TAU;
        let band = band_phase.cos();
        cone * (1.0 - self.layer_indent * (0.5 + 0.5 * band))
    }

    /// Half the tree height; sampled points are re-centered by this amount.
    #[inline]
    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }
}

impl Default for TreeShape {
    fn default() -> Self {
        Self {
            height: 14.0,
            base_radius: 6.5,
            layers: 8,
            layer_indent: 0.15,
            surface_bias: 0.4,
        }
    }
}

/// Tapered spiral band winding around the tree, for garland-style groups.
///
/// Points are laid out parametrically along the spiral by particle index and
/// then jittered within a small radial band so the garland reads as a ribbon
/// of light rather than a mathematical curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralShape {
    /// Number of full revolutions from bottom to top.
    pub turns: f32,
    /// Vertical extent covered by the spiral.
    pub height: f32,
    /// Y coordinate where the spiral starts (its lowest point).
    pub start_y: f32,
    /// Spiral radius at the bottom.
    pub base_radius: f32,
    /// Fraction of the base radius lost by the top (0.95 leaves 5% at the tip).
    pub taper: f32,
    /// Minimum jitter distance off the ideal curve.
    pub spread_min: f32,
    /// Maximum jitter distance off the ideal curve.
    pub spread_max: f32,
}

impl SpiralShape {
    /// Position on the ideal spiral at parameter `p` in `[0, 1]`.
    ///
    /// Returns `(x, y, z)` components before jitter is applied.
    pub fn point_at(&self, p: f32) -> (f32, f32, f32) {
        let angle = p * TAU * self.turns;
        let y = self.start_y + p * self.height;
        let r = self.base_radius * (1.0 - p * self.taper);
        (angle.cos() * r, y, angle.sin() * r)
    }
}

impl Default for SpiralShape {
    fn default() -> Self {
        Self {
            turns: 8.5,
            height: 13.0,
            start_y: -6.5,
            base_radius: 7.2,
            taper: 0.95,
            spread_min: 0.05,
            spread_max: 0.20,
        }
    }
}
