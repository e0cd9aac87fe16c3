//! Mesh generation for instanced groups.
//!
//! Three meshes cover the whole scene: a unit cube for gift boxes, a UV
//! sphere for baubles, and an extruded five-point star for the topper. All
//! are generated once at adapter construction.

use crate::visuals::MeshKind;
use bytemuck::{Pod, Zeroable};
use std::f32::consts::{PI, TAU};

/// One mesh vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MeshVertex {
    /// Local position.
    pub position: [f32; 3],
    /// Local normal.
    pub normal: [f32; 3],
}

/// CPU-side mesh ready for upload.
pub struct MeshData {
    /// Vertex list.
    pub vertices: Vec<MeshVertex>,
    /// Triangle index list.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Build the mesh for a [`MeshKind`] at reference proportions.
    pub fn for_kind(kind: MeshKind) -> Self {
        match kind {
            MeshKind::Cube => cube(1.0),
            MeshKind::Sphere => uv_sphere(0.6, 16, 16),
            MeshKind::Star => star(1.2, 0.5, 0.4),
        }
    }
}

/// Axis-aligned cube with the given edge length, centered at origin.
pub fn cube(edge: f32) -> MeshData {
    let h = edge * 0.5;
    // One quad per face so normals stay flat.
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
        ([0.0, -1.0, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0, 0.0]),
        ([0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]),
        ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, up, right) in faces {
        let base = vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = [
                (normal[0] + right[0] * su + up[0] * sv) * h,
                (normal[1] + right[1] * su + up[1] * sv) * h,
                (normal[2] + right[2] * su + up[2] * sv) * h,
            ];
            vertices.push(MeshVertex { position, normal });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

/// UV sphere of the given radius.
pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> MeshData {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        for seg in 0..=segments {
            let theta = TAU * seg as f32 / segments as f32;
            let n = [
                phi.sin() * theta.cos(),
                phi.cos(),
                phi.sin() * theta.sin(),
            ];
            vertices.push(MeshVertex {
                position: [n[0] * radius, n[1] * radius, n[2] * radius],
                normal: n,
            });
        }
    }

    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    MeshData { vertices, indices }
}

/// Extruded five-point star pointing up, centered at origin.
pub fn star(outer_radius: f32, inner_radius: f32, depth: f32) -> MeshData {
    let points = 5u32;
    let half = depth * 0.5;

    // Star outline, alternating outer/inner radii, first point straight up.
    let outline: Vec<[f32; 2]> = (0..points * 2)
        .map(|i| {
            let r = if i % 2 == 0 { outer_radius } else { inner_radius };
            let a = (i as f32 / (points * 2) as f32) * TAU + PI / 2.0;
            [a.cos() * r, a.sin() * r]
        })
        .collect();

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Front and back faces as fans around a center vertex.
    for &(z, nz) in &[(half, 1.0f32), (-half, -1.0f32)] {
        let center = vertices.len() as u32;
        vertices.push(MeshVertex {
            position: [0.0, 0.0, z],
            normal: [0.0, 0.0, nz],
        });
        let ring_base = vertices.len() as u32;
        for p in &outline {
            vertices.push(MeshVertex {
                position: [p[0], p[1], z],
                normal: [0.0, 0.0, nz],
            });
        }
        let n = outline.len() as u32;
        for i in 0..n {
            let a = ring_base + i;
            let b = ring_base + (i + 1) % n;
            if nz > 0.0 {
                indices.extend_from_slice(&[center, a, b]);
            } else {
                indices.extend_from_slice(&[center, b, a]);
            }
        }
    }

    // Side quads with per-edge flat normals.
    let n = outline.len();
    for i in 0..n {
        let p0 = outline[i];
        let p1 = outline[(i + 1) % n];
        let edge = [p1[0] - p0[0], p1[1] - p0[1]];
        let len = (edge[0] * edge[0] + edge[1] * edge[1]).sqrt().max(1e-6);
        let normal = [edge[1] / len, -edge[0] / len, 0.0];

        let base = vertices.len() as u32;
        for &(p, z) in &[(p0, half), (p1, half), (p1, -half), (p0, -half)] {
            vertices.push(MeshVertex {
                position: [p[0], p[1], z],
                normal,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_counts() {
        let m = cube(1.0);
        assert_eq!(m.vertices.len(), 24);
        assert_eq!(m.indices.len(), 36);
        for v in &m.vertices {
            for c in v.position {
                assert!(c.abs() <= 0.5 + 1e-6);
            }
        }
    }

    #[test]
    fn test_sphere_radius() {
        let m = uv_sphere(0.6, 16, 16);
        for v in &m.vertices {
            let r = (v.position[0].powi(2) + v.position[1].powi(2) + v.position[2].powi(2)).sqrt();
            assert!((r - 0.6).abs() < 1e-4);
        }
        assert_eq!(m.indices.len() as u32, 16 * 16 * 6);
    }

    #[test]
    fn test_star_extent() {
        let m = star(1.2, 0.5, 0.4);
        let mut max_r = 0.0f32;
        let mut top_y = f32::MIN;
        for v in &m.vertices {
            let r = (v.position[0].powi(2) + v.position[1].powi(2)).sqrt();
            max_r = max_r.max(r);
            top_y = top_y.max(v.position[1]);
            assert!(v.position[2].abs() <= 0.2 + 1e-6);
        }
        assert!((max_r - 1.2).abs() < 1e-4);
        // First outline point faces straight up.
        assert!((top_y - 1.2).abs() < 1e-4);
        assert!(m.indices.len() % 3 == 0);
    }
}
