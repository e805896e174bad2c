//! Mesh types: immutable base geometry and its precomputed spherical view.

use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex data for the deformable mesh.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

/// Spherical coordinates of one base vertex.
#[derive(Debug, Clone, Copy)]
pub struct SphericalVertex {
    /// Latitude in radians, `asin(z / r)`.
    pub lat: f32,
    /// Longitude in radians, `atan2(y, x)`.
    pub lon: f32,
    /// Distance from the origin.
    pub r: f32,
}

/// Immutable rest-shape geometry, loaded once per session. Source of truth
/// for every deformation pass; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct BaseMesh {
    vertices: Vec<Vertex>,
}

impl BaseMesh {
    /// Wrap a flat vertex list (the shape the asset loader hands over).
    pub fn from_positions(positions: Vec<[f32; 3]>) -> Self {
        let vertices = positions
            .into_iter()
            .map(|position| Vertex { position })
            .collect();
        Self { vertices }
    }

    /// Generate a UV sphere: `rings - 1` latitude bands of `segments`
    /// vertices each, plus the two poles.
    pub fn uv_sphere(rings: usize, segments: usize, radius: f32) -> Self {
        // A sphere needs at least two rings and three segments.
        let rings = rings.max(2);
        let segments = segments.max(3);

        let mut vertices = Vec::with_capacity((rings - 1) * segments + 2);

        vertices.push(Vertex {
            position: [0.0, 0.0, radius],
        });

        for ring in 1..rings {
            let lat = PI / 2.0 - PI * ring as f32 / rings as f32;
            for seg in 0..segments {
                let lon = 2.0 * PI * seg as f32 / segments as f32 - PI;
                vertices.push(Vertex {
                    position: [
                        radius * lat.cos() * lon.cos(),
                        radius * lat.cos() * lon.sin(),
                        radius * lat.sin(),
                    ],
                });
            }
        }

        vertices.push(Vertex {
            position: [0.0, 0.0, -radius],
        });

        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Per-vertex spherical coordinates derived once from a [`BaseMesh`].
///
/// A pure function of geometry that never changes, so it is computed a
/// single time at mesh load and reused by every pass.
#[derive(Debug, Clone)]
pub struct SphericalCache {
    coords: Vec<SphericalVertex>,
}

impl SphericalCache {
    /// Convert every base vertex to spherical coordinates.
    ///
    /// A vertex at the origin has no meaningful angles; it is stored with
    /// `r = 0` and the deformation leaves it in place instead of producing
    /// NaN.
    pub fn from_mesh(mesh: &BaseMesh) -> Self {
        let coords = mesh
            .vertices()
            .iter()
            .map(|v| {
                let p = Vec3::from_array(v.position);
                let r = p.length();
                if r == 0.0 {
                    SphericalVertex {
                        lat: 0.0,
                        lon: 0.0,
                        r: 0.0,
                    }
                } else {
                    SphericalVertex {
                        lat: (p.z / r).asin(),
                        lon: p.y.atan2(p.x),
                        r,
                    }
                }
            })
            .collect();
        Self { coords }
    }

    pub fn coords(&self) -> &[SphericalVertex] {
        &self.coords
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}
