//! # Procedural Geometry Generation
//!
//! Builds the mesh data the floorplan scene needs without external model
//! files: sized boxes for walls and placeholders, flat polygons for floors,
//! and the line grid drawn under the plan.
//!
//! ## Usage
//!
//! ```rust
//! use planview::gfx::geometry::{generate_box, generate_flat_polygon};
//!
//! // A 100 x 260 x 15 wall slab
//! let wall = generate_box(100.0, 260.0, 15.0);
//! assert_eq!(wall.triangle_count(), 12);
//!
//! // A square floor in the XY plane
//! let floor = generate_flat_polygon(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
//! assert_eq!(floor.triangle_count(), 2);
//! ```

pub mod primitives;

pub use primitives::*;

use cgmath::{InnerSpace, Matrix, Matrix3, Matrix4, SquareMatrix, Vector3, Vector4};

use crate::gfx::scene::vertex::Vertex3D;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
    /// Texture coordinates, empty for untextured geometry
    pub tex_coords: Vec<[f32; 2]>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            tex_coords: Vec::new(),
        }
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Axis-aligned bounds as (min, max), `None` for empty geometry
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (
                [min[0].min(v[0]), min[1].min(v[1]), min[2].min(v[2])],
                [max[0].max(v[0]), max[1].max(v[1]), max[2].max(v[2])],
            )
        }))
    }

    /// Bakes a transform into positions and normals
    pub fn transform(&mut self, matrix: Matrix4<f32>) {
        let linear = Matrix3::from_cols(
            matrix.x.truncate(),
            matrix.y.truncate(),
            matrix.z.truncate(),
        );
        let normal_matrix = linear
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or(linear);

        for position in &mut self.vertices {
            let p = matrix * Vector4::new(position[0], position[1], position[2], 1.0);
            *position = [p.x, p.y, p.z];
        }
        for normal in &mut self.normals {
            let n = normal_matrix * Vector3::from(*normal);
            let n = if n.magnitude2() > 0.0 { n.normalize() } else { n };
            *normal = n.into();
        }
    }

    /// Recomputes per-vertex normals by averaging adjacent face normals
    ///
    /// Faces contribute weighted by their area; vertices touched by no
    /// triangle point up.
    pub fn compute_normals(&mut self) {
        let mut accumulated = vec![Vector3::new(0.0f32, 0.0, 0.0); self.vertices.len()];

        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            let (Some(v0), Some(v1), Some(v2)) = (
                self.vertices.get(i0),
                self.vertices.get(i1),
                self.vertices.get(i2),
            ) else {
                continue;
            };

            let v0 = Vector3::from(*v0);
            let face_normal = (Vector3::from(*v1) - v0).cross(Vector3::from(*v2) - v0);
            for index in [i0, i1, i2] {
                accumulated[index] += face_normal;
            }
        }

        self.normals = accumulated
            .into_iter()
            .map(|n| {
                if n.magnitude2() > 0.0 {
                    n.normalize().into()
                } else {
                    [0.0, 1.0, 0.0]
                }
            })
            .collect();
    }

    /// Convert to the vertex format used by the renderer
    pub fn to_scene_format(&self) -> (Vec<Vertex3D>, Vec<u32>) {
        let vertices: Vec<Vertex3D> = (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coords: self.tex_coords.get(i).copied().unwrap_or_default(),
            })
            .collect();

        (vertices, self.indices.clone())
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}
