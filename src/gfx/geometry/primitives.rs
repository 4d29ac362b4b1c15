//! # Primitive Shape Generation
//!
//! Boxes, flat polygons and grid lines. Solid shapes carry outward normals.

use super::GeometryData;
use crate::gfx::scene::vertex::LineVertex;

/// Generate a box centered at the origin
///
/// `width` runs along X, `height` along Y and `depth` along Z, so a wall
/// slab is `generate_box(length, height, thickness)`.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();

    let (x, y, z) = (width * 0.5, height * 0.5, depth * 0.5);

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-x, -y,  z], [ x, -y,  z], [ x,  y,  z], [-x,  y,  z],
        // Back face
        [-x, -y, -z], [-x,  y, -z], [ x,  y, -z], [ x, -y, -z],
        // Left face
        [-x, -y, -z], [-x, -y,  z], [-x,  y,  z], [-x,  y, -z],
        // Right face
        [ x, -y,  z], [ x, -y, -z], [ x,  y, -z], [ x,  y,  z],
        // Top face
        [-x,  y,  z], [ x,  y,  z], [ x,  y, -z], [-x,  y, -z],
        // Bottom face
        [-x, -y, -z], [ x, -y, -z], [ x, -y,  z], [-x, -y,  z],
    ];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.normals = face_normals
        .iter()
        .flat_map(|normal| std::iter::repeat(*normal).take(4))
        .collect();

    // Two counter-clockwise triangles per face
    data.indices = (0..6u32)
        .flat_map(|face| {
            let i = face * 4;
            [i, i + 1, i + 2, i + 2, i + 3, i]
        })
        .collect();

    data
}

/// Generate a flat filled polygon in the XY plane with normals along +Z
///
/// The outline is taken in order and closed implicitly. Concave outlines are
/// triangulated by ear clipping; either winding is accepted.
pub fn generate_flat_polygon(outline: &[[f32; 2]]) -> GeometryData {
    let mut data = GeometryData::new();
    if outline.len() < 3 {
        return data;
    }

    data.vertices = outline.iter().map(|p| [p[0], p[1], 0.0]).collect();
    data.normals = vec![[0.0, 0.0, 1.0]; outline.len()];
    data.indices = triangulate(outline);
    data
}

/// Twice the signed area; positive for counter-clockwise outlines
pub fn signed_area(outline: &[[f32; 2]]) -> f32 {
    let n = outline.len();
    (0..n)
        .map(|i| {
            let a = outline[i];
            let b = outline[(i + 1) % n];
            a[0] * b[1] - b[0] * a[1]
        })
        .sum()
}

fn cross(o: [f32; 2], a: [f32; 2], b: [f32; 2]) -> f32 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

fn point_in_triangle(p: [f32; 2], a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

/// Ear-clipping triangulation producing counter-clockwise triangles
fn triangulate(outline: &[[f32; 2]]) -> Vec<u32> {
    let mut remaining: Vec<usize> = (0..outline.len()).collect();
    if signed_area(outline) < 0.0 {
        remaining.reverse();
    }

    let mut indices = Vec::with_capacity((outline.len() - 2) * 3);

    while remaining.len() > 3 {
        let count = remaining.len();
        let ear = (0..count).find(|&i| {
            let prev = remaining[(i + count - 1) % count];
            let cur = remaining[i];
            let next = remaining[(i + 1) % count];
            let (a, b, c) = (outline[prev], outline[cur], outline[next]);

            if cross(a, b, c) <= 0.0 {
                return false;
            }

            !remaining
                .iter()
                .filter(|&&j| j != prev && j != cur && j != next)
                .any(|&j| outline[j] != a && outline[j] != b && outline[j] != c
                    && point_in_triangle(outline[j], a, b, c))
        });

        match ear {
            Some(i) => {
                let prev = remaining[(i + count - 1) % count];
                let next = remaining[(i + 1) % count];
                indices.extend_from_slice(&[prev as u32, remaining[i] as u32, next as u32]);
                remaining.remove(i);
            }
            None => {
                // Self-intersecting or fully collinear: fan the rest
                for i in 1..count - 1 {
                    indices.extend_from_slice(&[
                        remaining[0] as u32,
                        remaining[i] as u32,
                        remaining[i + 1] as u32,
                    ]);
                }
                remaining.clear();
            }
        }
    }

    if remaining.len() == 3 {
        indices.extend(remaining.iter().map(|&i| i as u32));
    }

    indices
}

/// Generate a square line grid in the XZ plane centered at the origin
///
/// Mirrors the usual grid helper: `divisions + 1` lines per direction, with
/// the two center lines drawn in `center_color`.
pub fn generate_grid_lines(
    size: f32,
    divisions: u32,
    center_color: [f32; 3],
    grid_color: [f32; 3],
) -> Vec<LineVertex> {
    let divisions = divisions.max(1);
    let step = size / divisions as f32;
    let half = size * 0.5;
    let center = divisions / 2;

    let mut lines = Vec::with_capacity(((divisions + 1) * 4) as usize);
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let color = if divisions % 2 == 0 && i == center {
            center_color
        } else {
            grid_color
        };

        lines.push(LineVertex::new([-half, 0.0, k], color));
        lines.push(LineVertex::new([half, 0.0, k], color));
        lines.push(LineVertex::new([k, 0.0, -half], color));
        lines.push(LineVertex::new([k, 0.0, half], color));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon_area(data: &GeometryData) -> f32 {
        data.indices
            .chunks(3)
            .map(|t| {
                let a = data.vertices[t[0] as usize];
                let b = data.vertices[t[1] as usize];
                let c = data.vertices[t[2] as usize];
                cross([a[0], a[1]], [b[0], b[1]], [c[0], c[1]]) * 0.5
            })
            .sum()
    }

    #[test]
    fn test_box_generation() {
        let slab = generate_box(100.0, 260.0, 15.0);
        assert_eq!(slab.vertex_count(), 24); // 6 faces * 4 vertices
        assert_eq!(slab.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(slab.normals.len(), 24);

        let (min, max) = slab.bounds().unwrap();
        assert_eq!(min, [-50.0, -130.0, -7.5]);
        assert_eq!(max, [50.0, 130.0, 7.5]);
    }

    #[test]
    fn test_square_polygon() {
        let square = generate_flat_polygon(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        assert_eq!(square.triangle_count(), 2);
        assert!((polygon_area(&square) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_clockwise_outline_is_rewound() {
        let square = generate_flat_polygon(&[[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0]]);
        assert_eq!(square.triangle_count(), 2);
        // Triangles always come out counter-clockwise
        assert!(polygon_area(&square) > 0.0);
    }

    #[test]
    fn test_concave_l_shape() {
        // L-shaped room, area 3 unit squares
        let outline = [
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 1.0],
            [1.0, 1.0],
            [1.0, 2.0],
            [0.0, 2.0],
        ];
        let floor = generate_flat_polygon(&outline);
        assert_eq!(floor.triangle_count(), 4);
        assert!((polygon_area(&floor) - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_polygon_is_empty() {
        assert!(generate_flat_polygon(&[[0.0, 0.0], [1.0, 1.0]]).is_empty());
    }

    #[test]
    fn test_grid_lines() {
        let grid = generate_grid_lines(3000.0, 40, [0.2; 3], [0.5; 3]);
        assert_eq!(grid.len(), 41 * 4);

        let center: Vec<_> = grid.iter().filter(|v| v.color == [0.2; 3]).collect();
        assert_eq!(center.len(), 4);
        assert!(center.iter().all(|v| v.position[0] == 0.0 || v.position[2] == 0.0));
    }
}
