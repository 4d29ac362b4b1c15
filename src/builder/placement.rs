//! Plan-to-world placement math.
//!
//! Plan coordinates are (x, y) on the floor; the world is Y-up, so plan y
//! becomes world z. Rotations about the vertical axis are negated because
//! the plan's y axis points the other way from world z under a right-handed
//! Y-up frame.

use cgmath::{Rad, Vector3};

use crate::layout::{Layer, Vertex};

pub const DEFAULT_WALL_HEIGHT: f32 = 260.0;
pub const WALL_THICKNESS: f32 = 15.0;
/// Width, height and depth of the box shown until an item's model loads
pub const PLACEHOLDER_SIZE: [f32; 3] = [50.0, 100.0, 50.0];
/// Floors float just above the grid to avoid z-fighting with it
pub const FLOOR_ELEVATION: f32 = 0.2;

/// Mean of every vertex in the layer, lifted to the ground plane
///
/// Returns `None` for a layer without vertices.
pub fn centroid(layer: &Layer) -> Option<Vector3<f32>> {
    let count = layer.vertices.len();
    if count == 0 {
        return None;
    }

    let (sum_x, sum_y) = layer
        .vertices
        .values()
        .fold((0.0f64, 0.0f64), |(sx, sy), v| (sx + v.x as f64, sy + v.y as f64));

    Some(Vector3::new(
        (sum_x / count as f64) as f32,
        0.0,
        (sum_y / count as f64) as f32,
    ))
}

/// Rotation that turns the +X axis onto the segment `start -> end`
pub fn segment_rotation(start: Vertex, end: Vertex) -> Rad<f32> {
    Rad(-(end.y - start.y).atan2(end.x - start.x))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallPlacement {
    pub length: f32,
    pub height: f32,
    pub center: Vector3<f32>,
    pub rotation_y: Rad<f32>,
}

/// Box dimensions and pose for a wall between two vertices
pub fn wall_placement(start: Vertex, end: Vertex, height: Option<f32>) -> WallPlacement {
    let height = height.unwrap_or(DEFAULT_WALL_HEIGHT);
    let (dx, dy) = (end.x - start.x, end.y - start.y);

    WallPlacement {
        length: (dx * dx + dy * dy).sqrt(),
        height,
        center: Vector3::new(
            (start.x + end.x) / 2.0,
            height / 2.0,
            (start.y + end.y) / 2.0,
        ),
        rotation_y: segment_rotation(start, end),
    }
}

/// Ground position and rotation of an opening `offset` along a wall
///
/// Offsets outside [0, 1] are clamped so the model stays on its wall.
pub fn hole_placement(start: Vertex, end: Vertex, offset: f32) -> (Vector3<f32>, Rad<f32>) {
    let t = offset.clamp(0.0, 1.0);
    let position = Vector3::new(
        start.x + (end.x - start.x) * t,
        0.0,
        start.y + (end.y - start.y) * t,
    );
    (position, segment_rotation(start, end))
}

/// Item rotation in plan degrees as a world rotation about Y
pub fn item_rotation(degrees: f32) -> Rad<f32> {
    Rad(-degrees.to_radians())
}
