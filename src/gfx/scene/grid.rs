//! Ground grid drawn under the floorplan.

use cgmath::Vector3;
use wgpu::Device;

use super::vertex::LineVertex;
use crate::gfx::geometry::generate_grid_lines;

pub struct GridHelper {
    pub center: Vector3<f32>,
    lines: Vec<LineVertex>,
    vertex_buffer: Option<wgpu::Buffer>,
}

impl GridHelper {
    /// Square grid of `size` units split into `divisions` cells, centered
    /// at `center`
    pub fn new(
        size: f32,
        divisions: u32,
        center_color: [f32; 3],
        grid_color: [f32; 3],
        center: Vector3<f32>,
    ) -> Self {
        let lines = generate_grid_lines(size, divisions, center_color, grid_color)
            .into_iter()
            .map(|v| {
                LineVertex::new(
                    [
                        v.position[0] + center.x,
                        v.position[1] + center.y,
                        v.position[2] + center.z,
                    ],
                    v.color,
                )
            })
            .collect();

        Self {
            center,
            lines,
            vertex_buffer: None,
        }
    }

    pub fn lines(&self) -> &[LineVertex] {
        &self.lines
    }

    pub fn vertex_count(&self) -> u32 {
        self.lines.len() as u32
    }

    pub fn vertex_buffer(&self) -> Option<&wgpu::Buffer> {
        self.vertex_buffer.as_ref()
    }

    pub fn init_gpu_resources(&mut self, device: &Device) {
        if self.vertex_buffer.is_some() {
            return;
        }

        self.vertex_buffer = Some(wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Grid Vertex Buffer"),
                contents: bytemuck::cast_slice(&self.lines),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_shifted_to_center() {
        let grid = GridHelper::new(100.0, 2, [0.0; 3], [1.0; 3], Vector3::new(50.0, 0.0, -20.0));
        assert_eq!(grid.vertex_count(), 12);

        let xs: Vec<f32> = grid.lines().iter().map(|v| v.position[0]).collect();
        let zs: Vec<f32> = grid.lines().iter().map(|v| v.position[2]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), 0.0);
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 100.0);
        assert_eq!(zs.iter().cloned().fold(f32::MAX, f32::min), -70.0);
        assert_eq!(zs.iter().cloned().fold(f32::MIN, f32::max), 30.0);
    }
}
