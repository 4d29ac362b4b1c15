//! Global uniform bindings for camera and scene data
//!
//! Manages GPU uniform buffers and bind groups for global rendering state
//! that is shared across all objects in a scene: camera matrices and the
//! scene lights.

use crate::{
    gfx::{camera::camera_manager::CameraUniform, scene::Lights},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Directional lights beyond this count are ignored by the shader
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

/// Global uniform buffer content structure
///
/// MUST match the `Globals` struct in `scene.wgsl` exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],  // Camera position (homogeneous coordinates)
    view_proj: [[f32; 4]; 4], // Camera view-projection matrix

    ambient: [f32; 4], // rgb premultiplied by intensity
    light_directions: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS], // towards the light
    light_colors: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS], // rgb premultiplied by intensity
    light_count: [u32; 4],
}

impl GlobalUBOContent {
    pub fn new(camera: CameraUniform, lights: &Lights) -> Self {
        let ambient = lights
            .ambient
            .map(|a| {
                [
                    a.color[0] * a.intensity,
                    a.color[1] * a.intensity,
                    a.color[2] * a.intensity,
                    1.0,
                ]
            })
            .unwrap_or([0.0; 4]);

        let mut light_directions = [[0.0; 4]; MAX_DIRECTIONAL_LIGHTS];
        let mut light_colors = [[0.0; 4]; MAX_DIRECTIONAL_LIGHTS];
        let used = lights.directional.len().min(MAX_DIRECTIONAL_LIGHTS);
        for (i, light) in lights.directional.iter().take(used).enumerate() {
            let d = light.direction();
            light_directions[i] = [d.x, d.y, d.z, 0.0];
            light_colors[i] = [
                light.color[0] * light.intensity,
                light.color[1] * light.intensity,
                light.color[2] * light.intensity,
                1.0,
            ];
        }

        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            ambient,
            light_directions,
            light_colors,
            light_count: [used as u32, 0, 0, 0],
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Updates the global uniform buffer with camera and light data
///
/// Called once per frame before any draw.
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    lights: &Lights,
) {
    ubo.update_content(queue, GlobalUBOContent::new(camera, lights));
}

/// Manages bind group layouts and bind groups for global uniforms
///
/// Bound to slot 0 in all render pipelines.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform()) // Global uniforms (camera + lights)
            .create(device, "Globals Bind Group Layout");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Global Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::{AmbientLight, DirectionalLight};
    use cgmath::Vector3;

    #[test]
    fn lights_are_premultiplied_and_capped() {
        let mut lights = Lights {
            ambient: Some(AmbientLight {
                color: [1.0, 1.0, 1.0],
                intensity: 0.8,
            }),
            directional: Vec::new(),
        };
        for _ in 0..6 {
            lights.directional.push(DirectionalLight::new(
                [1.0, 0.5, 0.0],
                2.0,
                Vector3::new(0.0, 5.0, 0.0),
            ));
        }

        let content = GlobalUBOContent::new(CameraUniform::default(), &lights);

        assert_eq!(content.ambient, [0.8, 0.8, 0.8, 1.0]);
        assert_eq!(content.light_count[0], MAX_DIRECTIONAL_LIGHTS as u32);
        assert_eq!(content.light_colors[0], [2.0, 1.0, 0.0, 1.0]);
        assert_eq!(content.light_directions[0], [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn layout_size_matches_shader() {
        // 16 + 64 + 16 + 64 + 64 + 16
        assert_eq!(std::mem::size_of::<GlobalUBOContent>(), 240);
    }
}
