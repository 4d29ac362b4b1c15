//! Material system
//!
//! Provides material definitions and centralized management with GPU resource handling.
//! Materials are stored in MaterialManager and objects reference them by ID.

use std::collections::HashMap;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use wgpu::Device;

use super::texture_resource::TextureResource;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Material ID for referencing materials
pub type MaterialId = String;

pub const DEFAULT_MATERIAL: &str = "default";

/// Converts a `0xRRGGBB` color into linear 0..1 channels
pub fn rgb_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    _padding: [f32; 2],
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Layout shared by every material bind group
///
/// Binding 0 is the [`MaterialUniform`], 1 the base color texture and 2 its
/// sampler.
pub fn create_material_layout(device: &Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_fragment(binding_types::uniform())
        .next_binding_fragment(binding_types::texture_2d())
        .next_binding_fragment(binding_types::filtering_sampler())
        .create(device, "Material Bind Group Layout")
}

/// Surface color and finish of a mesh
///
/// The base color texture, when present, is multiplied by `base_color`.
/// Untextured materials sample a single white texel instead.
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub texture: Option<Arc<RgbaImage>>,

    // GPU resources - shared by all objects using this material
    gpu: Option<MaterialGpu>,
}

struct MaterialGpu {
    ubo: MaterialUBO,
    // Kept alive for the bind group
    _texture: TextureResource,
    _sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
}

impl Default for Material {
    fn default() -> Self {
        Self::new(DEFAULT_MATERIAL, [0.8, 0.8, 0.8, 1.0], 0.0, 0.5)
    }
}

impl Material {
    /// Creates a new material
    ///
    /// # Arguments
    /// * `name` - Unique name for this material
    /// * `base_color` - RGBA base color
    /// * `metallic` - Metallic factor (0.0 = dielectric, 1.0 = metallic)
    /// * `roughness` - Surface roughness (0.0 = mirror, 1.0 = rough)
    pub fn new(name: &str, base_color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            texture: None,
            gpu: None,
        }
    }

    pub fn with_texture(mut self, texture: Arc<RgbaImage>) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn uniform(&self) -> MaterialUniform {
        MaterialUniform {
            base_color: self.base_color,
            metallic: self.metallic,
            roughness: self.roughness,
            _padding: [0.0; 2],
        }
    }

    /// Creates the GPU resources on first use and syncs the uniform
    pub fn update_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
    ) {
        let uniform = self.uniform();
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.ubo.update_content(queue, uniform);
            return;
        }

        let mut ubo = MaterialUBO::new(device);
        ubo.update_content(queue, uniform);

        let label = format!("Material: {}", self.name);
        let texture = match self.texture.as_deref() {
            Some(image) => TextureResource::from_rgba(device, queue, image, &label),
            None => TextureResource::from_rgba(device, queue, &white_texel(), &label),
        };
        let sampler = TextureResource::create_material_sampler(device);

        let bind_group = BindGroupBuilder::new(layout)
            .resource(ubo.binding_resource())
            .resource(wgpu::BindingResource::TextureView(&texture.view))
            .resource(wgpu::BindingResource::Sampler(&sampler))
            .create(device, &label);

        self.gpu = Some(MaterialGpu {
            ubo,
            _texture: texture,
            _sampler: sampler,
            bind_group,
        });
    }

    /// Gets the bind group for rendering
    pub fn get_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.bind_group)
    }
}

fn white_texel() -> RgbaImage {
    RgbaImage::from_pixel(1, 1, Rgba([255; 4]))
}

/// Manages all materials in the engine
///
/// Objects reference materials by ID rather than storing material data
/// directly, so all walls share one uniform buffer.
pub struct MaterialManager {
    materials: HashMap<MaterialId, Material>,
    default_material: Material,
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialManager {
    pub fn new() -> Self {
        Self {
            materials: HashMap::new(),
            default_material: Material::default(),
        }
    }

    /// Adds a material, replacing any with the same name
    pub fn add_material(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    pub fn get_material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn get_default_material(&self) -> &Material {
        &self.default_material
    }

    /// Gets material for an object with fallback to default
    ///
    /// Handles objects with no material assigned or with a material that
    /// doesn't exist.
    pub fn get_material_for_object(&self, material_id: Option<&MaterialId>) -> &Material {
        material_id
            .and_then(|id| self.get_material(id))
            .unwrap_or(&self.default_material)
    }

    /// Lists all material IDs, the default included
    pub fn list_materials(&self) -> Vec<&str> {
        std::iter::once(self.default_material.name.as_str())
            .chain(self.materials.keys().map(String::as_str))
            .collect()
    }

    /// Updates GPU resources for all materials
    pub fn update_all_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
    ) {
        self.default_material
            .update_gpu_resources(device, queue, layout);
        for material in self.materials.values_mut() {
            material.update_gpu_resources(device, queue, layout);
        }
    }
}
