use std::fmt;
use std::ops::Range;

use cgmath::{Matrix4, Rad, Vector3, Zero};
use wgpu::Device;

use super::vertex::Vertex3D;
use crate::gfx::geometry::GeometryData;
use crate::gfx::resources::material::MaterialId;

/// Stable handle for a node in the scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node was built from, keyed by the layout entity id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Wall { line: String },
    Floor { area: String },
    /// Box shown for an item until its model arrives
    Placeholder { item: String },
    Furniture { item: String },
    Door { hole: String },
}

impl NodeKind {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, NodeKind::Placeholder { .. })
    }
}

pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    pub index_count: u32,
    pub vertex_count: u32,
    /// Overrides the owning object's material when set
    pub material_id: Option<MaterialId>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        Self {
            index_count: indices.len() as u32,
            vertex_count: vertices.len() as u32,
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
            material_id: None,
        }
    }

    pub fn from_geometry(geometry: &GeometryData) -> Self {
        let (vertices, indices) = geometry.to_scene_format();
        Self::new(vertices, indices)
    }

    pub fn with_material(mut self, material_id: impl Into<MaterialId>) -> Self {
        self.material_id = Some(material_id.into());
        self
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    fn init_gpu_resources(&mut self, device: &Device) {
        self.vertex_buffer = Some(wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));

        self.index_buffer = Some(wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        ));
    }
}

/// Translation plus rotation about X then Y, matching how the plan is laid
/// out: floors tip over about X, everything else turns about the vertical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation_x: Rad<f32>,
    pub rotation_y: Rad<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vector3::zero(),
            rotation_x: Rad(0.0),
            rotation_y: Rad(0.0),
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vector3<f32>) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn with_rotation_x(mut self, angle: Rad<f32>) -> Self {
        self.rotation_x = angle;
        self
    }

    pub fn with_rotation_y(mut self, angle: Rad<f32>) -> Self {
        self.rotation_y = angle;
        self
    }

    /// Model matrix, T * Rx * Ry
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from_angle_x(self.rotation_x)
            * Matrix4::from_angle_y(self.rotation_y)
    }
}

// GPU resources struct to hold the per-object uniform buffer and bind group
pub struct ObjectGpuResources {
    pub transform_buffer: wgpu::Buffer,
    pub transform_bind_group: wgpu::BindGroup,
}

/// A node in the scene graph
pub struct Object {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub meshes: Vec<Mesh>,
    pub transform: Transform,
    pub material_id: Option<MaterialId>,
    pub visible: bool,
    pub gpu_resources: Option<ObjectGpuResources>, // None until init_gpu_resources called
}

impl Object {
    /// Create a new object; the scene assigns its id on insertion
    pub fn new(kind: NodeKind, meshes: Vec<Mesh>) -> Self {
        let name = match &kind {
            NodeKind::Wall { line } => format!("wall {line}"),
            NodeKind::Floor { area } => format!("floor {area}"),
            NodeKind::Placeholder { item } => format!("placeholder {item}"),
            NodeKind::Furniture { item } => format!("furniture {item}"),
            NodeKind::Door { hole } => format!("door {hole}"),
        };

        Self {
            id: NodeId(0),
            name,
            kind,
            meshes,
            transform: Transform::default(),
            material_id: None,
            visible: true,
            gpu_resources: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material_id: impl Into<MaterialId>) -> Self {
        self.material_id = Some(material_id.into());
        self
    }

    pub fn get_material_id(&self) -> Option<&MaterialId> {
        self.material_id.as_ref()
    }

    /// Get the transform bind group for rendering
    pub fn get_transform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources
            .as_ref()
            .map(|res| &res.transform_bind_group)
    }

    /// Uploads mesh buffers and the transform uniform
    ///
    /// `transform_layout` is the per-object layout registered with the
    /// render pipeline.
    pub fn init_gpu_resources(&mut self, device: &Device, transform_layout: &wgpu::BindGroupLayout) {
        for mesh in self.meshes.iter_mut() {
            mesh.init_gpu_resources(device);
        }

        let matrix = self.transform.matrix();
        let transform_data: &[f32; 16] = matrix.as_ref();

        let transform_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Transform Uniform Buffer"),
                contents: bytemuck::cast_slice(transform_data),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Transform Bind Group"),
            layout: transform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        self.gpu_resources = Some(ObjectGpuResources {
            transform_buffer,
            transform_bind_group,
        });
    }

    pub fn triangle_count(&self) -> u32 {
        self.meshes.iter().map(|m| m.index_count / 3).sum()
    }
}

pub trait DrawObject<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return; // Skip drawing if not uploaded
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }
}
