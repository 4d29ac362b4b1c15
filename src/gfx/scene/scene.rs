use wgpu::Device;

use crate::{
    gfx::{
        camera::camera_manager::CameraManager,
        resources::material::{Material, MaterialId, MaterialManager},
    },
    wgpu_utils::BindGroupLayoutWithDesc,
};

use super::{
    grid::GridHelper,
    light::{AmbientLight, DirectionalLight, Lights},
    object::{NodeId, NodeKind, Object},
};

/// Main scene containing objects, materials, lights and camera
///
/// The scene graph is flat: every node is an [`Object`] addressed by its
/// [`NodeId`]. Ids are never reused, so a handle held by a pending model
/// load stays valid even after other nodes are removed.
pub struct Scene {
    pub camera_manager: CameraManager,
    pub objects: Vec<Object>,
    pub material_manager: MaterialManager, // Centralized material storage
    pub lights: Lights,
    pub grid: Option<GridHelper>,
    pub background: [f32; 3],
    next_id: u64,
}

impl Scene {
    /// Creates a new, empty scene with the given camera manager
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            objects: Vec::new(),
            material_manager: MaterialManager::new(),
            lights: Lights::default(),
            grid: None,
            background: [0.0, 0.0, 0.0],
            next_id: 1,
        }
    }

    /// Updates the scene (camera matrices, etc.)
    pub fn update(&mut self) {
        self.camera_manager.camera.update_view_proj();
    }

    /// Inserts an object and returns its freshly assigned id
    pub fn add_object(&mut self, mut object: Object) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        object.id = id;
        self.objects.push(object);
        id
    }

    /// Removes an object, returning it if it was present
    pub fn remove_object(&mut self, id: NodeId) -> Option<Object> {
        let index = self.objects.iter().position(|obj| obj.id == id)?;
        Some(self.objects.remove(index))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.objects.iter().any(|obj| obj.id == id)
    }

    /// Gets immutable reference to an object by id
    pub fn get_object(&self, id: NodeId) -> Option<&Object> {
        self.objects.iter().find(|obj| obj.id == id)
    }

    /// Objects whose kind matches the predicate, in insertion order
    pub fn objects_where<'a>(
        &'a self,
        predicate: impl Fn(&NodeKind) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Object> + 'a {
        self.objects.iter().filter(move |obj| predicate(&obj.kind))
    }

    /// Creates a new material and adds it to the material manager
    ///
    /// Replaces any material of the same name.
    pub fn add_material(
        &mut self,
        name: &str,
        base_color: [f32; 4],
        metallic: f32,
        roughness: f32,
    ) -> MaterialId {
        self.insert_material(Material::new(name, base_color, metallic, roughness))
    }

    /// Adds a prepared material, replacing any of the same name
    pub fn insert_material(&mut self, material: Material) -> MaterialId {
        let id = material.name.clone();
        self.material_manager.add_material(material);
        id
    }

    /// Convenience method for creating opaque, rough, non-metallic materials
    pub fn add_material_rgb(&mut self, name: &str, color: [f32; 3]) -> MaterialId {
        self.add_material(name, [color[0], color[1], color[2], 1.0], 0.0, 1.0)
    }

    /// Gets material for rendering an object
    ///
    /// Returns the material assigned to the object, or the default material
    /// if no material is assigned or the assigned material doesn't exist.
    pub fn get_material_for_object(&self, object: &Object) -> &Material {
        self.material_manager
            .get_material_for_object(object.get_material_id())
    }

    pub fn set_ambient_light(&mut self, color: [f32; 3], intensity: f32) {
        self.lights.ambient = Some(AmbientLight { color, intensity });
    }

    pub fn add_directional_light(&mut self, light: DirectionalLight) {
        self.lights.directional.push(light);
    }

    pub fn set_grid(&mut self, grid: GridHelper) {
        self.grid = Some(grid);
    }

    /// Initializes GPU resources for objects and materials that lack them
    ///
    /// Safe to call every frame: nodes inserted since the last call (for
    /// example models that finished loading) are uploaded, the rest are
    /// left alone.
    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        transform_layout: &wgpu::BindGroupLayout,
        material_layout: &BindGroupLayoutWithDesc,
    ) {
        for object in self.objects.iter_mut() {
            if object.gpu_resources.is_none() {
                object.init_gpu_resources(device, transform_layout);
            }
        }

        if let Some(grid) = self.grid.as_mut() {
            grid.init_gpu_resources(device);
        }

        self.material_manager
            .update_all_gpu_resources(device, queue, material_layout);
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        let total_triangles: u32 = self.objects.iter().map(|obj| obj.triangle_count()).sum();

        let total_vertices: u32 = self
            .objects
            .iter()
            .map(|obj| obj.meshes.iter().map(|m| m.vertex_count).sum::<u32>())
            .sum();

        SceneStatistics {
            object_count: self.objects.len(),
            placeholder_count: self.objects_where(NodeKind::is_placeholder).count(),
            material_count: self.material_manager.list_materials().len(),
            total_triangles,
            total_vertices,
        }
    }
}

/// Scene statistics for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub placeholder_count: usize,
    pub material_count: usize,
    pub total_triangles: u32,
    pub total_vertices: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::test_camera_manager;
    use crate::gfx::geometry::generate_box;
    use crate::gfx::scene::object::Mesh;

    fn placeholder(item: &str) -> Object {
        Object::new(
            NodeKind::Placeholder { item: item.into() },
            vec![Mesh::from_geometry(&generate_box(1.0, 1.0, 1.0))],
        )
    }

    #[test]
    fn ids_are_unique_and_never_reused() {
        let mut scene = Scene::new(test_camera_manager());
        let a = scene.add_object(placeholder("a"));
        let b = scene.add_object(placeholder("b"));
        assert_ne!(a, b);

        assert!(scene.remove_object(a).is_some());
        assert!(scene.remove_object(a).is_none());
        let c = scene.add_object(placeholder("c"));
        assert_ne!(c, a);
        assert!(scene.contains(b) && scene.contains(c) && !scene.contains(a));
    }

    #[test]
    fn statistics_count_placeholders() {
        let mut scene = Scene::new(test_camera_manager());
        scene.add_object(placeholder("a"));
        scene.add_object(Object::new(NodeKind::Wall { line: "w".into() }, vec![]));

        let stats = scene.get_statistics();
        assert_eq!(stats.object_count, 2);
        assert_eq!(stats.placeholder_count, 1);
        assert_eq!(stats.total_triangles, 12);
        assert_eq!(stats.total_vertices, 24);
    }

    #[test]
    fn unknown_material_falls_back_to_default() {
        let mut scene = Scene::new(test_camera_manager());
        let red = scene.add_material_rgb("red", [1.0, 0.0, 0.0]);
        let id = scene.add_object(placeholder("a").with_material(red));
        let other = scene.add_object(placeholder("b").with_material("missing"));

        let object = scene.get_object(id).unwrap();
        assert_eq!(scene.get_material_for_object(object).name, "red");
        let object = scene.get_object(other).unwrap();
        assert_eq!(scene.get_material_for_object(object).name, "default");
    }
}
