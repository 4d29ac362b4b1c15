//! # Scene Builder
//!
//! Turns one layout [`Layer`] into scene nodes. Walls, floors and item
//! placeholders are built synchronously; furniture and door models are
//! returned as [`ModelRequest`]s for the asset loader, and their
//! completions are applied later with [`resolve_model`].
//!
//! Every layout entity gets an [`Outcome`] in the [`BuildReport`], so a
//! dangling reference shows up as `Skipped` instead of aborting the build.

pub mod placement;

use std::fmt;
use std::sync::Arc;

use cgmath::{Rad, Vector3};

use crate::assets::{ModelEvent, ModelRequest, ModelTarget};
use crate::gfx::geometry::{generate_box, generate_flat_polygon};
use crate::gfx::resources::{rgb_from_hex, Material};
use crate::gfx::scene::{DirectionalLight, GridHelper, Mesh, NodeId, NodeKind, Object, Scene, Transform};
use crate::layout::Layer;

use placement::{
    centroid, hole_placement, item_rotation, wall_placement, FLOOR_ELEVATION, PLACEHOLDER_SIZE,
    WALL_THICKNESS,
};

pub const WALL_MATERIAL: &str = "wall";
pub const FLOOR_MATERIAL: &str = "floor";
pub const PLACEHOLDER_MATERIAL: &str = "placeholder";

/// Colors, grid and lighting parameters applied while building
#[derive(Debug, Clone, PartialEq)]
pub struct SceneStyle {
    pub background: u32,
    pub wall_color: u32,
    pub floor_color: u32,
    pub placeholder_color: u32,
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub grid_center_color: u32,
    pub grid_color: u32,
    /// Camera eye relative to the centroid
    pub camera_offset: Vector3<f32>,
    pub ambient_intensity: f32,
    pub sun_intensity: f32,
    /// Sun position relative to the centroid, height absolute
    pub sun_offset: Vector3<f32>,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            background: 0x87ceeb,
            wall_color: 0xffffff,
            floor_color: 0xffff00,
            placeholder_color: 0xff0000,
            grid_size: 3000.0,
            grid_divisions: 40,
            grid_center_color: 0x444444,
            grid_color: 0x888888,
            camera_offset: Vector3::new(-800.0, 1000.0, 800.0),
            ambient_intensity: 0.8,
            sun_intensity: 1.0,
            sun_offset: Vector3::new(500.0, 2000.0, 500.0),
        }
    }
}

/// A layout entity, by kind and id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Wall(String),
    Floor(String),
    Item(String),
    Hole(String),
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Wall(id) => write!(f, "wall {id}"),
            Entity::Floor(id) => write!(f, "floor {id}"),
            Entity::Item(id) => write!(f, "item {id}"),
            Entity::Hole(id) => write!(f, "hole {id}"),
        }
    }
}

/// What happened to one layout entity
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Added(NodeId),
    /// A model load was requested; `placeholder` stands in until it lands
    Pending { placeholder: Option<NodeId> },
    Skipped { reason: String },
    Failed { reason: String },
}

/// Result of [`build_scene`]
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub centroid: Vector3<f32>,
    pub outcomes: Vec<(Entity, Outcome)>,
    /// Model loads to hand to the asset loader
    pub requests: Vec<ModelRequest>,
}

impl BuildReport {
    pub fn outcome(&self, entity: &Entity) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|(e, _)| e == entity)
            .map(|(_, outcome)| outcome)
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&Entity, &str)> {
        self.outcomes.iter().filter_map(|(entity, outcome)| match outcome {
            Outcome::Skipped { reason } => Some((entity, reason.as_str())),
            _ => None,
        })
    }

    pub fn log_summary(&self) {
        let added = self
            .outcomes
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Added(_)))
            .count();
        log::info!(
            "Scene built around ({:.1}, {:.1}): {} nodes added, {} models pending, {} entities skipped",
            self.centroid.x,
            self.centroid.z,
            added,
            self.requests.len(),
            self.skipped().count()
        );
    }
}

/// Populates `scene` from `layer`
///
/// The camera is aimed at the layer's centroid, which also anchors the grid
/// and the sun. A layer without vertices has no centroid; the origin is used
/// and a warning logged, since [`crate::layout::LayoutDocument::layer`]
/// already rejects such layers.
pub fn build_scene(layer: &Layer, scene: &mut Scene, style: &SceneStyle) -> BuildReport {
    let center = centroid(layer).unwrap_or_else(|| {
        log::warn!("Layer has no vertices, centering on the origin");
        Vector3::new(0.0, 0.0, 0.0)
    });

    scene
        .camera_manager
        .camera
        .look_from(center + style.camera_offset, center);

    scene.set_grid(GridHelper::new(
        style.grid_size,
        style.grid_divisions,
        rgb_from_hex(style.grid_center_color),
        rgb_from_hex(style.grid_color),
        center,
    ));

    scene.add_material_rgb(WALL_MATERIAL, rgb_from_hex(style.wall_color));
    scene.add_material_rgb(FLOOR_MATERIAL, rgb_from_hex(style.floor_color));
    scene.add_material_rgb(PLACEHOLDER_MATERIAL, rgb_from_hex(style.placeholder_color));

    let mut report = BuildReport {
        centroid: center,
        outcomes: Vec::new(),
        requests: Vec::new(),
    };

    add_walls(layer, scene, &mut report);
    add_floors(layer, scene, &mut report);
    add_items(layer, scene, &mut report);
    add_holes(layer, &mut report);

    scene.set_ambient_light([1.0; 3], style.ambient_intensity);
    scene.add_directional_light(DirectionalLight::new(
        [1.0; 3],
        style.sun_intensity,
        Vector3::new(
            center.x + style.sun_offset.x,
            style.sun_offset.y,
            center.z + style.sun_offset.z,
        ),
    ));
    scene.background = rgb_from_hex(style.background);

    for (entity, reason) in report.skipped() {
        log::warn!("Skipping {entity}: {reason}");
    }
    report
}

fn add_walls(layer: &Layer, scene: &mut Scene, report: &mut BuildReport) {
    for (id, line) in &layer.lines {
        let entity = Entity::Wall(id.clone());
        let Some((start, end)) = layer.line_endpoints(line) else {
            report.outcomes.push((
                entity,
                Outcome::Skipped {
                    reason: format!("vertices {:?} not all found", line.vertices),
                },
            ));
            continue;
        };

        let wall = wall_placement(start, end, line.height());
        let geometry = generate_box(wall.length, wall.height, WALL_THICKNESS);
        let object = Object::new(
            NodeKind::Wall { line: id.clone() },
            vec![Mesh::from_geometry(&geometry)],
        )
        .with_transform(Transform::from_translation(wall.center).with_rotation_y(wall.rotation_y))
        .with_material(WALL_MATERIAL);

        log::debug!("Wall {id}: {:.1} x {:.1} at {:?}", wall.length, wall.height, wall.center);
        let node = scene.add_object(object);
        report.outcomes.push((entity, Outcome::Added(node)));
    }
}

fn add_floors(layer: &Layer, scene: &mut Scene, report: &mut BuildReport) {
    for (id, area) in &layer.areas {
        let entity = Entity::Floor(id.clone());
        let Some(ring) = layer.area_ring(area) else {
            report.outcomes.push((
                entity,
                Outcome::Skipped {
                    reason: "references an unknown vertex".into(),
                },
            ));
            continue;
        };
        if ring.len() < 3 {
            report.outcomes.push((
                entity,
                Outcome::Skipped {
                    reason: format!("only {} vertices", ring.len()),
                },
            ));
            continue;
        }

        let outline: Vec<[f32; 2]> = ring.iter().map(|v| [v.x, v.y]).collect();
        let geometry = generate_flat_polygon(&outline);

        // The outline lies in XY; a quarter turn about X lays plan y onto world z
        let transform = Transform::from_translation(Vector3::new(0.0, FLOOR_ELEVATION, 0.0))
            .with_rotation_x(Rad(std::f32::consts::FRAC_PI_2));
        let object = Object::new(
            NodeKind::Floor { area: id.clone() },
            vec![Mesh::from_geometry(&geometry)],
        )
        .with_transform(transform)
        .with_material(FLOOR_MATERIAL);

        let node = scene.add_object(object);
        report.outcomes.push((entity, Outcome::Added(node)));
    }
}

fn add_items(layer: &Layer, scene: &mut Scene, report: &mut BuildReport) {
    let [width, height, depth] = PLACEHOLDER_SIZE;

    for (id, item) in &layer.items {
        let placeholder = Object::new(
            NodeKind::Placeholder { item: id.clone() },
            vec![Mesh::from_geometry(&generate_box(width, height, depth))],
        )
        .with_transform(Transform::from_translation(Vector3::new(
            item.x,
            height / 2.0,
            item.y,
        )))
        .with_material(PLACEHOLDER_MATERIAL);
        let node = scene.add_object(placeholder);

        let outcome = match item.model_url() {
            Some(url) => {
                report.requests.push(ModelRequest {
                    target: ModelTarget::Furniture { item: id.clone() },
                    url: url.to_string(),
                    placement: Transform::from_translation(Vector3::new(item.x, 0.0, item.y))
                        .with_rotation_y(item_rotation(item.rotation)),
                    placeholder: Some(node),
                });
                Outcome::Pending {
                    placeholder: Some(node),
                }
            }
            None => Outcome::Added(node),
        };
        report.outcomes.push((Entity::Item(id.clone()), outcome));
    }
}

fn add_holes(layer: &Layer, report: &mut BuildReport) {
    for (id, hole) in &layer.holes {
        let entity = Entity::Hole(id.clone());

        let Some(line) = layer.line(&hole.line) else {
            report.outcomes.push((
                entity,
                Outcome::Skipped {
                    reason: format!("unknown line {}", hole.line),
                },
            ));
            continue;
        };
        let Some(url) = hole.model_url() else {
            report.outcomes.push((
                entity,
                Outcome::Skipped {
                    reason: "no model url".into(),
                },
            ));
            continue;
        };
        let Some((start, end)) = layer.line_endpoints(line) else {
            report.outcomes.push((
                entity,
                Outcome::Skipped {
                    reason: format!("line {} has unknown vertices", hole.line),
                },
            ));
            continue;
        };

        if !(0.0..=1.0).contains(&hole.offset) {
            log::warn!("Hole {id} offset {} clamped to [0, 1]", hole.offset);
        }
        let (position, rotation) = hole_placement(start, end, hole.offset);

        report.requests.push(ModelRequest {
            target: ModelTarget::Door { hole: id.clone() },
            url: url.to_string(),
            placement: Transform::from_translation(position).with_rotation_y(rotation),
            placeholder: None,
        });
        report
            .outcomes
            .push((entity, Outcome::Pending { placeholder: None }));
    }
}

/// Applies a finished model load to the scene
///
/// On success the placeholder (if any, and if still present) is removed and
/// the model inserted at the requested placement, one material per mesh.
/// On failure the scene is left untouched, so an item keeps its placeholder.
pub fn resolve_model(scene: &mut Scene, event: ModelEvent) -> Outcome {
    let ModelEvent { request, result } = event;

    let model = match result {
        Ok(model) => model,
        Err(e) => {
            log::warn!("Failed to load {}: {e}", request.url);
            return Outcome::Failed {
                reason: e.to_string(),
            };
        }
    };

    let meshes: Vec<Mesh> = model
        .meshes
        .iter()
        .enumerate()
        .map(|(index, part)| {
            let mut material = Material::new(
                &format!("{}#{index}", request.url),
                part.base_color,
                part.metallic,
                part.roughness,
            );
            if let Some(texture) = &part.base_color_texture {
                material = material.with_texture(Arc::clone(texture));
            }
            let material = scene.insert_material(material);
            Mesh::from_geometry(&part.geometry).with_material(material)
        })
        .collect();

    let kind = match request.target {
        ModelTarget::Furniture { item } => NodeKind::Furniture { item },
        ModelTarget::Door { hole } => NodeKind::Door { hole },
    };

    if let Some(placeholder) = request.placeholder {
        if scene.remove_object(placeholder).is_none() {
            log::debug!("Placeholder {placeholder} already gone");
        }
    }

    let node = scene.add_object(Object::new(kind, meshes).with_transform(request.placement));
    log::info!(
        "Loaded {} ({} triangles) as {node}",
        request.url,
        model.triangle_count()
    );
    Outcome::Added(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{LoadError, LoadedModel, ModelMesh};
    use crate::gfx::camera::test_camera_manager;
    use crate::layout::LayoutDocument;
    use std::f32::consts::FRAC_PI_2;

    const PLAN: &str = r#"{ "layers": { "layer-1": {
        "vertices": {
            "a": { "x": 0, "y": 0 }, "b": { "x": 100, "y": 0 },
            "c": { "x": 100, "y": 100 }, "d": { "x": 0, "y": 100 }
        },
        "lines": {
            "bottom": { "vertices": ["a", "b"] },
            "left": { "vertices": ["a", "d"], "properties": { "height": { "length": 300 } } },
            "broken": { "vertices": ["a", "ghost"] }
        },
        "areas": { "room": { "vertices": ["a", "b", "c", "d"] } },
        "items": {
            "lamp": { "x": 20, "y": 30, "rotation": 0, "asset_urls": {} },
            "sofa": { "x": 60, "y": 40, "rotation": 90,
                      "asset_urls": { "GLB_File_URL": "https://cdn.example.com/sofa.glb" } }
        },
        "holes": {
            "a-door": { "line": "nope", "offset": 0.5,
                        "asset_urls": { "GLB_File_URL": "door.glb" } },
            "b-door": { "line": "bottom", "offset": 0.5,
                        "asset_urls": { "GLB_File_URL": "door.glb" } },
            "c-window": { "line": "bottom", "offset": 0.2 }
        }
    } } }"#;

    fn build() -> (Scene, BuildReport) {
        let document = LayoutDocument::from_json(PLAN).unwrap();
        let layer = document.layer("layer-1").unwrap();
        let mut scene = Scene::new(test_camera_manager());
        let report = build_scene(layer, &mut scene, &SceneStyle::default());
        (scene, report)
    }

    fn node_of(report: &BuildReport, entity: Entity) -> NodeId {
        match report.outcome(&entity) {
            Some(Outcome::Added(id)) => *id,
            Some(Outcome::Pending { placeholder: Some(id) }) => *id,
            other => panic!("{entity} has outcome {other:?}"),
        }
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn triangle_model() -> LoadedModel {
        let mut geometry = crate::gfx::geometry::GeometryData::new();
        geometry.vertices = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        geometry.normals = vec![[0.0, 0.0, 1.0]; 3];
        geometry.indices = vec![0, 1, 2];
        LoadedModel {
            meshes: vec![ModelMesh {
                geometry,
                base_color: [0.5, 0.4, 0.3, 1.0],
                metallic: 0.0,
                roughness: 0.7,
                base_color_texture: None,
            }],
        }
    }

    #[test]
    fn camera_targets_the_centroid() {
        let (scene, report) = build();
        assert_eq!(report.centroid, Vector3::new(50.0, 0.0, 50.0));

        let camera = &scene.camera_manager.camera;
        assert!(close(camera.target.x, 50.0) && close(camera.target.y, 0.0));
        assert!(close(camera.target.z, 50.0));
        assert!(close(camera.eye.x, -750.0));
        assert!(close(camera.eye.y, 1000.0));
        assert!(close(camera.eye.z, 850.0));
        assert_eq!(scene.grid.as_ref().unwrap().center, report.centroid);
    }

    #[test]
    fn walls_are_sized_and_rotated() {
        let (scene, report) = build();

        let bottom = scene.get_object(node_of(&report, Entity::Wall("bottom".into()))).unwrap();
        assert_eq!(bottom.transform.translation, Vector3::new(50.0, 130.0, 0.0));
        assert!(close(bottom.transform.rotation_y.0, 0.0));
        assert_eq!(bottom.get_material_id().map(String::as_str), Some(WALL_MATERIAL));
        let xs: Vec<f32> = bottom.meshes[0].vertices().iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = bottom.meshes[0].vertices().iter().map(|v| v.position[1]).collect();
        let zs: Vec<f32> = bottom.meshes[0].vertices().iter().map(|v| v.position[2]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 50.0);
        assert_eq!(ys.iter().cloned().fold(f32::MIN, f32::max), 130.0);
        assert_eq!(zs.iter().cloned().fold(f32::MIN, f32::max), 7.5);

        let left = scene.get_object(node_of(&report, Entity::Wall("left".into()))).unwrap();
        assert!(close(left.transform.rotation_y.0, -FRAC_PI_2));
        assert_eq!(left.transform.translation, Vector3::new(0.0, 150.0, 50.0));
    }

    #[test]
    fn dangling_references_are_skipped() {
        let (scene, report) = build();

        assert!(matches!(
            report.outcome(&Entity::Wall("broken".into())),
            Some(Outcome::Skipped { .. })
        ));
        assert!(matches!(
            report.outcome(&Entity::Hole("a-door".into())),
            Some(Outcome::Skipped { .. })
        ));
        assert!(matches!(
            report.outcome(&Entity::Hole("c-window".into())),
            Some(Outcome::Skipped { .. })
        ));
        assert_eq!(report.skipped().count(), 3);

        // Holes never add nodes on their own
        assert_eq!(scene.objects_where(|k| matches!(k, NodeKind::Door { .. })).count(), 0);
        assert_eq!(scene.objects_where(|k| matches!(k, NodeKind::Wall { .. })).count(), 2);
    }

    #[test]
    fn later_holes_still_get_requests() {
        let (_, report) = build();

        let door = report
            .requests
            .iter()
            .find(|r| r.target == ModelTarget::Door { hole: "b-door".into() })
            .unwrap();
        assert_eq!(door.placement.translation, Vector3::new(50.0, 0.0, 0.0));
        assert!(close(door.placement.rotation_y.0, 0.0));
        assert_eq!(door.placeholder, None);
    }

    #[test]
    fn items_get_placeholders() {
        let (scene, report) = build();

        let lamp = node_of(&report, Entity::Item("lamp".into()));
        assert_eq!(report.outcome(&Entity::Item("lamp".into())), Some(&Outcome::Added(lamp)));
        let lamp = scene.get_object(lamp).unwrap();
        assert!(lamp.kind.is_placeholder());
        assert_eq!(lamp.transform.translation, Vector3::new(20.0, 50.0, 30.0));
        assert_eq!(lamp.get_material_id().map(String::as_str), Some(PLACEHOLDER_MATERIAL));
        assert_eq!(
            scene.material_manager.get_material(PLACEHOLDER_MATERIAL).unwrap().base_color,
            [1.0, 0.0, 0.0, 1.0]
        );

        // Only the sofa asks for a model
        let furniture: Vec<_> = report
            .requests
            .iter()
            .filter(|r| matches!(r.target, ModelTarget::Furniture { .. }))
            .collect();
        assert_eq!(furniture.len(), 1);
        let sofa = furniture[0];
        assert_eq!(sofa.url, "https://cdn.example.com/sofa.glb");
        assert_eq!(sofa.placement.translation, Vector3::new(60.0, 0.0, 40.0));
        assert!(close(sofa.placement.rotation_y.0, -FRAC_PI_2));
        assert_eq!(sofa.placeholder, Some(node_of(&report, Entity::Item("sofa".into()))));
    }

    #[test]
    fn floor_lies_flat_above_the_grid() {
        let (scene, report) = build();

        let floor = scene.get_object(node_of(&report, Entity::Floor("room".into()))).unwrap();
        let matrix = floor.transform.matrix();
        for vertex in floor.meshes[0].vertices() {
            let [x, y, z] = vertex.position;
            let world = matrix * cgmath::Vector4::new(x, y, z, 1.0);
            assert!(close(world.y, 0.2));
            assert!(close(world.x, x) && close(world.z, y));
        }
        assert_eq!(floor.triangle_count(), 2);
    }

    #[test]
    fn lights_and_background_are_set() {
        let (scene, _) = build();

        let ambient = scene.lights.ambient.unwrap();
        assert_eq!(ambient.color, [1.0; 3]);
        assert_eq!(ambient.intensity, 0.8);
        assert_eq!(scene.lights.directional.len(), 1);
        assert_eq!(
            scene.lights.directional[0].position,
            Vector3::new(550.0, 2000.0, 550.0)
        );
        assert_eq!(scene.background, rgb_from_hex(0x87ceeb));
    }

    #[test]
    fn building_twice_is_identical() {
        let (first, first_report) = build();
        let (second, second_report) = build();

        assert_eq!(first_report, second_report);
        assert_eq!(first.objects.len(), second.objects.len());
        for (a, b) in first.objects.iter().zip(&second.objects) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.transform, b.transform);
            assert_eq!(a.meshes.len(), b.meshes.len());
            for (ma, mb) in a.meshes.iter().zip(&b.meshes) {
                assert_eq!(ma.vertices(), mb.vertices());
                assert_eq!(ma.indices(), mb.indices());
            }
        }
    }

    #[test]
    fn loaded_model_replaces_its_placeholder() {
        let (mut scene, report) = build();
        let request = report
            .requests
            .iter()
            .find(|r| matches!(r.target, ModelTarget::Furniture { .. }))
            .unwrap()
            .clone();
        let placeholder = request.placeholder.unwrap();
        let before = scene.objects.len();

        let outcome = resolve_model(
            &mut scene,
            ModelEvent {
                request: request.clone(),
                result: Ok(triangle_model()),
            },
        );

        let node = match outcome {
            Outcome::Added(node) => node,
            other => panic!("unexpected {other:?}"),
        };
        assert!(!scene.contains(placeholder));
        assert_eq!(scene.objects.len(), before);
        let sofa = scene.get_object(node).unwrap();
        assert_eq!(sofa.kind, NodeKind::Furniture { item: "sofa".into() });
        assert_eq!(sofa.transform, request.placement);
        let material = sofa.meshes[0].material_id.as_deref().unwrap();
        assert_eq!(
            scene.material_manager.get_material(material).unwrap().base_color,
            [0.5, 0.4, 0.3, 1.0]
        );
    }

    #[test]
    fn failed_load_keeps_the_placeholder() {
        let (mut scene, report) = build();
        let request = report.requests[0].clone();
        let before = scene.objects.len();

        let outcome = resolve_model(
            &mut scene,
            ModelEvent {
                request: request.clone(),
                result: Err(LoadError::EmptyModel),
            },
        );

        assert!(matches!(outcome, Outcome::Failed { .. }));
        assert_eq!(scene.objects.len(), before);
        if let Some(placeholder) = request.placeholder {
            assert!(scene.contains(placeholder));
        }
    }

    #[test]
    fn door_model_is_added_alongside_walls() {
        let (mut scene, report) = build();
        let request = report
            .requests
            .iter()
            .find(|r| matches!(r.target, ModelTarget::Door { .. }))
            .unwrap()
            .clone();
        let placement = request.placement;
        let before = scene.objects.len();

        let outcome = resolve_model(
            &mut scene,
            ModelEvent {
                request,
                result: Ok(triangle_model()),
            },
        );

        let node = match outcome {
            Outcome::Added(node) => node,
            other => panic!("door was not added: {other:?}"),
        };
        assert_eq!(scene.objects.len(), before + 1);
        assert_eq!(scene.objects_where(|k| matches!(k, NodeKind::Door { .. })).count(), 1);

        let door = scene.get_object(node).unwrap();
        assert_eq!(door.kind, NodeKind::Door { hole: "b-door".into() });
        assert_eq!(door.transform, placement);
    }

    #[test]
    fn model_textures_reach_their_materials() {
        let (mut scene, report) = build();
        let request = report.requests[0].clone();
        let url = request.url.clone();
        let texture = Arc::new(image::RgbaImage::new(2, 2));
        let mut model = triangle_model();
        model.meshes[0].base_color_texture = Some(Arc::clone(&texture));

        let outcome = resolve_model(&mut scene, ModelEvent { request, result: Ok(model) });

        assert!(matches!(outcome, Outcome::Added(_)));
        let material = scene
            .material_manager
            .get_material(&format!("{url}#0"))
            .unwrap();
        assert_eq!(material.base_color, [0.5, 0.4, 0.3, 1.0]);
        assert_eq!(material.texture.as_deref(), Some(&*texture));
    }
}
