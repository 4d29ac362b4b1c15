//! Decoding model files into renderable geometry.
//!
//! glTF (binary or JSON) is parsed with the `gltf` crate and its buffers and
//! images are resolved here: the GLB binary chunk, base64 `data:` URIs, or
//! files next to the model fetched through the same [`ModelFetcher`].
//! Wavefront OBJ goes through `tobj`. Node hierarchies are flattened: every
//! primitive comes out in model space with its world transform baked in.

use std::collections::HashMap;
use std::io::{BufReader, Cursor};
use std::sync::Arc;

use base64::Engine as _;
use cgmath::{Matrix4, SquareMatrix};
use image::imageops::FilterType;
use image::RgbaImage;

use super::{LoadError, ModelFetcher};
use crate::gfx::geometry::GeometryData;
use crate::gfx::resources::MAX_TEXTURE_SIZE;

const GLB_MAGIC: &[u8; 4] = b"glTF";

/// One primitive of a decoded model with its surface parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMesh {
    pub geometry: GeometryData,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    /// Multiplied by `base_color`, sampled with `geometry.tex_coords`
    pub base_color_texture: Option<Arc<RgbaImage>>,
}

/// A decoded model, ready to become a scene node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedModel {
    pub meshes: Vec<ModelMesh>,
}

impl LoadedModel {
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.geometry.triangle_count()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Glb,
    Gltf,
    Obj,
}

impl ModelFormat {
    /// Sniffs the format from the content, falling back to the URL extension
    pub fn detect(bytes: &[u8], url: &str) -> Result<Self, LoadError> {
        if bytes.starts_with(GLB_MAGIC) {
            return Ok(ModelFormat::Glb);
        }

        let path = url.split(['?', '#']).next().unwrap_or(url);
        let extension = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "glb" => Ok(ModelFormat::Glb),
            "gltf" => Ok(ModelFormat::Gltf),
            "obj" => Ok(ModelFormat::Obj),
            _ => Err(LoadError::UnsupportedFormat(url.to_string())),
        }
    }
}

/// Decodes raw model bytes fetched from `url`
///
/// Files the model refers to (external buffers, textures) are fetched with
/// `fetcher`, relative to `url`.
pub fn decode_model(
    bytes: &[u8],
    url: &str,
    fetcher: &dyn ModelFetcher,
) -> Result<LoadedModel, LoadError> {
    let model = match ModelFormat::detect(bytes, url)? {
        ModelFormat::Glb | ModelFormat::Gltf => decode_gltf(bytes, url, fetcher)?,
        ModelFormat::Obj => decode_obj(bytes)?,
    };

    if model.meshes.is_empty() {
        return Err(LoadError::EmptyModel);
    }
    Ok(model)
}

/// Resolves a URI found inside a model against the model's own location
pub fn sibling_url(model_url: &str, uri: &str) -> String {
    if uri.contains("://") || uri.starts_with('/') {
        return uri.to_string();
    }
    let path = model_url.split(['?', '#']).next().unwrap_or(model_url);
    match path.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/{uri}"),
        None => uri.to_string(),
    }
}

fn read_uri(uri: &str, model_url: &str, fetcher: &dyn ModelFetcher) -> Result<Vec<u8>, LoadError> {
    match uri.strip_prefix("data:") {
        Some(data) => decode_data_uri(data),
        None => fetcher.fetch(&sibling_url(model_url, uri)),
    }
}

/// Decodes the part of a `data:` URI after the scheme
fn decode_data_uri(data: &str) -> Result<Vec<u8>, LoadError> {
    let (header, payload) = data
        .split_once(',')
        .ok_or_else(|| LoadError::Decode("data URI without payload".into()))?;
    if !header.ends_with(";base64") {
        return Err(LoadError::Decode(format!(
            "data URI is not base64 encoded: {header}"
        )));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| LoadError::Decode(format!("invalid base64 in data URI: {e}")))
}

/// Scales a texture down so neither edge exceeds the GPU limit
fn fit_texture(image: RgbaImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if longest <= MAX_TEXTURE_SIZE {
        return image;
    }

    let scale = MAX_TEXTURE_SIZE as f64 / longest as f64;
    let fitted = |edge: u32| ((edge as f64 * scale).round() as u32).clamp(1, MAX_TEXTURE_SIZE);
    log::debug!("Downscaling {width}x{height} texture");
    image::imageops::resize(&image, fitted(width), fitted(height), FilterType::Triangle)
}

fn decode_gltf(bytes: &[u8], url: &str, fetcher: &dyn ModelFetcher) -> Result<LoadedModel, LoadError> {
    let gltf = gltf::Gltf::from_slice(bytes).map_err(|e| LoadError::Decode(e.to_string()))?;

    let buffers = gltf
        .buffers()
        .map(|buffer| {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => gltf
                    .blob
                    .clone()
                    .ok_or_else(|| LoadError::Decode("missing binary chunk".into()))?,
                gltf::buffer::Source::Uri(uri) => read_uri(uri, url, fetcher)?,
            };
            if data.len() < buffer.length() {
                return Err(LoadError::Decode(format!(
                    "buffer {} holds {} bytes, expected {}",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                )));
            }
            Ok(data)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| LoadError::Decode("document has no scene".into()))?;

    let mut import = GltfImport {
        url,
        fetcher,
        buffers,
        textures: HashMap::new(),
        model: LoadedModel::default(),
    };
    for node in scene.nodes() {
        import.collect_node(&node, Matrix4::identity());
    }
    Ok(import.model)
}

/// Decoding state for one glTF document
struct GltfImport<'a> {
    url: &'a str,
    fetcher: &'a dyn ModelFetcher,
    buffers: Vec<Vec<u8>>,
    /// Decoded images by index; `None` marks one that failed
    textures: HashMap<usize, Option<Arc<RgbaImage>>>,
    model: LoadedModel,
}

impl GltfImport<'_> {
    fn collect_node(&mut self, node: &gltf::Node, parent: Matrix4<f32>) {
        let world = parent * Matrix4::from(node.transform().matrix());

        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::debug!("Skipping non-triangle primitive in mesh {:?}", mesh.name());
                    continue;
                }

                let pbr = primitive.material().pbr_metallic_roughness();
                let texture_info = pbr.base_color_texture();
                let uv_set = texture_info.as_ref().map_or(0, |info| info.tex_coord());

                let buffers = &self.buffers;
                let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                let Some(positions) = reader.read_positions() else {
                    continue;
                };

                let vertices: Vec<[f32; 3]> = positions.collect();
                let indices: Vec<u32> = match reader.read_indices() {
                    Some(indices) => indices.into_u32().collect(),
                    None => (0..vertices.len() as u32).collect(),
                };
                let normals: Vec<[f32; 3]> = reader
                    .read_normals()
                    .map(|normals| normals.collect())
                    .unwrap_or_default();
                let tex_coords: Vec<[f32; 2]> = reader
                    .read_tex_coords(uv_set)
                    .map(|uvs| uvs.into_f32().collect())
                    .unwrap_or_default();

                let mut geometry = GeometryData {
                    vertices,
                    normals,
                    indices,
                    tex_coords,
                };
                if geometry.normals.len() != geometry.vertices.len() {
                    geometry.compute_normals();
                }
                geometry.transform(world);

                let base_color_texture =
                    texture_info.and_then(|info| self.texture(info.texture().source()));
                self.model.meshes.push(ModelMesh {
                    geometry,
                    base_color: pbr.base_color_factor(),
                    metallic: pbr.metallic_factor(),
                    roughness: pbr.roughness_factor(),
                    base_color_texture,
                });
            }
        }

        for child in node.children() {
            self.collect_node(&child, world);
        }
    }

    /// Decodes an image once; a broken texture leaves the mesh untextured
    fn texture(&mut self, gltf_image: gltf::Image) -> Option<Arc<RgbaImage>> {
        let index = gltf_image.index();
        if let Some(cached) = self.textures.get(&index) {
            return cached.clone();
        }

        let decoded = match self.decode_image(&gltf_image) {
            Ok(texture) => Some(Arc::new(texture)),
            Err(e) => {
                log::warn!("Ignoring texture {index} of {}: {e}", self.url);
                None
            }
        };
        self.textures.insert(index, decoded.clone());
        decoded
    }

    fn decode_image(&self, gltf_image: &gltf::Image) -> Result<RgbaImage, LoadError> {
        let decoded = match gltf_image.source() {
            gltf::image::Source::View { view, .. } => {
                let bytes = self
                    .buffers
                    .get(view.buffer().index())
                    .and_then(|buffer| buffer.get(view.offset()..view.offset() + view.length()))
                    .ok_or_else(|| LoadError::Decode("image view out of bounds".into()))?;
                image::load_from_memory(bytes)
            }
            gltf::image::Source::Uri { uri, .. } => {
                image::load_from_memory(&read_uri(uri, self.url, self.fetcher)?)
            }
        };

        let decoded = decoded.map_err(|e| LoadError::Decode(format!("image: {e}")))?;
        Ok(fit_texture(decoded.to_rgba8()))
    }
}

fn decode_obj(bytes: &[u8]) -> Result<LoadedModel, LoadError> {
    let mut reader = BufReader::new(Cursor::new(bytes));
    // Material libraries are not fetched alongside the model
    let (models, _materials) = tobj::load_obj_buf(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Err(tobj::LoadError::OpenFileFailed),
    )
    .map_err(|e| LoadError::Decode(e.to_string()))?;

    let meshes = models
        .into_iter()
        .filter(|m| !m.mesh.indices.is_empty())
        .map(|m| {
            let mesh = m.mesh;
            let vertices: Vec<[f32; 3]> = mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]])
                .collect();
            let normals: Vec<[f32; 3]> = mesh
                .normals
                .chunks_exact(3)
                .map(|n| [n[0], n[1], n[2]])
                .collect();
            let tex_coords: Vec<[f32; 2]> = mesh
                .texcoords
                .chunks_exact(2)
                .map(|t| [t[0], t[1]])
                .collect();

            let mut geometry = GeometryData {
                vertices,
                normals,
                indices: mesh.indices,
                tex_coords,
            };
            if geometry.normals.len() != geometry.vertices.len() {
                geometry.compute_normals();
            }

            ModelMesh {
                geometry,
                base_color: [0.8, 0.8, 0.8, 1.0],
                metallic: 0.0,
                roughness: 1.0,
                base_color_texture: None,
            }
        })
        .collect();

    Ok(LoadedModel { meshes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use image::{DynamicImage, ImageFormat, Rgba};
    use serde_json::json;

    const QUAD_OBJ: &str = "\
o quad
v 0 0 0
v 1 0 0
v 1 0 1
v 0 0 1
f 1 3 2
f 1 4 3
";

    /// Serves files from memory, 404 for anything else
    #[derive(Default)]
    struct Files(HashMap<String, Vec<u8>>);

    impl ModelFetcher for Files {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
            self.0.get(url).cloned().ok_or_else(|| LoadError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn floats(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn data_uri(mime: &str, bytes: &[u8]) -> String {
        format!("data:{mime};base64,{}", STANDARD.encode(bytes))
    }

    /// Packs a JSON document and a binary chunk into a GLB container
    fn glb(document: &serde_json::Value, bin: &[u8]) -> Vec<u8> {
        let mut json = serde_json::to_vec(document).unwrap();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let mut bin = bin.to_vec();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(GLB_MAGIC);
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(b"JSON");
        out.extend_from_slice(&json);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin);
        out
    }

    /// A one-triangle textured document; positions then UVs in one buffer
    fn textured_triangle(buffer_uri: &str, image_uri: &str) -> Vec<u8> {
        let document = json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [{ "mesh": 0 }],
            "meshes": [{ "primitives": [{
                "attributes": { "POSITION": 0, "TEXCOORD_0": 1 },
                "material": 0
            }] }],
            "materials": [{ "pbrMetallicRoughness": {
                "baseColorFactor": [1.0, 0.5, 1.0, 1.0],
                "baseColorTexture": { "index": 0 }
            } }],
            "textures": [{ "source": 0 }],
            "images": [{ "uri": image_uri }],
            "buffers": [{ "byteLength": 60, "uri": buffer_uri }],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
                { "buffer": 0, "byteOffset": 36, "byteLength": 24 }
            ],
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
                { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC2" }
            ]
        });
        serde_json::to_vec(&document).unwrap()
    }

    fn triangle_buffer() -> Vec<u8> {
        let mut buffer = floats(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        buffer.extend(floats(&[0.0, 1.0, 1.0, 1.0, 0.0, 0.0]));
        buffer
    }

    #[test]
    fn format_is_sniffed_before_extension() {
        assert_eq!(
            ModelFormat::detect(b"glTF\x02\0\0\0", "chair.obj").unwrap(),
            ModelFormat::Glb
        );
        assert_eq!(
            ModelFormat::detect(b"v 0 0 0", "https://cdn/x/Chair.OBJ?sig=abc").unwrap(),
            ModelFormat::Obj
        );
        assert_eq!(
            ModelFormat::detect(b"{}", "door.gltf").unwrap(),
            ModelFormat::Gltf
        );
        assert!(matches!(
            ModelFormat::detect(b"??", "table.fbx"),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn obj_quad_decodes_with_computed_normals() {
        let model = decode_model(QUAD_OBJ.as_bytes(), "quad.obj", &Files::default()).unwrap();

        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.triangle_count(), 2);
        let geometry = &model.meshes[0].geometry;
        assert_eq!(geometry.normals.len(), geometry.vertices.len());
        for normal in &geometry.normals {
            assert!((normal[1] - 1.0).abs() < 1e-5, "{normal:?}");
        }
        assert!(model.meshes[0].base_color_texture.is_none());
    }

    #[test]
    fn model_without_faces_is_empty() {
        let result = decode_model(b"v 0 0 0\nv 1 0 0\n", "points.obj", &Files::default());
        assert!(matches!(result, Err(LoadError::EmptyModel)));
    }

    #[test]
    fn garbage_glb_fails_to_decode() {
        let result = decode_model(b"glTF garbage", "broken.glb", &Files::default());
        assert!(matches!(result, Err(LoadError::Decode(_))));
    }

    #[test]
    fn glb_bakes_node_transforms_and_factors() {
        let document = json!({
            "asset": { "version": "2.0" },
            "scenes": [{ "nodes": [0] }],
            "nodes": [
                { "translation": [0.0, 5.0, 0.0], "children": [1] },
                { "translation": [10.0, 0.0, 0.0], "mesh": 0 }
            ],
            "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "material": 0 }] }],
            "materials": [{ "pbrMetallicRoughness": {
                "baseColorFactor": [0.25, 0.5, 0.75, 1.0],
                "metallicFactor": 0.25,
                "roughnessFactor": 0.5
            } }],
            "buffers": [{ "byteLength": 36 }],
            "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
            "accessors": [{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                            "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }]
        });
        let bytes = glb(
            &document,
            &floats(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
        );

        let model = decode_model(&bytes, "https://cdn.example/sofa", &Files::default()).unwrap();

        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(
            mesh.geometry.vertices,
            vec![[10.0, 5.0, 0.0], [11.0, 5.0, 0.0], [10.0, 6.0, 0.0]]
        );
        // No index accessor: vertices are drawn in order
        assert_eq!(mesh.geometry.indices, vec![0, 1, 2]);
        for normal in &mesh.geometry.normals {
            assert!((normal[2] - 1.0).abs() < 1e-5, "{normal:?}");
        }
        assert_eq!(mesh.base_color, [0.25, 0.5, 0.75, 1.0]);
        assert_eq!(mesh.metallic, 0.25);
        assert_eq!(mesh.roughness, 0.5);
        assert!(mesh.base_color_texture.is_none());
    }

    #[test]
    fn embedded_gltf_keeps_its_texture() {
        let bytes = textured_triangle(
            &data_uri("application/octet-stream", &triangle_buffer()),
            &data_uri("image/png", &png(2, 2, [200, 100, 50, 255])),
        );

        let model = decode_model(&bytes, "models/lamp.gltf", &Files::default()).unwrap();

        let mesh = &model.meshes[0];
        assert_eq!(mesh.base_color, [1.0, 0.5, 1.0, 1.0]);
        assert_eq!(mesh.geometry.tex_coords, vec![[0.0, 1.0], [1.0, 1.0], [0.0, 0.0]]);
        let texture = mesh.base_color_texture.as_ref().expect("texture decoded");
        assert_eq!(texture.dimensions(), (2, 2));
        assert_eq!(texture.get_pixel(1, 1), &Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn external_files_are_fetched_next_to_the_model() {
        let mut files = Files::default();
        files
            .0
            .insert("https://cdn.example/doors/door.bin".into(), triangle_buffer());
        files
            .0
            .insert("https://cdn.example/doors/tex/wood.png".into(), png(1, 1, [90, 60, 30, 255]));
        let bytes = textured_triangle("door.bin", "tex/wood.png");

        let model = decode_model(&bytes, "https://cdn.example/doors/door.gltf?v=2", &files).unwrap();

        assert_eq!(model.triangle_count(), 1);
        let texture = model.meshes[0].base_color_texture.as_ref().expect("texture fetched");
        assert_eq!(texture.get_pixel(0, 0), &Rgba([90, 60, 30, 255]));
    }

    #[test]
    fn missing_texture_leaves_mesh_untextured() {
        let bytes = textured_triangle(
            &data_uri("application/octet-stream", &triangle_buffer()),
            "gone.png",
        );

        let model = decode_model(&bytes, "https://cdn.example/lamp.gltf", &Files::default()).unwrap();

        assert_eq!(model.triangle_count(), 1);
        assert!(model.meshes[0].base_color_texture.is_none());
    }

    #[test]
    fn missing_buffer_fails_the_load() {
        let bytes = textured_triangle("lamp.bin", "gone.png");
        let result = decode_model(&bytes, "https://cdn.example/lamp.gltf", &Files::default());
        assert!(matches!(result, Err(LoadError::Status { status: 404, .. })));
    }

    #[test]
    fn relative_uris_resolve_against_the_model() {
        assert_eq!(
            sibling_url("https://cdn.example/a/b/chair.gltf?sig=1", "chair.bin"),
            "https://cdn.example/a/b/chair.bin"
        );
        assert_eq!(sibling_url("models/chair.gltf", "tex/a.png"), "models/tex/a.png");
        assert_eq!(sibling_url("chair.gltf", "chair.bin"), "chair.bin");
        assert_eq!(
            sibling_url("models/chair.gltf", "https://other.example/x.png"),
            "https://other.example/x.png"
        );
    }

    #[test]
    fn data_uris_must_be_base64() {
        assert_eq!(decode_data_uri("text/plain;base64,aGk=").unwrap(), b"hi");
        assert!(matches!(
            decode_data_uri("text/plain,hi"),
            Err(LoadError::Decode(_))
        ));
        assert!(matches!(decode_data_uri("nopayload"), Err(LoadError::Decode(_))));
    }

    #[test]
    fn oversized_textures_are_scaled_down() {
        let wide = RgbaImage::new(MAX_TEXTURE_SIZE * 2, 4);
        assert_eq!(fit_texture(wide).dimensions(), (MAX_TEXTURE_SIZE, 2));

        let small = RgbaImage::new(16, 8);
        assert_eq!(fit_texture(small).dimensions(), (16, 8));
    }
}
