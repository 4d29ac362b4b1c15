//! Serde model of the layout JSON document.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Layer consumed when no other key is configured
pub const DEFAULT_LAYER: &str = "layer-1";

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to read layout {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse layout document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("layout has no layer named {0:?}")]
    MissingLayer(String),
    #[error("layer {0:?} has no vertices")]
    NoVertices(String),
}

/// Top-level layout document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutDocument {
    #[serde(default)]
    pub layers: BTreeMap<String, Layer>,
}

impl LayoutDocument {
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, LayoutError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Reads and parses a layout document from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let content = fs::read(path).map_err(|source| LayoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&content)
    }

    /// Returns the named layer, failing if it is missing or has no vertices
    ///
    /// The scene builder divides by the vertex count, so an empty layer is
    /// rejected here rather than producing a NaN centroid later.
    pub fn layer(&self, key: &str) -> Result<&Layer, LayoutError> {
        let layer = self
            .layers
            .get(key)
            .ok_or_else(|| LayoutError::MissingLayer(key.to_string()))?;

        if layer.vertices.is_empty() {
            return Err(LayoutError::NoVertices(key.to_string()));
        }

        Ok(layer)
    }
}

/// One layer of a floorplan
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub vertices: BTreeMap<String, Vertex>,
    #[serde(default)]
    pub lines: BTreeMap<String, Line>,
    #[serde(default)]
    pub areas: BTreeMap<String, Area>,
    #[serde(default)]
    pub items: BTreeMap<String, Item>,
    #[serde(default)]
    pub holes: BTreeMap<String, Hole>,
}

impl Layer {
    pub fn vertex(&self, id: &str) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    pub fn line(&self, id: &str) -> Option<&Line> {
        self.lines.get(id)
    }

    /// Start and end vertex of a line, if both exist
    pub fn line_endpoints(&self, line: &Line) -> Option<(Vertex, Vertex)> {
        let start = self.vertex(line.vertices.first()?)?;
        let end = self.vertex(line.vertices.get(1)?)?;
        Some((*start, *end))
    }

    /// Resolves the vertex ring of an area, `None` if any id is unknown
    pub fn area_ring(&self, area: &Area) -> Option<Vec<Vertex>> {
        area.vertices
            .iter()
            .map(|id| self.vertex(id).copied())
            .collect()
    }
}

/// A point in the floor plane
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
}

/// A straight wall between two vertices
#[derive(Debug, Clone, Deserialize)]
pub struct Line {
    pub vertices: Vec<String>,
    #[serde(default)]
    pub properties: LineProperties,
}

impl Line {
    /// Wall height, `None` when unset or not positive
    pub fn height(&self) -> Option<f32> {
        self.properties
            .height
            .map(|h| h.length)
            .filter(|length| *length > 0.0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineProperties {
    #[serde(default)]
    pub height: Option<Length>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Length {
    pub length: f32,
}

/// A floor polygon
#[derive(Debug, Clone, Deserialize)]
pub struct Area {
    pub vertices: Vec<String>,
}

/// A furniture item placed on the floor
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub x: f32,
    pub y: f32,
    /// Rotation about the vertical axis in degrees
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub asset_urls: AssetUrls,
}

impl Item {
    pub fn model_url(&self) -> Option<&str> {
        self.asset_urls.model_url()
    }
}

/// An opening cut into a wall line
#[derive(Debug, Clone, Deserialize)]
pub struct Hole {
    pub line: String,
    /// Position along the line, 0 at the first vertex and 1 at the second
    pub offset: f32,
    #[serde(default)]
    pub asset_urls: AssetUrls,
}

impl Hole {
    pub fn model_url(&self) -> Option<&str> {
        self.asset_urls.model_url()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetUrls {
    #[serde(rename = "GLB_File_URL", default)]
    pub glb_file_url: Option<String>,
}

impl AssetUrls {
    /// The model URL, treating blank strings as absent
    pub fn model_url(&self) -> Option<&str> {
        self.glb_file_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "unit": "cm",
        "layers": {
            "layer-1": {
                "id": "layer-1",
                "vertices": {
                    "a": { "id": "a", "x": 0, "y": 0 },
                    "b": { "id": "b", "x": 100, "y": 0 }
                },
                "lines": {
                    "w1": {
                        "vertices": ["a", "b"],
                        "properties": { "height": { "length": 300 }, "thickness": { "length": 20 } }
                    },
                    "w2": { "vertices": ["b", "a"], "properties": {} }
                },
                "items": {
                    "sofa": {
                        "x": 10, "y": 20, "rotation": 90,
                        "asset_urls": { "GLB_File_URL": "https://example.com/sofa.glb" }
                    },
                    "lamp": { "x": 5, "y": 5, "rotation": 0, "asset_urls": { "GLB_File_URL": "" } }
                },
                "holes": {
                    "door": { "line": "w1", "offset": 0.25 }
                }
            }
        }
    }"#;

    #[test]
    fn parses_sample_layer() {
        let document = LayoutDocument::from_json(SAMPLE).unwrap();
        let layer = document.layer(DEFAULT_LAYER).unwrap();

        assert_eq!(layer.vertices.len(), 2);
        assert_eq!(layer.lines["w1"].height(), Some(300.0));
        assert_eq!(layer.lines["w2"].height(), None);
        assert!(layer.areas.is_empty());
        assert_eq!(layer.items["sofa"].rotation, 90.0);
        assert_eq!(
            layer.items["sofa"].model_url(),
            Some("https://example.com/sofa.glb")
        );
        assert_eq!(layer.items["lamp"].model_url(), None);
        assert_eq!(layer.holes["door"].model_url(), None);
        assert_eq!(layer.holes["door"].offset, 0.25);
    }

    #[test]
    fn resolves_line_endpoints() {
        let document = LayoutDocument::from_json(SAMPLE).unwrap();
        let layer = document.layer(DEFAULT_LAYER).unwrap();

        let (start, end) = layer.line_endpoints(&layer.lines["w2"]).unwrap();
        assert_eq!(start, Vertex { x: 100.0, y: 0.0 });
        assert_eq!(end, Vertex { x: 0.0, y: 0.0 });
    }

    #[test]
    fn zero_height_counts_as_unset() {
        let line: Line = serde_json::from_str(
            r#"{ "vertices": ["a", "b"], "properties": { "height": { "length": 0 } } }"#,
        )
        .unwrap();
        assert_eq!(line.height(), None);
    }

    #[test]
    fn missing_layer_is_reported() {
        let document = LayoutDocument::from_json(SAMPLE).unwrap();
        assert!(matches!(
            document.layer("layer-2"),
            Err(LayoutError::MissingLayer(key)) if key == "layer-2"
        ));
    }

    #[test]
    fn empty_vertex_set_is_reported() {
        let document =
            LayoutDocument::from_json(r#"{ "layers": { "layer-1": { "vertices": {} } } }"#)
                .unwrap();
        assert!(matches!(
            document.layer(DEFAULT_LAYER),
            Err(LayoutError::NoVertices(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = LayoutDocument::from_json(r#"{ "layers": { "layer-1": "#);
        assert!(matches!(result, Err(LayoutError::Parse(_))));
    }

    #[test]
    fn reads_document_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let document = LayoutDocument::from_path(file.path()).unwrap();
        assert!(document.layers.contains_key(DEFAULT_LAYER));

        let missing = LayoutDocument::from_path(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(LayoutError::Io { .. })));
    }
}
