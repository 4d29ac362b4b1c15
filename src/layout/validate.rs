//! Cross-reference checks for a layer.
//!
//! Nothing here rejects a document. The builder skips entities with broken
//! references on its own; these issues exist so the caller can report them
//! up front.

use std::fmt;

use super::document::Layer;

#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceIssue {
    /// Line does not name exactly two vertices
    MalformedLine { line: String, vertex_count: usize },
    LineVertexMissing { line: String, vertex: String },
    AreaTooSmall { area: String, vertex_count: usize },
    AreaVertexMissing { area: String, vertex: String },
    HoleLineMissing { hole: String, line: String },
    HoleOffsetOutOfRange { hole: String, offset: f32 },
}

impl fmt::Display for ReferenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedLine { line, vertex_count } => {
                write!(f, "line {line} has {vertex_count} vertices, expected 2")
            }
            Self::LineVertexMissing { line, vertex } => {
                write!(f, "line {line} references unknown vertex {vertex}")
            }
            Self::AreaTooSmall { area, vertex_count } => {
                write!(f, "area {area} has only {vertex_count} vertices")
            }
            Self::AreaVertexMissing { area, vertex } => {
                write!(f, "area {area} references unknown vertex {vertex}")
            }
            Self::HoleLineMissing { hole, line } => {
                write!(f, "hole {hole} references unknown line {line}")
            }
            Self::HoleOffsetOutOfRange { hole, offset } => {
                write!(f, "hole {hole} has offset {offset} outside [0, 1]")
            }
        }
    }
}

/// Collects every dangling or malformed reference in the layer
pub fn check_references(layer: &Layer) -> Vec<ReferenceIssue> {
    let mut issues = Vec::new();

    for (id, line) in &layer.lines {
        if line.vertices.len() != 2 {
            issues.push(ReferenceIssue::MalformedLine {
                line: id.clone(),
                vertex_count: line.vertices.len(),
            });
        }
        for vertex in &line.vertices {
            if layer.vertex(vertex).is_none() {
                issues.push(ReferenceIssue::LineVertexMissing {
                    line: id.clone(),
                    vertex: vertex.clone(),
                });
            }
        }
    }

    for (id, area) in &layer.areas {
        if area.vertices.len() < 3 {
            issues.push(ReferenceIssue::AreaTooSmall {
                area: id.clone(),
                vertex_count: area.vertices.len(),
            });
        }
        for vertex in &area.vertices {
            if layer.vertex(vertex).is_none() {
                issues.push(ReferenceIssue::AreaVertexMissing {
                    area: id.clone(),
                    vertex: vertex.clone(),
                });
            }
        }
    }

    for (id, hole) in &layer.holes {
        if layer.line(&hole.line).is_none() {
            issues.push(ReferenceIssue::HoleLineMissing {
                hole: id.clone(),
                line: hole.line.clone(),
            });
        }
        if !(0.0..=1.0).contains(&hole.offset) {
            issues.push(ReferenceIssue::HoleOffsetOutOfRange {
                hole: id.clone(),
                offset: hole.offset,
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutDocument;

    #[test]
    fn clean_layer_has_no_issues() {
        let document = LayoutDocument::from_json(
            r#"{ "layers": { "layer-1": {
                "vertices": { "a": { "x": 0, "y": 0 }, "b": { "x": 1, "y": 0 }, "c": { "x": 1, "y": 1 } },
                "lines": { "l": { "vertices": ["a", "b"] } },
                "areas": { "r": { "vertices": ["a", "b", "c"] } },
                "holes": { "h": { "line": "l", "offset": 1.0 } }
            } } }"#,
        )
        .unwrap();

        assert!(check_references(&document.layers["layer-1"]).is_empty());
    }

    #[test]
    fn reports_each_broken_reference() {
        let document = LayoutDocument::from_json(
            r#"{ "layers": { "layer-1": {
                "vertices": { "a": { "x": 0, "y": 0 } },
                "lines": { "l": { "vertices": ["a", "ghost"] }, "m": { "vertices": ["a"] } },
                "areas": { "r": { "vertices": ["a", "ghost"] } },
                "holes": { "h": { "line": "nope", "offset": 1.5 } }
            } } }"#,
        )
        .unwrap();

        let issues = check_references(&document.layers["layer-1"]);

        assert!(issues.contains(&ReferenceIssue::LineVertexMissing {
            line: "l".into(),
            vertex: "ghost".into(),
        }));
        assert!(issues.contains(&ReferenceIssue::MalformedLine {
            line: "m".into(),
            vertex_count: 1,
        }));
        assert!(issues.contains(&ReferenceIssue::AreaTooSmall {
            area: "r".into(),
            vertex_count: 2,
        }));
        assert!(issues.contains(&ReferenceIssue::AreaVertexMissing {
            area: "r".into(),
            vertex: "ghost".into(),
        }));
        assert!(issues.contains(&ReferenceIssue::HoleLineMissing {
            hole: "h".into(),
            line: "nope".into(),
        }));
        assert!(issues.contains(&ReferenceIssue::HoleOffsetOutOfRange {
            hole: "h".into(),
            offset: 1.5,
        }));
        assert_eq!(issues.len(), 6);
    }
}
