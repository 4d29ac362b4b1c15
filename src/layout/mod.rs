//! # Layout Documents
//!
//! Floorplan layout documents as exported by planner tools: a set of named
//! layers, each holding vertices, wall lines, floor areas, furniture items
//! and wall holes (doors and windows).
//!
//! ## Usage
//!
//! ```no_run
//! use planview::layout::LayoutDocument;
//!
//! let document = LayoutDocument::from_path("3d.json").unwrap();
//! let layer = document.layer("layer-1").unwrap();
//! println!("{} walls", layer.lines.len());
//! ```

pub mod document;
pub mod validate;

pub use document::{
    Area, AssetUrls, Hole, Item, Layer, LayoutDocument, LayoutError, Length, Line,
    LineProperties, Vertex, DEFAULT_LAYER,
};
pub use validate::{check_references, ReferenceIssue};
