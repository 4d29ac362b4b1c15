//! # Scene Management Module
//!
//! The scene graph the floorplan is built into: objects with meshes,
//! transforms and materials, plus lights, the ground grid and the camera.
//!
//! ## Key Components
//!
//! - [`Scene`] - The main scene container that manages objects, camera, and materials
//! - [`Object`] - A node with meshes, a material and a transform, addressed by [`NodeId`]
//! - [`NodeKind`] - Which layout entity a node came from
//! - [`Vertex3D`] - Mesh vertex: position, normal and UV
//!
//! ## Object Management
//!
//! Nodes are inserted with [`Scene::add_object`], which hands back the id
//! used later to swap a placeholder for its loaded model. GPU buffers are
//! created lazily, so nodes may be added at any time during the render
//! loop.

pub mod grid;
pub mod light;
pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use grid::GridHelper;
pub use light::{AmbientLight, DirectionalLight, Lights};
pub use object::{DrawObject, Mesh, NodeId, NodeKind, Object, Transform};
pub use scene::{Scene, SceneStatistics};
pub use vertex::{LineVertex, Vertex3D};
