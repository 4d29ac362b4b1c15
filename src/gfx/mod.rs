//! # Graphics Module
//!
//! Camera, geometry, scene graph, GPU resources and the render engine.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera with mouse controls
//! - **Geometry** ([`geometry`]) - Boxes, flat polygons and grid lines
//! - **Scene Management** ([`scene`]) - Flat node graph, lights and grid
//! - **Resource Management** ([`resources`]) - Materials, global uniforms, depth textures
//! - **Rendering Pipeline** ([`rendering`]) - Lit mesh pass, grid pass, screenshots
//!
//! ## Usage
//!
//! ```no_run
//! use planview::gfx::{RenderEngine, scene::Scene};
//!
//! // The render engine is created by PlanviewApp once a window exists
//! // let render_engine = RenderEngine::new(window, width, height).await?;
//!
//! // The scene is filled by the builder before the window opens
//! // let mut scene = Scene::new(camera_manager);
//! ```

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
