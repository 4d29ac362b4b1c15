//! Core rendering functionality
//!
//! Handles render pipelines, GPU resource management, frame rendering and
//! screenshot capture.

pub mod pipeline_manager;
pub mod render_engine;
pub mod screenshot;

// Re-export main types
pub use pipeline_manager::{PipelineConfig, PipelineManager, VertexLayout};
pub use render_engine::{pick_surface_format, RenderEngine, RenderError};
pub use screenshot::{save_png, ScreenshotError};
