// src/lib.rs
//! planview
//!
//! Turns floorplan layout documents into a lit 3D scene of walls, floors,
//! furniture and doors, and shows it in a wgpu window with an orbit camera.

pub mod app;
pub mod assets;
pub mod builder;
pub mod config;
pub mod gfx;
pub mod layout;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::PlanviewApp;
pub use builder::{build_scene, BuildReport, Outcome};
pub use config::ViewerConfig;
