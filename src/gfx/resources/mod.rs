//! GPU resource management
//!
//! Handles textures, buffers, and bind groups for rendering.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO};
pub use material::{rgb_from_hex, Material, MaterialId, MaterialManager};
pub use texture_resource::{TextureResource, MAX_TEXTURE_SIZE};
