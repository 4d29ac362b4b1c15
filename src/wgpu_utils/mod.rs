//! Thin helpers over wgpu bind groups and uniform buffers
//!
//! Layouts are built binding by binding with [`BindGroupLayoutBuilder`] and
//! filled in the same order with [`BindGroupBuilder`].

pub mod binding_builder;
pub mod binding_types;
pub mod uniform_buffer;

pub use binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};
pub use uniform_buffer::UniformBuffer;
