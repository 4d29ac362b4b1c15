//! Scene lights: one ambient term and any number of directional lights.

use cgmath::{Vector3, Zero};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// A light shining from `position` towards `target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Vector3<f32>,
    /// Defaults to the world origin
    pub target: Vector3<f32>,
}

impl DirectionalLight {
    pub fn new(color: [f32; 3], intensity: f32, position: Vector3<f32>) -> Self {
        Self {
            color,
            intensity,
            position,
            target: Vector3::zero(),
        }
    }

    /// Unit vector pointing from the lit surface towards the light
    pub fn direction(&self) -> Vector3<f32> {
        use cgmath::InnerSpace;
        let d = self.position - self.target;
        if d.magnitude2() > 0.0 {
            d.normalize()
        } else {
            Vector3::unit_y()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lights {
    pub ambient: Option<AmbientLight>,
    pub directional: Vec<DirectionalLight>,
}
