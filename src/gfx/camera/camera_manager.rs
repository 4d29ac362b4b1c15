use cgmath::{Matrix4, SquareMatrix, Vector3};
use winit::event::{DeviceEvent, WindowEvent};

use super::{camera_controller::CameraController, orbit_camera::OrbitCamera};

/// The scene's camera together with the controller that drives it
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    /// Returns true when the camera moved and a redraw is due
    pub fn process_window_event(&mut self, event: &WindowEvent) -> bool {
        self.controller
            .process_window_event(event, &mut self.camera)
    }

    pub fn process_device_event(&mut self, event: &DeviceEvent) -> bool {
        self.controller
            .process_device_event(event, &mut self.camera)
    }
}

/// Eye position and view-projection matrix as the shaders read them
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct CameraUniform {
    /// w is 1 so the vec4 keeps 16 byte alignment
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(eye: Vector3<f32>, view_proj: Matrix4<f32>) -> Self {
        Self {
            view_position: eye.extend(1.0).into(),
            view_proj: view_proj.into(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, 0.0), Matrix4::identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_stores_eye_as_point() {
        let uniform = CameraUniform::new(
            Vector3::new(1.0, 2.0, 3.0),
            Matrix4::from_translation(Vector3::new(4.0, 5.0, 6.0)),
        );
        assert_eq!(uniform.view_position, [1.0, 2.0, 3.0, 1.0]);
        // Column-major: translation lands in the last column
        assert_eq!(uniform.view_proj[3], [4.0, 5.0, 6.0, 1.0]);
        assert_eq!(CameraUniform::default().view_proj[0], [1.0, 0.0, 0.0, 0.0]);
    }
}
