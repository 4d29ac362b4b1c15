pub mod camera_controller;
pub mod camera_manager;
pub mod orbit_camera;

// Re-export main types
pub use camera_controller::CameraController;
pub use camera_manager::{CameraManager, CameraUniform};
pub use orbit_camera::OrbitCamera;

#[cfg(test)]
pub(crate) fn test_camera_manager() -> CameraManager {
    let camera = OrbitCamera::new(10.0, 0.5, 0.0, cgmath::Vector3::new(0.0, 0.0, 0.0), 1.5);
    CameraManager::new(camera, CameraController::new(0.005, 0.1, 0.01))
}
