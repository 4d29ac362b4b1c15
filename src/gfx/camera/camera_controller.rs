use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::orbit_camera::OrbitCamera;

/// Mouse and keyboard orbit controls
///
/// Left drag orbits, right drag or shift + left drag pans, the wheel zooms
/// and Shift+C returns to the home pose.
#[derive(Debug, Clone)]
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    is_shift_held: bool,
    is_left_pressed: bool,
    is_right_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32, pan_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed,
            is_shift_held: false,
            is_left_pressed: false,
            is_right_pressed: false,
        }
    }

    /// Handles buttons, wheel and keys. Returns true when the camera moved.
    pub fn process_window_event(&mut self, event: &WindowEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.is_left_pressed = pressed,
                    MouseButton::Right => self.is_right_pressed = pressed,
                    _ => (),
                }
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32 / 40.0
                    }
                };
                camera.add_distance(scroll_amount * self.zoom_speed);
                true
            }
            WindowEvent::KeyboardInput { event, .. } => self.process_keyed_events(event, camera),
            WindowEvent::Focused(false) => {
                self.is_left_pressed = false;
                self.is_right_pressed = false;
                self.is_shift_held = false;
                false
            }
            _ => false,
        }
    }

    /// Handles raw mouse motion. Returns true when the camera moved.
    pub fn process_device_event(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) -> bool {
        let DeviceEvent::MouseMotion { delta } = event else {
            return false;
        };

        if self.is_panning() {
            camera.pan((
                -delta.0 as f32 * self.pan_speed,
                delta.1 as f32 * self.pan_speed,
            ));
            true
        } else if self.is_rotating() {
            camera.add_yaw(-delta.0 as f32 * self.rotate_speed);
            camera.add_pitch(delta.1 as f32 * self.rotate_speed);
            true
        } else {
            false
        }
    }

    fn process_keyed_events(&mut self, event: &KeyEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
                state,
                ..
            } => {
                self.is_shift_held = *state == ElementState::Pressed;
                false
            }
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::KeyC),
                state: ElementState::Pressed,
                ..
            } if self.is_shift_held => {
                log::debug!("Resetting camera to home pose");
                camera.reset_to_default();
                true
            }
            _ => false,
        }
    }

    /// Returns true if currently panning
    pub fn is_panning(&self) -> bool {
        self.is_right_pressed || (self.is_left_pressed && self.is_shift_held)
    }

    /// Returns true if currently rotating
    pub fn is_rotating(&self) -> bool {
        self.is_left_pressed && !self.is_shift_held && !self.is_right_pressed
    }
}
