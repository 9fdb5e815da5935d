use glam::Vec3;

use super::input::MoveIntent;
use crate::config::FlyCameraConfig;
use crate::model::Camera;

const MAX_PITCH_DEG: f32 = 89.0;
const MIN_ZOOM_DEG: f32 = 1.0;
const MAX_ZOOM_DEG: f32 = 45.0;

/// Free-flying camera: keyboard translation, mouse look, scroll zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyCameraController {
    pub move_speed: f32,
    /// Degrees per unit of mouse delta.
    pub mouse_sensitivity: f32,
}

impl FlyCameraController {
    pub fn new(move_speed: f32, mouse_sensitivity: f32) -> Self {
        Self {
            move_speed,
            mouse_sensitivity,
        }
    }

    pub fn from_config(config: &FlyCameraConfig) -> Self {
        Self::new(config.move_speed, config.sensitivity)
    }

    /// Camera placed and oriented as `config` describes.
    pub fn spawn(config: &FlyCameraConfig, width: u32, height: u32) -> Camera {
        let mut camera = Camera::new(width, height);
        camera.eye = config.start;
        camera.yaw = config.yaw.to_radians();
        camera.pitch = config.pitch.clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG).to_radians();
        camera.fov_y = config.zoom.clamp(MIN_ZOOM_DEG, MAX_ZOOM_DEG).to_radians();
        camera
    }

    /// Apply mouse look delta to camera (screen y grows downwards)
    pub fn apply_look(&self, camera: &mut Camera, dx: f32, dy: f32) {
        camera.yaw += (dx * self.mouse_sensitivity).to_radians();
        let pitch = camera.pitch.to_degrees() - dy * self.mouse_sensitivity;
        camera.pitch = pitch.clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG).to_radians();
    }

    pub fn apply_zoom(&self, camera: &mut Camera, scroll: f32) {
        let zoom = camera.fov_y.to_degrees() - scroll;
        camera.fov_y = zoom.clamp(MIN_ZOOM_DEG, MAX_ZOOM_DEG).to_radians();
    }

    /// Moves along the view direction; left/right strafe.
    pub fn update_movement(&self, camera: &mut Camera, intent: MoveIntent, dt: f32) {
        let velocity = self.move_speed * dt;
        let front = camera.forward();
        let right = camera.right();
        let mut movement = Vec3::ZERO;
        if intent.forward {
            movement += front;
        }
        if intent.backward {
            movement -= front;
        }
        if intent.left {
            movement -= right;
        }
        if intent.right {
            movement += right;
        }
        camera.eye += movement * velocity;
    }
}

impl Default for FlyCameraController {
    fn default() -> Self {
        Self::from_config(&FlyCameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        FlyCameraController::spawn(&FlyCameraConfig::default(), 800, 600)
    }

    #[test]
    fn spawn_uses_config() {
        let cam = FlyCameraController::spawn(
            &FlyCameraConfig {
                start: Vec3::new(0.0, 1.0, 5.0),
                ..FlyCameraConfig::default()
            },
            800,
            600,
        );
        assert_eq!(cam.eye, Vec3::new(0.0, 1.0, 5.0));
        assert!(cam.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert_relative_eq!(cam.fov_y, 45f32.to_radians());
    }

    #[test]
    fn pitch_is_clamped() {
        let ctrl = FlyCameraController::default();
        let mut cam = camera();
        ctrl.apply_look(&mut cam, 0.0, -10_000.0);
        assert_relative_eq!(cam.pitch, 89f32.to_radians(), epsilon = 1e-5);
        ctrl.apply_look(&mut cam, 0.0, 10_000.0);
        assert_relative_eq!(cam.pitch, -89f32.to_radians(), epsilon = 1e-5);
    }

    #[test]
    fn mouse_right_turns_right() {
        let ctrl = FlyCameraController::default();
        let mut cam = camera();
        ctrl.apply_look(&mut cam, 900.0, 0.0);
        // 90 degrees of yaw from -Z lands on +X
        assert!(cam.forward().abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn zoom_is_clamped() {
        let ctrl = FlyCameraController::default();
        let mut cam = camera();
        ctrl.apply_zoom(&mut cam, 100.0);
        assert_relative_eq!(cam.fov_y, 1f32.to_radians(), epsilon = 1e-6);
        ctrl.apply_zoom(&mut cam, -100.0);
        assert_relative_eq!(cam.fov_y, 45f32.to_radians(), epsilon = 1e-6);
    }

    #[test]
    fn strafe_and_forward() {
        let ctrl = FlyCameraController::new(2.0, 0.1);
        let mut cam = camera();
        let start = cam.eye;
        ctrl.update_movement(
            &mut cam,
            MoveIntent {
                forward: true,
                right: true,
                ..MoveIntent::default()
            },
            0.5,
        );
        assert!(cam.eye.abs_diff_eq(start + Vec3::new(1.0, 0.0, -1.0), 1e-5));
    }
}
