use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use super::input::MoveIntent;
use crate::config::{FollowCameraConfig, PlayerConfig};
use crate::model::Camera;

/// Ground entity position and heading (radians, 0 faces -Z, positive turns left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub heading: f32,
}

impl Pose {
    pub fn new(position: Vec3, heading: f32) -> Self {
        Self {
            position,
            heading: heading.rem_euclid(TAU),
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.heading)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0)
    }
}

/// Tank controls: turn first, then drive along the new heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerController {
    pub move_speed: f32,
    pub turn_speed: f32,
}

impl PlayerController {
    pub fn new(move_speed: f32, turn_speed: f32) -> Self {
        Self {
            move_speed,
            turn_speed,
        }
    }

    pub fn from_config(config: &PlayerConfig) -> Self {
        Self::new(config.move_speed, config.turn_speed)
    }

    pub fn update(&self, pose: &mut Pose, intent: MoveIntent, dt: f32) {
        if intent.left {
            pose.heading += self.turn_speed * dt;
        }
        if intent.right {
            pose.heading -= self.turn_speed * dt;
        }
        pose.heading = pose.heading.rem_euclid(TAU);

        let forward = pose.forward();
        if intent.forward {
            pose.position += forward * self.move_speed * dt;
        }
        if intent.backward {
            pose.position -= forward * self.move_speed * dt;
        }
    }
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::from_config(&PlayerConfig::default())
    }
}

/// Third-person camera that trails behind and above a [`Pose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowCamera {
    pub back_distance: f32,
    pub height: f32,
}

impl FollowCamera {
    pub fn from_config(config: &FollowCameraConfig) -> Self {
        Self {
            back_distance: config.back_distance,
            height: config.height,
        }
    }

    /// `(eye, look_dir)` for the given pose.
    pub fn pose(&self, target: &Pose) -> (Vec3, Vec3) {
        let eye = target.position - target.forward() * self.back_distance + Vec3::Y * self.height;
        let look = (target.position - eye).normalize_or_zero();
        (eye, look)
    }

    pub fn apply(&self, target: &Pose, camera: &mut Camera) {
        let (eye, look) = self.pose(target);
        camera.eye = eye;
        camera.set_look_dir(look);
    }
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self::from_config(&FollowCameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn intent(forward: bool, left: bool, right: bool) -> MoveIntent {
        MoveIntent {
            forward,
            left,
            right,
            ..MoveIntent::default()
        }
    }

    #[test]
    fn heading_zero_faces_negative_z() {
        assert!(Pose::default().forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn turn_left_is_counter_clockwise_from_above() {
        let pose = Pose::new(Vec3::ZERO, std::f32::consts::FRAC_PI_2);
        assert!(pose.forward().abs_diff_eq(Vec3::NEG_X, 1e-6));
    }

    #[test]
    fn turns_before_translating() {
        let ctrl = PlayerController::new(2.0, std::f32::consts::FRAC_PI_2);
        let mut pose = Pose::default();
        ctrl.update(&mut pose, intent(true, true, false), 1.0);
        assert_relative_eq!(pose.heading, std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
        // moved along the new heading (-X), not the old one (-Z)
        assert!(pose.position.abs_diff_eq(Vec3::new(-2.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn turning_right_wraps_below_zero() {
        let ctrl = PlayerController::new(1.0, 1.0);
        let mut pose = Pose::default();
        ctrl.update(&mut pose, intent(false, false, true), 0.5);
        assert_relative_eq!(pose.heading, TAU - 0.5, epsilon = 1e-5);
    }

    #[test]
    fn backward_reverses_forward() {
        let ctrl = PlayerController::default();
        let mut pose = Pose::new(Vec3::new(0.0, 0.5, 0.0), 0.0);
        let backward = MoveIntent {
            backward: true,
            ..MoveIntent::default()
        };
        ctrl.update(&mut pose, backward, 0.5);
        assert!(pose.position.abs_diff_eq(Vec3::new(0.0, 0.5, 3.0), 1e-5));
    }

    #[test]
    fn follow_camera_sits_behind_and_above() {
        let cam = FollowCamera::default();
        let pose = Pose::new(Vec3::new(0.0, 0.5, 0.0), 0.0);
        let (eye, look) = cam.pose(&pose);
        assert!(eye.abs_diff_eq(Vec3::new(0.0, 3.5, 8.0), 1e-5));
        assert!(look.abs_diff_eq((pose.position - eye).normalize(), 1e-6));
    }

    #[test]
    fn follow_camera_drives_camera() {
        let follow = FollowCamera::default();
        let pose = Pose::new(Vec3::new(1.0, 0.5, -2.0), 1.0);
        let mut camera = Camera::new(800, 600);
        follow.apply(&pose, &mut camera);
        let (eye, look) = follow.pose(&pose);
        assert_eq!(camera.eye, eye);
        assert!(camera.forward().abs_diff_eq(look, 1e-4));
    }

    proptest! {
        #[test]
        fn turning_left_accumulates_heading(omega in 0.1f32..3.0, d in 0.0f32..5.0) {
            let ctrl = PlayerController::new(1.0, omega);
            let mut pose = Pose::default();
            ctrl.update(&mut pose, intent(true, true, false), d);
            let expected = (omega * d).rem_euclid(TAU);
            let diff = (pose.heading - expected).abs();
            prop_assert!(diff < 1e-4 || (TAU - diff) < 1e-4);
            prop_assert!(pose.heading >= 0.0 && pose.heading < TAU);
            let moved = pose.position.normalize_or_zero();
            if d > 0.0 {
                prop_assert!(moved.abs_diff_eq(pose.forward(), 1e-3));
            }
        }
    }
}
