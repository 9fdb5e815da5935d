use glam::{Mat4, Vec3};

/// Perspective camera described by an eye point and yaw/pitch angles (radians).
///
/// Yaw is measured from +X towards +Z, so a yaw of -90° looks down -Z.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 3.0),
            yaw: -90f32.to_radians(),
            pitch: 0.0,
            up: Vec3::Y,
            fov_y: 45f32.to_radians(),
            aspect: aspect_ratio(width, height),
            z_near: 0.1,
            z_far: 100.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        let cy = self.yaw;
        let cp = self.pitch.clamp(-1.5533, 1.5533); // Slightly less than π/2 to avoid gimbal lock
        Vec3::new(cy.cos() * cp.cos(), cp.sin(), cy.sin() * cp.cos()).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    pub fn target(&self) -> Vec3 {
        self.eye + self.forward()
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target(), self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    pub fn set_look_at(&mut self, target: Vec3) {
        self.set_look_dir(target - self.eye);
    }

    /// Point the camera along `dir`. A zero vector leaves the orientation unchanged.
    pub fn set_look_dir(&mut self, dir: Vec3) {
        let Some(dir) = dir.try_normalize() else {
            return;
        };
        self.yaw = dir.z.atan2(dir.x);
        self.pitch = dir.y.asin().clamp(-1.4, 1.4);
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_looks_down_negative_z() {
        let cam = Camera::new(800, 600);
        assert!(cam.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(cam.right().abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn look_at_round_trips_direction() {
        let mut cam = Camera::new(1280, 720);
        cam.eye = Vec3::new(0.0, 3.0, 8.0);
        cam.set_look_at(Vec3::new(0.0, 0.5, 0.0));
        let expected = (Vec3::new(0.0, 0.5, 0.0) - cam.eye).normalize();
        assert!(cam.forward().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn zero_height_does_not_divide_by_zero() {
        let mut cam = Camera::new(640, 0);
        assert!(cam.aspect.is_finite());
        cam.set_aspect(0, 0);
        assert_eq!(cam.aspect, 1.0);
    }

    #[test]
    fn degenerate_look_dir_is_ignored() {
        let mut cam = Camera::new(640, 480);
        let before = cam.clone();
        cam.set_look_dir(Vec3::ZERO);
        assert_eq!(cam, before);
    }
}
