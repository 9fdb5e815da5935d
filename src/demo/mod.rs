//! The three demo scenes, each implementing [`crate::controller::Demo`].
pub mod dancer;
pub mod fetch;
pub mod sculpture;

pub use dancer::DancerDemo;
pub use fetch::FetchDemo;
pub use sculpture::SculptureDemo;

use glam::{Mat4, Vec3};

use crate::controller::{FlyCameraController, InputProcessor, InputState};
use crate::model::Camera;
use crate::utils::{create_cube_mesh, Mesh};

/// Mouse look, scroll zoom and keyboard flight for one frame.
fn drive_fly_camera(
    fly: &FlyCameraController,
    processor: &InputProcessor,
    camera: &mut Camera,
    input: &mut InputState,
    dt: f32,
) {
    let (dx, dy) = input.consume_look();
    if dx != 0.0 || dy != 0.0 {
        fly.apply_look(camera, dx, dy);
    }
    let scroll = input.consume_scroll();
    if scroll != 0.0 {
        fly.apply_zoom(camera, scroll);
    }
    fly.update_movement(camera, processor.move_intent(input), dt);
}

/// A loaded model drawn at `loaded_scale`, or a unit cube stretched to `half_extents`.
fn model_or_box(mesh: Option<Mesh>, loaded_scale: f32, half_extents: Vec3) -> (Mesh, Mat4) {
    match mesh {
        Some(mesh) => (mesh, Mat4::from_scale(Vec3::splat(loaded_scale))),
        None => (create_cube_mesh(), Mat4::from_scale(half_extents * 2.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_box_matches_collision_extents() {
        let (mesh, fit) = model_or_box(None, 0.025, Vec3::new(0.6, 1.0, 0.6));
        let (lo, hi) = mesh.bounds().unwrap();
        assert!(fit.transform_point3(lo).abs_diff_eq(Vec3::new(-0.6, -1.0, -0.6), 1e-6));
        assert!(fit.transform_point3(hi).abs_diff_eq(Vec3::new(0.6, 1.0, 0.6), 1e-6));
    }

    #[test]
    fn loaded_model_keeps_its_scale() {
        let (_, fit) = model_or_box(Some(create_cube_mesh()), 0.025, Vec3::ONE);
        assert_eq!(fit, Mat4::from_scale(Vec3::splat(0.025)));
    }

    #[test]
    fn fly_camera_consumes_mouse_and_scroll() {
        use crate::controller::InputEvent;
        let fly = FlyCameraController::default();
        let processor = InputProcessor::default();
        let mut camera = Camera::new(800, 600);
        let mut input = InputState::new();
        input.process_event(&InputEvent::PointerLockChanged { locked: true });
        input.process_event(&InputEvent::MouseMove { dx: 10.0, dy: 0.0 });
        input.process_event(&InputEvent::MouseWheel { delta_y: 5.0 });

        let yaw = camera.yaw;
        drive_fly_camera(&fly, &processor, &mut camera, &mut input, 0.016);
        assert!(camera.yaw > yaw);
        assert!((camera.fov_y.to_degrees() - 40.0).abs() < 1e-4);
        assert_eq!(input.consume_look(), (0.0, 0.0));
        assert_eq!(input.consume_scroll(), 0.0);
    }
}
