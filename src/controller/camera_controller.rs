use glam::Vec3;

use super::input::{InputState, KeyBindings};
use crate::model::Camera;

/// Per-tick translation step in scene units.
pub const MOVE_STEP: f32 = 0.05;

/// Fixed point the camera is re-aimed at after every translation.
pub const ORBIT_ANCHOR: Vec3 = Vec3::ZERO;

/// Maps held keys onto camera translation, then reconciles the view with
/// the orbit anchor.
pub struct CameraController {
    pub bindings: KeyBindings,
    pub move_step: f32,
    pub orbit_anchor: Vec3,
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            bindings: KeyBindings::default(),
            move_step: MOVE_STEP,
            orbit_anchor: ORBIT_ANCHOR,
        }
    }

    /// Advance the camera one tick. Each held key contributes its full step
    /// on its own axis, so simultaneous keys compose additively (diagonal
    /// motion is faster, not normalized). The camera position is never
    /// clamped.
    pub fn tick(&self, camera: &mut Camera, input: &InputState) {
        if input.is_held(&self.bindings.forward) {
            camera.eye.z += self.move_step;
        }
        if input.is_held(&self.bindings.backward) {
            camera.eye.z -= self.move_step;
        }
        if input.is_held(&self.bindings.left) {
            camera.eye.x += self.move_step;
        }
        if input.is_held(&self.bindings.right) {
            camera.eye.x -= self.move_step;
        }

        // Re-aim at the anchor so the next view matrix is built against it.
        camera.look_at(self.orbit_anchor);
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at_origin() -> Camera {
        let mut cam = Camera::new(800, 600);
        cam.eye = Vec3::ZERO;
        cam
    }

    #[test]
    fn test_forward_key_moves_depth_axis_one_step() {
        let controller = CameraController::new();
        let mut cam = camera_at_origin();
        let mut input = InputState::new();
        input.set_key("KeyW", true);

        controller.tick(&mut cam, &input);
        assert_eq!(cam.eye, Vec3::new(0.0, 0.0, MOVE_STEP));
    }

    #[test]
    fn test_no_keys_leaves_position_unchanged() {
        let controller = CameraController::new();
        let mut cam = camera_at_origin();
        let input = InputState::new();

        controller.tick(&mut cam, &input);
        assert_eq!(cam.eye, Vec3::ZERO);
    }

    #[test]
    fn test_diagonal_movement_is_additive_not_normalized() {
        let controller = CameraController::new();
        let mut cam = camera_at_origin();
        let mut input = InputState::new();
        input.set_key("KeyW", true);
        input.set_key("KeyA", true);

        controller.tick(&mut cam, &input);
        assert_eq!(cam.eye.x, MOVE_STEP);
        assert_eq!(cam.eye.z, MOVE_STEP);
    }

    #[test]
    fn test_held_key_accumulates_across_ticks() {
        let controller = CameraController::new();
        let mut cam = camera_at_origin();
        let mut input = InputState::new();
        input.set_key("KeyW", true);

        controller.tick(&mut cam, &input);
        assert!((cam.eye.z - 0.05).abs() < 1e-6);
        controller.tick(&mut cam, &input);
        assert!((cam.eye.z - 0.10).abs() < 1e-6);
    }

    #[test]
    fn test_target_reset_to_anchor() {
        let controller = CameraController::new();
        let mut cam = camera_at_origin();
        cam.target = Vec3::new(3.0, 2.0, 1.0);

        controller.tick(&mut cam, &InputState::new());
        assert_eq!(cam.target, ORBIT_ANCHOR);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let controller = CameraController::new();
        let mut cam = camera_at_origin();
        let mut input = InputState::new();
        input.set_key("KeyW", true);
        input.set_key("KeyS", true);

        controller.tick(&mut cam, &input);
        assert_eq!(cam.eye.z, 0.0);
    }
}
