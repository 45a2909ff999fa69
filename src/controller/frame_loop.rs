use std::cell::Cell;
use std::rc::Rc;

use super::animation::AnimationDriver;
use super::camera_controller::CameraController;
use super::input::InputState;
use crate::model::{Camera, Scene};

/// Render target whose backing buffer can be queried and resized. The
/// per-frame reconciler works against this instead of a live surface, so
/// it can run under test.
pub trait DrawTarget {
    /// Current logical drawable size of the display surface.
    fn drawable_size(&self) -> (u32, u32);
    /// Current backing-buffer size.
    fn buffer_size(&self) -> (u32, u32);
    /// Resize the backing buffer to exactly `width` x `height`.
    fn resize(&mut self, width: u32, height: u32);
}

/// Match the backing buffer to the drawable size. Returns true when a
/// resize happened, in which case the camera projection has been refreshed
/// for the new aspect ratio. A zero-sized drawable is left alone.
pub fn reconcile_viewport<T: DrawTarget + ?Sized>(target: &mut T, camera: &mut Camera) -> bool {
    let (width, height) = target.drawable_size();
    if width == 0 || height == 0 {
        return false;
    }
    if (width, height) == target.buffer_size() {
        return false;
    }

    target.resize(width, height);
    camera.set_aspect(width, height);
    true
}

/// Host-owned stop signal for the render loop. Cloning shares the flag.
#[derive(Clone)]
pub struct CancelToken {
    flag: Rc<Cell<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            flag: Rc::new(Cell::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.flag.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.get()
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Idle,
    Running,
}

/// The per-frame scheduler. Once started, every tick runs the same fixed
/// sequence: viewport reconciliation, animation, camera update, render.
/// Rescheduling is the host's job: it asks for the next redraw only while
/// `should_continue` holds, which makes shutdown an explicit decision
/// instead of an interrupted recursion.
pub struct FrameLoop {
    state: LoopState,
    cancel: CancelToken,
    pub animation: AnimationDriver,
    pub camera_controller: CameraController,
}

impl FrameLoop {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            state: LoopState::Idle,
            cancel,
            animation: AnimationDriver::new(),
            camera_controller: CameraController::new(),
        }
    }

    /// Transition Idle -> Running. Starting an already running loop is a
    /// no-op.
    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            self.state = LoopState::Running;
            tracing::info!("render loop started");
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Whether the host should schedule another tick.
    pub fn should_continue(&self) -> bool {
        self.is_running() && !self.cancel.is_cancelled()
    }

    /// Run one tick. `timestamp_ms` is the scheduler timestamp in
    /// milliseconds since loop start; sub-steps see it as seconds. The
    /// render callback receives the reconciled target and the updated
    /// scene and camera. Panics in any sub-step propagate to the host;
    /// there is no supervised retry.
    pub fn tick<T: DrawTarget>(
        &mut self,
        timestamp_ms: f64,
        target: &mut T,
        camera: &mut Camera,
        scene: &mut Scene,
        input: &InputState,
        render: impl FnOnce(&T, &Scene, &Camera),
    ) {
        let elapsed_seconds = (timestamp_ms * 0.001) as f32;

        reconcile_viewport(target, camera);
        self.animation.tick(scene, elapsed_seconds);
        self.camera_controller.tick(camera, input);
        render(&*target, scene, camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    struct FakeTarget {
        drawable: (u32, u32),
        buffer: (u32, u32),
        resizes: u32,
    }

    impl FakeTarget {
        fn new(drawable: (u32, u32), buffer: (u32, u32)) -> Self {
            Self {
                drawable,
                buffer,
                resizes: 0,
            }
        }
    }

    impl DrawTarget for FakeTarget {
        fn drawable_size(&self) -> (u32, u32) {
            self.drawable
        }

        fn buffer_size(&self) -> (u32, u32) {
            self.buffer
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.buffer = (width, height);
            self.resizes += 1;
        }
    }

    #[test]
    fn test_reconcile_resizes_and_updates_aspect() {
        let mut target = FakeTarget::new((1024, 512), (800, 600));
        let mut cam = Camera::new(800, 600);

        assert!(reconcile_viewport(&mut target, &mut cam));
        assert_eq!(target.buffer, (1024, 512));
        assert_eq!(cam.aspect, 2.0);
    }

    #[test]
    fn test_reconcile_idempotent() {
        let mut target = FakeTarget::new((1024, 512), (800, 600));
        let mut cam = Camera::new(800, 600);

        assert!(reconcile_viewport(&mut target, &mut cam));
        assert!(!reconcile_viewport(&mut target, &mut cam));
        assert_eq!(target.resizes, 1);
    }

    #[test]
    fn test_reconcile_skips_zero_height() {
        let mut target = FakeTarget::new((1024, 0), (800, 600));
        let mut cam = Camera::new(800, 600);
        let aspect = cam.aspect;

        assert!(!reconcile_viewport(&mut target, &mut cam));
        assert_eq!(target.buffer, (800, 600));
        assert_eq!(cam.aspect, aspect);
    }

    #[test]
    fn test_start_transitions_idle_to_running() {
        let mut frame_loop = FrameLoop::new(CancelToken::new());
        assert!(!frame_loop.is_running());
        assert!(!frame_loop.should_continue());

        frame_loop.start();
        assert!(frame_loop.is_running());
        assert!(frame_loop.should_continue());
    }

    #[test]
    fn test_cancel_stops_rescheduling() {
        let cancel = CancelToken::new();
        let mut frame_loop = FrameLoop::new(cancel.clone());
        frame_loop.start();

        cancel.cancel();
        assert!(!frame_loop.should_continue());
        // still Running; cancellation only blocks the next schedule
        assert!(frame_loop.is_running());
    }

    #[test]
    fn test_tick_runs_full_sequence() {
        let mut frame_loop = FrameLoop::new(CancelToken::new());
        frame_loop.start();

        let mut target = FakeTarget::new((1024, 512), (800, 600));
        let mut cam = Camera::new(800, 600);
        cam.eye = Vec3::ZERO;
        let mut scene = Scene::new();
        scene.add_spinner(crate::model::Node {
            mesh: 0,
            transform: crate::model::Transform::from_translation(Vec3::ZERO),
            material: crate::model::Material::unlit([1.0; 4]),
        });
        let mut input = InputState::new();
        input.set_key("KeyW", true);

        let mut rendered = false;
        frame_loop.tick(2000.0, &mut target, &mut cam, &mut scene, &input, |t, s, c| {
            // render observes the reconciled target and updated state
            assert_eq!(t.buffer_size(), (1024, 512));
            assert!((s.nodes[0].transform.rotation.x - 2.0).abs() < 1e-6);
            assert!((c.eye.z - 0.05).abs() < 1e-6);
            rendered = true;
        });
        assert!(rendered);
    }

    #[test]
    fn test_timestamp_millisecond_conversion() {
        let mut frame_loop = FrameLoop::new(CancelToken::new());
        frame_loop.start();

        let mut target = FakeTarget::new((800, 600), (800, 600));
        let mut cam = Camera::new(800, 600);
        let mut scene = Scene::new();
        scene.add_spinner(crate::model::Node {
            mesh: 0,
            transform: crate::model::Transform::from_translation(Vec3::ZERO),
            material: crate::model::Material::unlit([1.0; 4]),
        });

        frame_loop.tick(1500.0, &mut target, &mut cam, &mut scene, &InputState::new(), |_, _, _| {});
        assert!((scene.nodes[0].transform.rotation.x - 1.5).abs() < 1e-6);
    }
}
