// CONTROLLER: input, per-frame update systems, and the render loop
pub mod animation;
pub mod camera_controller;
pub mod frame_loop;
pub mod framer;
pub mod input;

pub use animation::AnimationDriver;
pub use camera_controller::CameraController;
pub use frame_loop::{CancelToken, DrawTarget, FrameLoop, reconcile_viewport};
pub use framer::frame_to_fit;
pub use input::{InputState, KeyBindings};
