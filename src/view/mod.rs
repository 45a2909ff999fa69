// VIEW: GPU setup and rendering
pub mod gpu_init;
pub mod render;
pub mod target;

pub use gpu_init::GpuContext;
pub use render::{CameraResources, LightRig, ObjectResources, RenderState};
pub use target::ViewTarget;
