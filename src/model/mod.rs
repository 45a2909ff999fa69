// MODEL: scene data and camera state
pub mod camera;
pub mod geometry;
pub mod scene;

pub use camera::Camera;
pub use geometry::{Mesh, MeshBuffer, Vertex};
pub use scene::{Material, Node, Scene, Transform};
