use glam::{EulerRot, Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub translation: Vec3,
    /// Euler rotation in radians, applied in XYZ order.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.translation)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub color: [f32; 4],
    /// Shaded materials receive the light rig; unlit ones draw flat color.
    pub shaded: bool,
}

impl Material {
    pub fn shaded(color: [f32; 4]) -> Self {
        Self { color, shaded: true }
    }

    pub fn unlit(color: [f32; 4]) -> Self {
        Self { color, shaded: false }
    }
}

/// A renderable entry: mesh handle plus per-node transform and material.
pub struct Node {
    pub mesh: usize,
    pub transform: Transform,
    pub material: Material,
}

/// Owned collection of renderable nodes. Membership only changes during
/// setup and on model attach; the per-frame systems just read and mutate
/// transform fields.
pub struct Scene {
    pub nodes: Vec<Node>,
    /// Node ids whose rotation is driven by the animation system, in
    /// registration order (the position in this list picks the spin speed).
    pub spinners: Vec<usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            spinners: Vec::new(),
        }
    }

    pub fn add_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Add a node and register it with the animation system.
    pub fn add_spinner(&mut self, node: Node) -> usize {
        let id = self.add_node(node);
        self.spinners.push(id);
        id
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_registration_order() {
        let mut scene = Scene::new();
        let plain = scene.add_node(Node {
            mesh: 0,
            transform: Transform::from_translation(Vec3::ZERO),
            material: Material::unlit([1.0; 4]),
        });
        let spinner = scene.add_spinner(Node {
            mesh: 0,
            transform: Transform::from_translation(Vec3::ONE),
            material: Material::shaded([1.0; 4]),
        });
        assert_eq!(plain, 0);
        assert_eq!(spinner, 1);
        assert_eq!(scene.spinners, vec![1]);
    }

    #[test]
    fn test_transform_matrix_translation_column() {
        let t = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let m = t.matrix();
        assert_eq!(m.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }
}
