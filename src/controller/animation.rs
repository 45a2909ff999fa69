use crate::model::Scene;

/// Spin speed of the first registered spinner, in radians per second.
pub const BASE_SPEED: f32 = 1.0;
/// Extra speed per spinner index, so no two objects rotate in lockstep.
pub const SPEED_STEP: f32 = 0.01;

/// Drives the rotation of every registered spinner from the frame clock.
/// Stateless: the angle depends only on elapsed time and spinner index.
pub struct AnimationDriver;

impl AnimationDriver {
    pub fn new() -> Self {
        Self
    }

    /// Set each spinner's x and y rotation to `elapsed * (1 + i * 0.01)`.
    /// Both axes share the angle on purpose; it is one animation, not two.
    pub fn tick(&self, scene: &mut Scene, elapsed_seconds: f32) {
        // clone to allow the mutable borrow of the node list in the loop
        let spinners = scene.spinners.clone();
        for (i, id) in spinners.into_iter().enumerate() {
            let speed = BASE_SPEED + i as f32 * SPEED_STEP;
            let angle = elapsed_seconds * speed;
            let transform = &mut scene.nodes[id].transform;
            transform.rotation.x = angle;
            transform.rotation.y = angle;
        }
    }
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Material, Node, Transform};
    use glam::Vec3;

    fn scene_with_spinners(count: usize) -> Scene {
        let mut scene = Scene::new();
        for _ in 0..count {
            scene.add_spinner(Node {
                mesh: 0,
                transform: Transform::from_translation(Vec3::ZERO),
                material: Material::unlit([1.0; 4]),
            });
        }
        scene
    }

    #[test]
    fn test_angle_formula_on_both_axes() {
        let driver = AnimationDriver::new();
        let mut scene = scene_with_spinners(5);
        let t = 2.5;
        driver.tick(&mut scene, t);

        for (i, &id) in scene.spinners.clone().iter().enumerate() {
            let expected = t * (1.0 + i as f32 * 0.01);
            let rot = scene.nodes[id].transform.rotation;
            assert!((rot.x - expected).abs() < 1e-6, "spinner {i} x axis");
            assert!((rot.y - expected).abs() < 1e-6, "spinner {i} y axis");
            assert_eq!(rot.z, 0.0);
        }
    }

    #[test]
    fn test_deterministic_for_same_clock() {
        let driver = AnimationDriver::new();
        let mut a = scene_with_spinners(3);
        let mut b = scene_with_spinners(3);
        driver.tick(&mut a, 7.25);
        driver.tick(&mut b, 7.25);
        for (na, nb) in a.nodes.iter().zip(&b.nodes) {
            assert_eq!(na.transform.rotation, nb.transform.rotation);
        }
    }

    #[test]
    fn test_zero_elapsed_zero_angle() {
        let driver = AnimationDriver::new();
        let mut scene = scene_with_spinners(2);
        driver.tick(&mut scene, 0.0);
        for node in &scene.nodes {
            assert_eq!(node.transform.rotation, Vec3::ZERO);
        }
    }

    #[test]
    fn test_non_spinner_nodes_untouched() {
        let driver = AnimationDriver::new();
        let mut scene = Scene::new();
        let fixed = scene.add_node(Node {
            mesh: 0,
            transform: Transform::from_translation(Vec3::ZERO),
            material: Material::shaded([1.0; 4]),
        });
        scene.add_spinner(Node {
            mesh: 0,
            transform: Transform::from_translation(Vec3::ZERO),
            material: Material::unlit([1.0; 4]),
        });

        driver.tick(&mut scene, 3.0);
        assert_eq!(scene.nodes[fixed].transform.rotation, Vec3::ZERO);
    }
}
