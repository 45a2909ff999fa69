use glam::Vec3;

use crate::model::Camera;

/// Smallest bounding size accepted; anything below is clamped so the
/// near/far planes stay positive and ordered.
const MIN_BOUNDS_SIZE: f32 = 1e-3;

/// Direction used when the camera sits on (or directly above) the bounds
/// center and no horizontal direction can be derived.
const FALLBACK_DIRECTION: Vec3 = Vec3::NEG_Z;

/// Place the camera so a volume of `size_to_fit` units centered on
/// `bounds_center` fills the vertical field of view. The approach direction
/// keeps the camera on its current side of the scene, flattened onto the
/// ground plane. Near/far planes are derived from `bounds_size`.
///
/// Utility for setup and on-demand re-framing; not part of the per-frame
/// path.
pub fn frame_to_fit(camera: &mut Camera, size_to_fit: f32, bounds_size: f32, bounds_center: Vec3) {
    let half_fov = camera.fov_y * 0.5;
    let distance = (size_to_fit * 0.5) / half_fov.tan();

    let flat = (camera.eye - bounds_center) * Vec3::new(1.0, 0.0, 1.0);
    let direction = flat.try_normalize().unwrap_or(FALLBACK_DIRECTION);

    camera.eye = bounds_center + direction * distance;

    let bounds = bounds_size.max(MIN_BOUNDS_SIZE);
    camera.z_near = bounds / 100.0;
    camera.z_far = bounds * 100.0;

    camera.look_at(bounds_center);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_with_fov(degrees: f32) -> Camera {
        let mut cam = Camera::new(800, 600);
        cam.fov_y = degrees.to_radians();
        cam
    }

    #[test]
    fn test_distance_for_right_angle_fov() {
        // tan(45 deg) = 1, so fitting 2 units lands exactly 1 unit away
        let mut cam = camera_with_fov(90.0);
        cam.eye = Vec3::new(0.0, 0.0, -10.0);
        frame_to_fit(&mut cam, 2.0, 2.0, Vec3::ZERO);
        assert!((cam.eye.length() - 1.0).abs() < 1e-5, "got {:?}", cam.eye);
    }

    #[test]
    fn test_direction_flattened_to_ground_plane() {
        let mut cam = camera_with_fov(90.0);
        cam.eye = Vec3::new(0.0, 5.0, -3.0);
        frame_to_fit(&mut cam, 2.0, 2.0, Vec3::ZERO);
        assert_eq!(cam.eye.y, 0.0);
        assert!(cam.eye.z < 0.0, "camera stays on its original side");
    }

    #[test]
    fn test_coincident_eye_falls_back_without_nan() {
        let mut cam = camera_with_fov(90.0);
        cam.eye = Vec3::new(1.0, 2.0, 3.0);
        frame_to_fit(&mut cam, 2.0, 2.0, Vec3::new(1.0, 2.0, 3.0));

        assert!(cam.eye.is_finite());
        let offset = cam.eye - Vec3::new(1.0, 2.0, 3.0);
        assert!((offset.normalize() - FALLBACK_DIRECTION).length() < 1e-5);
    }

    #[test]
    fn test_eye_directly_above_center_falls_back() {
        // flattening a vertical offset leaves a zero vector
        let mut cam = camera_with_fov(90.0);
        cam.eye = Vec3::new(0.0, 10.0, 0.0);
        frame_to_fit(&mut cam, 2.0, 2.0, Vec3::ZERO);
        assert!(cam.eye.is_finite());
    }

    #[test]
    fn test_zero_bounds_size_keeps_planes_positive() {
        let mut cam = camera_with_fov(75.0);
        frame_to_fit(&mut cam, 2.0, 0.0, Vec3::ZERO);
        assert!(cam.z_near > 0.0);
        assert!(cam.z_far > cam.z_near);
    }

    #[test]
    fn test_near_far_derived_from_bounds() {
        let mut cam = camera_with_fov(75.0);
        cam.eye = Vec3::new(0.0, 0.0, -5.0);
        frame_to_fit(&mut cam, 10.0, 10.0, Vec3::ZERO);
        assert!((cam.z_near - 0.1).abs() < 1e-6);
        assert!((cam.z_far - 1000.0).abs() < 1e-3);
        assert_eq!(cam.target, Vec3::ZERO);
    }
}
