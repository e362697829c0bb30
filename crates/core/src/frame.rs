//! Rotor-frame transforms
//!
//! Stateless helpers that move batches of points and directions between the
//! world frame and the rotor-aligned frame the grid fields are sampled in.
//!
//! - *Active* rotation (`rotate_vectors`) turns a body-frame direction into the
//!   world frame: `v_world = q * v_body`.
//! - *Passive* rotation (`rotate_vectors_inverse`) re-expresses a world-frame
//!   vector in the rotated frame: `v_body = q⁻¹ * v_world`.

use crate::core_types::vec3::{Quat, Vec3};
use nalgebra::Quaternion;

/// Position and orientation of a frame expressed in the world frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    #[must_use]
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    #[must_use]
    pub fn identity() -> Self {
        Self::new(Vec3::zeros(), Quat::identity())
    }

    /// Map a point from this frame into the world frame.
    #[inline]
    #[must_use]
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        self.orientation * point + self.position
    }

    /// Map a world-frame point into this frame.
    #[inline]
    #[must_use]
    pub fn inverse_transform_point(&self, point: &Vec3) -> Vec3 {
        self.orientation.inverse_transform_vector(&(point - self.position))
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Build a unit quaternion from `(w, x, y, z)` components, normalizing them.
///
/// Physics engines commonly export attitudes in this scalar-first order.
#[must_use]
pub fn quat_from_wxyz(w: f64, x: f64, y: f64, z: f64) -> Quat {
    Quat::from_quaternion(Quaternion::new(w, x, y, z))
}

/// Active rotation of a batch of vectors.
#[must_use]
pub fn rotate_vectors(orientation: &Quat, vectors: &[Vec3]) -> Vec<Vec3> {
    vectors.iter().map(|v| orientation * v).collect()
}

/// Passive rotation of a batch of vectors.
#[must_use]
pub fn rotate_vectors_inverse(orientation: &Quat, vectors: &[Vec3]) -> Vec<Vec3> {
    vectors
        .iter()
        .map(|v| orientation.inverse_transform_vector(v))
        .collect()
}

/// World-frame origin of a frame rigidly offset from a body.
///
/// `offset` is expressed in the body frame.
#[inline]
#[must_use]
pub fn offset_origin(body_position: &Vec3, body_orientation: &Quat, offset: &Vec3) -> Vec3 {
    body_position + body_orientation * offset
}

/// Express world-frame points in the frame at `origin` with `orientation`.
#[must_use]
pub fn to_local_frame(points: &[Vec3], origin: &Vec3, orientation: &Quat) -> Vec<Vec3> {
    let pose = Pose::new(*origin, *orientation);
    points
        .iter()
        .map(|p| pose.inverse_transform_point(p))
        .collect()
}

/// Express frame-local points in the world frame.
#[must_use]
pub fn to_world_frame(points: &[Vec3], origin: &Vec3, orientation: &Quat) -> Vec<Vec3> {
    let pose = Pose::new(*origin, *orientation);
    points.iter().map(|p| pose.transform_point(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn yaw_90() -> Quat {
        Quat::from_axis_angle(&Vec3::z_axis(), FRAC_PI_2)
    }

    #[test]
    fn test_active_rotation() {
        let rotated = rotate_vectors(&yaw_90(), &[Vec3::x(), Vec3::y()]);
        assert_relative_eq!(rotated[0], Vec3::y(), epsilon = 1e-12);
        assert_relative_eq!(rotated[1], -Vec3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_passive_rotation_inverts_active() {
        let q = Quat::from_euler_angles(0.3, -0.7, 1.9);
        let vectors = vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(-0.5, 0.0, 4.0)];

        let back = rotate_vectors_inverse(&q, &rotate_vectors(&q, &vectors));
        for (a, b) in back.iter().zip(&vectors) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_passive_rotation_frame_change() {
        // A world +y direction seen from a frame yawed by 90° is that frame's +x
        let local = rotate_vectors_inverse(&yaw_90(), &[Vec3::y()]);
        assert_relative_eq!(local[0], Vec3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_offset_origin() {
        let origin = offset_origin(
            &Vec3::new(1.0, 1.0, 2.0),
            &yaw_90(),
            &Vec3::new(0.1, 0.0, -0.2),
        );
        assert_relative_eq!(origin, Vec3::new(1.0, 1.1, 1.8), epsilon = 1e-12);
    }

    #[test]
    fn test_local_world_round_trip() {
        let origin = Vec3::new(0.4, -1.0, 3.0);
        let q = Quat::from_euler_angles(0.1, 0.2, 0.3);
        let points = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, -2.0, 0.5)];

        let local = to_local_frame(&points, &origin, &q);
        let world = to_world_frame(&local, &origin, &q);
        for (a, b) in world.iter().zip(&points) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
        assert_relative_eq!(to_local_frame(&[origin], &origin, &q)[0], Vec3::zeros());
    }

    #[test]
    fn test_quat_from_wxyz_normalizes() {
        let q = quat_from_wxyz(2.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(q.into_inner().norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(q * Vec3::x(), Vec3::x(), epsilon = 1e-12);
    }
}
