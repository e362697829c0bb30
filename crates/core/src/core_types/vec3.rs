//! Vector and rotation type aliases for positions, directions and attitudes.

use nalgebra::{UnitQuaternion, Vector3};

/// 3D vector type for positions, velocities, normals and forces.
///
/// This is a simple alias for `nalgebra::Vector3<f64>`. Double precision keeps
/// the meter-to-centimeter rounding at cell boundaries stable.
pub type Vec3 = Vector3<f64>;

/// Unit quaternion used for drone and payload orientations.
pub type Quat = UnitQuaternion<f64>;
