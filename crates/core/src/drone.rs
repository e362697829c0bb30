//! Drone state consumed by the sampler
//!
//! The flight model lives elsewhere; the sampler only needs the drone's world
//! pose and the estimated angular velocity of its four rotors.

use serde::{Deserialize, Serialize};

use crate::core_types::vec3::{Quat, Vec3};

/// Read-only view of a quadrotor's state
pub trait DroneState {
    /// World-frame position of the drone body (m)
    fn position(&self) -> Vec3;

    /// World-frame orientation of the drone body
    fn orientation(&self) -> Quat;

    /// Estimated angular velocity of each rotor (rad/s, signed by spin direction)
    fn rotor_speeds(&self) -> [f64; 4];

    /// Mean absolute rotor speed, the operating point for dictionary lookups.
    fn representative_rotor_speed(&self) -> f64 {
        self.rotor_speeds().iter().map(|w| w.abs()).sum::<f64>() / 4.0
    }
}

/// Snapshot of a drone's state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DronePose {
    pub position: Vec3,
    pub orientation: Quat,
    pub rotor_speeds: [f64; 4],
}

impl DronePose {
    #[must_use]
    pub fn new(position: Vec3, orientation: Quat, rotor_speeds: [f64; 4]) -> Self {
        Self {
            position,
            orientation,
            rotor_speeds,
        }
    }

    /// Level drone at `position` with all rotors at `speed`, alternating spin.
    #[must_use]
    pub fn hovering(position: Vec3, speed: f64) -> Self {
        Self::new(position, Quat::identity(), [speed, -speed, speed, -speed])
    }
}

impl Default for DronePose {
    fn default() -> Self {
        Self::hovering(Vec3::zeros(), 0.0)
    }
}

impl DroneState for DronePose {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn orientation(&self) -> Quat {
        self.orientation
    }

    fn rotor_speeds(&self) -> [f64; 4] {
        self.rotor_speeds
    }
}
