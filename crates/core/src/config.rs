//! Sampler configuration
//!
//! Describes where a sampler's grid data comes from and the geometric
//! constants it is built with. All paths are resolved when the sampler is
//! constructed; nothing is read afterwards.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core_types::units::Centimeters;
use crate::core_types::vec3::Vec3;

/// Physical constants used by the force model
pub mod constants {
    /// Air density used for the velocity force term (kg/m³)
    pub const AIR_DENSITY: f64 = 1.293;
}

/// Where one physical quantity is loaded from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldSourceConfig {
    /// A single flat grid file, used at every rotor speed
    File(PathBuf),
    /// A folder of flat grid files keyed by rotor speed
    Dictionary(PathBuf),
}

/// Configuration for building a [`crate::SurfaceSampler`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Pressure source (required)
    pub pressure: FieldSourceConfig,

    /// Velocity source; the velocity force term is skipped without one
    pub velocity: Option<FieldSourceConfig>,

    /// Rotor hub position in the drone body frame (m)
    pub rotor_offset: Vec3,

    /// Vertical shift applied to payload positions in the rotor frame
    pub payload_offset: Centimeters,

    /// Air density for the velocity force term (kg/m³)
    pub air_density: f64,
}

impl SamplerConfig {
    /// Configuration with only a pressure source and default constants
    #[must_use]
    pub fn new(pressure: FieldSourceConfig) -> Self {
        Self {
            pressure,
            velocity: None,
            rotor_offset: Vec3::zeros(),
            payload_offset: Centimeters::ZERO,
            air_density: constants::AIR_DENSITY,
        }
    }

    pub fn with_velocity(mut self, velocity: FieldSourceConfig) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_rotor_offset(mut self, rotor_offset: Vec3) -> Self {
        self.rotor_offset = rotor_offset;
        self
    }

    pub fn with_payload_offset(mut self, payload_offset: Centimeters) -> Self {
        self.payload_offset = payload_offset;
        self
    }

    pub fn with_air_density(mut self, air_density: f64) -> Self {
        self.air_density = air_density;
        self
    }
}
