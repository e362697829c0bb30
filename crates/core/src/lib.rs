//! Downwash Force Sampling Core Library
//!
//! Converts a quadrotor's precomputed propeller downwash into the force and
//! torque it exerts on a payload hanging beneath it, once per physics tick.
//!
//! ## Pipeline
//!
//! - Pressure (and optionally velocity) cubes are loaded once from flat ASCII
//!   exports, either as single fields or as dictionaries keyed by rotor speed
//! - Payload surfaces are discretized into patches (box or teardrop)
//! - Each tick, patch positions are moved into the rotor frame, culled against
//!   the sampled cube, rounded to 1 cm cells and integrated into a net
//!   force/torque pair
//!
//! The fluid dynamics themselves are solved offline; this crate only samples.

// Core types and utilities
pub mod core_types;
pub mod error;

pub mod config;
pub mod drone;
pub mod frame;
pub mod grid;
pub mod payload;
pub mod sampler;

// Re-export core types
pub use core_types::{Centimeters, Meters, Quat, Vec3};
pub use error::{DownwashError, Result};

// Re-export sampling types
pub use config::{FieldSourceConfig, SamplerConfig};
pub use drone::{DronePose, DroneState};
pub use frame::Pose;
pub use grid::{FieldDictionary, GridField, PressureField, VelocityField};
pub use payload::{
    BoxPayload, PatchBatch, Payload, PayloadGeometry, PerPatch, Surface, TeardropPayload,
};
pub use sampler::{FieldSource, SurfaceForces, SurfaceSampler};
