//! Core types and utilities

pub mod units;
pub mod vec3;

pub use units::*;
pub use vec3::{Quat, Vec3};
