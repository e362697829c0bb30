//! Semantic unit types for lengths that cross the meter/centimeter boundary
//!
//! Grid cells are 1 cm wide while every pose and patch position is expressed
//! in meters. These newtypes keep the two scales from being mixed up at the
//! sampler's configuration surface.
//!
//! # Usage
//! ```
//! use downwash_core::core_types::units::{Centimeters, Meters};
//!
//! let offset = Centimeters::new(15.0);
//! let meters: Meters = offset.into();
//! assert!((*meters - 0.15).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Mul, Neg, Sub};

/// Centimeters per meter
pub const CENTIMETERS_PER_METER: f64 = 100.0;

/// Length in centimeters (grid index space)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Centimeters(f64);

impl Eq for Centimeters {}

impl PartialOrd for Centimeters {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Centimeters {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for Centimeters {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Centimeters {
    /// Zero length
    pub const ZERO: Centimeters = Centimeters(0.0);

    /// Create a new length in centimeters
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Centimeters(value)
    }

    /// Convert to meters
    #[inline]
    #[must_use]
    pub fn to_meters(self) -> Meters {
        Meters(self.0 / CENTIMETERS_PER_METER)
    }
}

impl From<f64> for Centimeters {
    fn from(value: f64) -> Self {
        Centimeters(value)
    }
}

impl From<Centimeters> for f64 {
    fn from(value: Centimeters) -> Self {
        value.0
    }
}

impl From<Centimeters> for Meters {
    fn from(value: Centimeters) -> Self {
        value.to_meters()
    }
}

impl Add for Centimeters {
    type Output = Centimeters;
    fn add(self, rhs: Centimeters) -> Centimeters {
        Centimeters(self.0 + rhs.0)
    }
}

impl Sub for Centimeters {
    type Output = Centimeters;
    fn sub(self, rhs: Centimeters) -> Centimeters {
        Centimeters(self.0 - rhs.0)
    }
}

impl Neg for Centimeters {
    type Output = Centimeters;
    fn neg(self) -> Centimeters {
        Centimeters(-self.0)
    }
}

impl fmt::Display for Centimeters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} cm", self.0)
    }
}

/// Length in meters (world space)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Meters(f64);

impl Eq for Meters {}

impl PartialOrd for Meters {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Meters {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Deref for Meters {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Meters {
    /// Create a new length in meters
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Meters(value)
    }

    /// Convert to centimeters
    #[inline]
    #[must_use]
    pub fn to_centimeters(self) -> Centimeters {
        Centimeters(self.0 * CENTIMETERS_PER_METER)
    }
}

impl From<f64> for Meters {
    fn from(value: f64) -> Self {
        Meters(value)
    }
}

impl From<Meters> for f64 {
    fn from(value: Meters) -> Self {
        value.0
    }
}

impl From<Meters> for Centimeters {
    fn from(value: Meters) -> Self {
        value.to_centimeters()
    }
}

impl Mul<f64> for Meters {
    type Output = Meters;
    fn mul(self, rhs: f64) -> Meters {
        Meters(self.0 * rhs)
    }
}

impl fmt::Display for Meters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} m", self.0)
    }
}
