//! Discretized Flow-Quantity Cube
//!
//! A `GridField` stores one precomputed sample per 1 cm cell of a cube of side
//! `N` cells. Pressure fields hold one scalar (Pa) per cell, velocity fields
//! one 3-vector (m/s) per cell.
//!
//! # Layout
//!
//! Cells are stored as a flat `Vec` with the first index varying slowest:
//!
//! ```text
//! index(i, j, k) = (i * N + j) * N + k
//! ```
//!
//! This is the order the offline CFD exports are written in, so a flat input
//! file maps onto the cube without any transposition. Vector fields consume the
//! flat input as consecutive `(x, y, z)` triples in the same cell order.

use std::ops::{Add, Mul, Sub};

use crate::core_types::vec3::Vec3;
use crate::error::{DownwashError, Result};

/// A value that can be stored in a grid cell and linearly interpolated.
pub trait CellValue:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self> + Send + Sync + 'static
{
    /// Number of scalars one cell consumes from a flat input
    const COMPONENTS: usize;

    /// Human-readable quantity name used in error messages
    const QUANTITY: &'static str;

    /// Build a cell value from exactly `COMPONENTS` scalars.
    fn from_components(components: &[f64]) -> Self;

    /// Append the cell's scalars to `out`, in input order.
    fn extend_components(&self, out: &mut Vec<f64>);
}

impl CellValue for f64 {
    const COMPONENTS: usize = 1;
    const QUANTITY: &'static str = "pressure";

    #[inline]
    fn from_components(components: &[f64]) -> Self {
        components[0]
    }

    fn extend_components(&self, out: &mut Vec<f64>) {
        out.push(*self);
    }
}

impl CellValue for Vec3 {
    const COMPONENTS: usize = 3;
    const QUANTITY: &'static str = "velocity";

    #[inline]
    fn from_components(components: &[f64]) -> Self {
        Vec3::new(components[0], components[1], components[2])
    }

    fn extend_components(&self, out: &mut Vec<f64>) {
        out.extend_from_slice(self.as_slice());
    }
}

/// Immutable cube of flow samples at 1 cm resolution
#[derive(Debug, Clone, PartialEq)]
pub struct GridField<T> {
    /// Side length N in cells
    cube_size: usize,
    /// N³ samples, first index varying slowest
    cells: Vec<T>,
}

/// Scalar pressure cube (Pa)
pub type PressureField = GridField<f64>;

/// Vector velocity cube (m/s)
pub type VelocityField = GridField<Vec3>;

/// Exact integer cube root, `None` when `count` is not a perfect cube.
pub(crate) fn integer_cube_root(count: usize) -> Option<usize> {
    let estimate = (count as f64).cbrt().round() as usize;
    (estimate.saturating_sub(1)..=estimate + 1).find(|&n| {
        n.checked_mul(n)
            .and_then(|sq| sq.checked_mul(n))
            .is_some_and(|cube| cube == count)
    })
}

impl<T: CellValue> GridField<T> {
    /// Build a field from a flat sample sequence.
    ///
    /// # Errors
    /// Returns [`DownwashError::Config`] if the input is empty, is not a whole
    /// number of cells, or the cell count is not a perfect cube.
    pub fn from_flat(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(DownwashError::config(format!(
                "{} grid is empty",
                T::QUANTITY
            )));
        }
        if values.len() % T::COMPONENTS != 0 {
            return Err(DownwashError::config(format!(
                "{} grid has {} values, not a multiple of {}",
                T::QUANTITY,
                values.len(),
                T::COMPONENTS
            )));
        }

        let cell_count = values.len() / T::COMPONENTS;
        let cube_size = integer_cube_root(cell_count).ok_or_else(|| {
            DownwashError::config(format!(
                "{} grid has {} cells, which is not a perfect cube",
                T::QUANTITY,
                cell_count
            ))
        })?;

        let cells = values
            .chunks_exact(T::COMPONENTS)
            .map(T::from_components)
            .collect();

        Ok(Self { cube_size, cells })
    }

    /// Build an `N`-sided field by evaluating `f(i, j, k)` at every cell.
    ///
    /// # Panics
    /// Panics if `cube_size` is zero.
    #[must_use]
    pub fn from_fn(cube_size: usize, f: impl Fn(usize, usize, usize) -> T) -> Self {
        assert!(cube_size > 0, "GridField::from_fn: cube_size must be positive");
        let mut cells = Vec::with_capacity(cube_size * cube_size * cube_size);
        for i in 0..cube_size {
            for j in 0..cube_size {
                for k in 0..cube_size {
                    cells.push(f(i, j, k));
                }
            }
        }
        Self { cube_size, cells }
    }

    /// Build an `N`-sided field holding `value` everywhere.
    #[must_use]
    pub fn uniform(cube_size: usize, value: T) -> Self {
        Self::from_fn(cube_size, |_, _, _| value)
    }

    /// Side length N in cells
    #[inline]
    #[must_use]
    pub fn cube_size(&self) -> usize {
        self.cube_size
    }

    /// Number of cells (N³)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: construction rejects empty input
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.cube_size + j) * self.cube_size + k
    }

    /// Sample the cell at `(i, j, k)`.
    ///
    /// Indices are not range-checked against N individually; callers cull
    /// positions against the sampler's index upper limit first.
    #[inline]
    #[must_use]
    pub fn sample(&self, i: usize, j: usize, k: usize) -> T {
        debug_assert!(i < self.cube_size && j < self.cube_size && k < self.cube_size);
        self.cells[self.index(i, j, k)]
    }

    /// Sample a batch of cells, preserving input order.
    #[must_use]
    pub fn sample_many(&self, indices: &[[usize; 3]]) -> Vec<T> {
        indices
            .iter()
            .map(|&[i, j, k]| self.sample(i, j, k))
            .collect()
    }

    /// Flatten back into the input order accepted by [`GridField::from_flat`].
    #[must_use]
    pub fn flatten(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.cells.len() * T::COMPONENTS);
        for cell in &self.cells {
            cell.extend_components(&mut out);
        }
        out
    }
}
