//! Speed-keyed family of precomputed fields
//!
//! The CFD runs are done offline for a handful of representative propeller
//! speeds. A `FieldDictionary` keeps those fields ordered by speed and answers
//! two questions for the sampler:
//!
//! - which two stored speeds bracket the current one (`bounds`), and
//! - how to blend point samples taken from those two fields (`interpolate`).
//!
//! Blending happens on the handful of cells a payload actually touches, never
//! on whole cubes.

use crate::error::{DownwashError, Result};
use crate::grid::grid_field::{CellValue, GridField};

/// Ordered mapping from propeller speed to a grid field
#[derive(Debug, Clone)]
pub struct FieldDictionary<T> {
    /// Strictly increasing speeds
    keys: Vec<f64>,
    /// `fields[n]` was generated at `keys[n]`
    fields: Vec<GridField<T>>,
    cube_size: usize,
}

impl<T: CellValue> FieldDictionary<T> {
    /// Build a dictionary from `(speed, field)` pairs.
    ///
    /// Entries may arrive in any order; they are sorted by key.
    ///
    /// # Errors
    /// Returns [`DownwashError::Config`] if there are no entries, a key is not
    /// finite, two entries share a key, or the fields disagree on cube size.
    pub fn new(mut entries: Vec<(f64, GridField<T>)>) -> Result<Self> {
        let Some((_, first)) = entries.first() else {
            return Err(DownwashError::config(format!(
                "{} dictionary has no entries",
                T::QUANTITY
            )));
        };
        let cube_size = first.cube_size();

        if let Some((key, _)) = entries.iter().find(|(key, _)| !key.is_finite()) {
            return Err(DownwashError::config(format!(
                "{} dictionary key {key} is not finite",
                T::QUANTITY
            )));
        }
        if let Some((key, field)) = entries
            .iter()
            .find(|(_, field)| field.cube_size() != cube_size)
        {
            return Err(DownwashError::config(format!(
                "{} dictionary entry at {key} has cube size {}, expected {cube_size}",
                T::QUANTITY,
                field.cube_size()
            )));
        }

        entries.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(pair) = entries.windows(2).find(|pair| pair[0].0 >= pair[1].0) {
            return Err(DownwashError::config(format!(
                "{} dictionary has duplicate key {}",
                T::QUANTITY,
                pair[1].0
            )));
        }

        let (keys, fields) = entries.into_iter().unzip();
        Ok(Self {
            keys,
            fields,
            cube_size,
        })
    }

    /// Shared side length N of every stored field
    #[must_use]
    pub fn cube_size(&self) -> usize {
        self.cube_size
    }

    /// Stored speeds, strictly increasing
    #[must_use]
    pub fn keys(&self) -> &[f64] {
        &self.keys
    }

    /// Number of stored fields (never zero)
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false: construction rejects empty dictionaries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Field stored under exactly `key`
    #[must_use]
    pub fn field(&self, key: f64) -> Option<&GridField<T>> {
        self.position(key).map(|idx| &self.fields[idx])
    }

    fn position(&self, key: f64) -> Option<usize> {
        self.keys.iter().position(|&k| k == key)
    }

    /// Tightest pair of stored keys bracketing `query`.
    ///
    /// Queries at or beyond either end clamp to `(min, min)` / `(max, max)`,
    /// and an exact key match collapses to equal bounds.
    #[must_use]
    pub fn bounds(&self, query: f64) -> (f64, f64) {
        let min = self.keys[0];
        let max = self.keys[self.keys.len() - 1];

        if query <= min {
            return (min, min);
        }
        if query >= max {
            return (max, max);
        }

        // First key >= query; guaranteed in 1..len by the clamps above
        let upper = self.keys.partition_point(|&k| k < query);
        if self.keys[upper] == query {
            (query, query)
        } else {
            (self.keys[upper - 1], self.keys[upper])
        }
    }

    /// Blend point samples taken from the two bounding fields.
    ///
    /// With equal keys the lower values are returned unchanged; otherwise each
    /// element is `lower + t * (upper - lower)` with
    /// `t = (query - lower_key) / (upper_key - lower_key)` clamped to `[0, 1]`.
    #[must_use]
    pub fn interpolate(
        query: f64,
        lower_values: &[T],
        upper_values: &[T],
        lower_key: f64,
        upper_key: f64,
    ) -> Vec<T> {
        debug_assert_eq!(lower_values.len(), upper_values.len());

        if lower_key == upper_key {
            return lower_values.to_vec();
        }

        let t = ((query - lower_key) / (upper_key - lower_key)).clamp(0.0, 1.0);
        lower_values
            .iter()
            .zip(upper_values)
            .map(|(&lo, &hi)| lo + (hi - lo) * t)
            .collect()
    }

    /// Sample the dictionary at `query` speed for a batch of cells.
    #[must_use]
    pub fn sample(&self, query: f64, indices: &[[usize; 3]]) -> Vec<T> {
        let (lower_key, upper_key) = self.bounds(query);
        let lower_field = self.field_at_bound(lower_key);
        let lower_values = lower_field.sample_many(indices);

        if lower_key == upper_key {
            return lower_values;
        }

        let upper_values = self.field_at_bound(upper_key).sample_many(indices);
        Self::interpolate(query, &lower_values, &upper_values, lower_key, upper_key)
    }

    fn field_at_bound(&self, key: f64) -> &GridField<T> {
        // Bounds are always stored keys
        let idx = self.keys.partition_point(|&k| k < key);
        &self.fields[idx]
    }
}
