//! Teardrop payload
//!
//! A surface of revolution about the payload z axis with a pointed top and a
//! rounded bottom. The meridian is parametrized by `t ∈ [0, π]`:
//!
//! ```text
//! r(t) = R · sin(t) · sin(t / 2)
//! z(t) = (H / 2) · cos(t)
//! ```
//!
//! `t = 0` is the tip at `z = H/2`, `t = π` the bottom pole at `z = -H/2`.
//! Patches are meridian × azimuth quads evaluated at their midpoints, so both
//! the normal and the area vary per patch. The upper half of the meridian
//! (`t < π/2`) is the top surface, the rest the bottom.

use std::f64::consts::{PI, TAU};

use crate::core_types::vec3::Vec3;
use crate::error::{DownwashError, Result};
use crate::frame::Pose;
use crate::payload::{PatchBatch, Payload, PayloadGeometry, Surface, SurfacePatches};

/// Teardrop-shaped payload centered on its own frame origin
#[derive(Debug, Clone)]
pub struct TeardropPayload {
    name: String,
    height: f64,
    max_radius: f64,
    pose: Pose,
    top: SurfacePatches,
    bottom: SurfacePatches,
}

/// Meridian point and tangent `(r, z, dr/dt, dz/dt)` at parameter `t`
fn meridian(t: f64, height: f64, max_radius: f64) -> (f64, f64, f64, f64) {
    let half = t / 2.0;
    let r = max_radius * t.sin() * half.sin();
    let z = height / 2.0 * t.cos();
    let dr = max_radius * (t.cos() * half.sin() + 0.5 * t.sin() * half.cos());
    let dz = -height / 2.0 * t.sin();
    (r, z, dr, dz)
}

impl TeardropPayload {
    /// Create a teardrop of total `height` and widest radius about
    /// `max_radius`, discretized into `meridian_segments × azimuth_segments`
    /// patches.
    ///
    /// # Errors
    /// Returns [`DownwashError::Config`] if a dimension is not positive, the
    /// meridian has fewer than two segments, or the azimuth fewer than three.
    pub fn new(
        height: f64,
        max_radius: f64,
        meridian_segments: usize,
        azimuth_segments: usize,
    ) -> Result<Self> {
        if !(height > 0.0 && max_radius > 0.0 && height.is_finite() && max_radius.is_finite()) {
            return Err(DownwashError::config(format!(
                "teardrop dimensions must be positive, got height {height}, radius {max_radius}"
            )));
        }
        if meridian_segments < 2 || azimuth_segments < 3 {
            return Err(DownwashError::config(format!(
                "teardrop needs at least 2 meridian and 3 azimuth segments, \
                 got {meridian_segments} and {azimuth_segments}"
            )));
        }

        let mut top = SurfacePatches::default();
        let mut bottom = SurfacePatches::default();
        let dt = PI / meridian_segments as f64;
        let dphi = TAU / azimuth_segments as f64;

        for m in 0..meridian_segments {
            let t = (m as f64 + 0.5) * dt;
            let (r, z, dr, dz) = meridian(t, height, max_radius);
            let tangent_len = dr.hypot(dz);
            // Outward normal in the meridian plane
            let (n_r, n_z) = (-dz / tangent_len, dr / tangent_len);
            let area = tangent_len * dt * r * dphi;

            let half = if t < PI / 2.0 { &mut top } else { &mut bottom };
            for a in 0..azimuth_segments {
                let phi = (a as f64 + 0.5) * dphi;
                let (sin_phi, cos_phi) = phi.sin_cos();
                half.local_positions
                    .push(Vec3::new(r * cos_phi, r * sin_phi, z));
                half.local_normals
                    .push(Vec3::new(n_r * cos_phi, n_r * sin_phi, n_z));
                half.areas.push(area);
            }
        }

        let mut payload = Self {
            name: "teardrop".to_string(),
            height,
            max_radius,
            pose: Pose::identity(),
            top,
            bottom,
        };
        payload.set_pose(Pose::identity());
        Ok(payload)
    }

    /// Rename the payload for diagnostics.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Move the payload and refresh the world-frame patch data.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.top.update_pose(&pose);
        self.bottom.update_pose(&pose);
    }

    #[must_use]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Total discretized surface area (m²)
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.top.total_area() + self.bottom.total_area()
    }
}

impl Payload for TeardropPayload {
    fn name(&self) -> &str {
        &self.name
    }

    fn geometry(&self) -> Option<PayloadGeometry> {
        Some(PayloadGeometry::Teardrop)
    }

    fn surface(&self, surface: Surface) -> Option<PatchBatch<'_>> {
        match surface {
            Surface::Top => Some(self.top.as_batch()),
            Surface::Bottom => Some(self.bottom.as_batch()),
            _ => None,
        }
    }
}
