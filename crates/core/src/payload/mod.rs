//! Payload surface discretization
//!
//! A payload exposes its surfaces as batches of patches: small pieces of area
//! with a world position, a lever arm in the payload's own frame, an outward
//! normal and an area. Flat faces share one normal and one area across the
//! whole batch; curved surfaces carry one of each per patch.
//!
//! The set of geometries the sampler integrates over is closed:
//! [`PayloadGeometry::Box`] and [`PayloadGeometry::Teardrop`]. A payload that
//! reports no geometry is rejected by the sampler.

pub mod box_payload;
pub mod teardrop;

pub use box_payload::BoxPayload;
pub use teardrop::TeardropPayload;

use std::fmt;

use crate::core_types::vec3::Vec3;
use crate::error::{DownwashError, Result};
use crate::frame::{rotate_vectors, Pose};

/// Named surface of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Top,
    Bottom,
    /// Side facing -x in the payload frame
    SideNegX,
    /// Side facing +x in the payload frame
    SidePosX,
    /// Side facing -y in the payload frame
    SideNegY,
    /// Side facing +y in the payload frame
    SidePosY,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Surface::Top => "top",
            Surface::Bottom => "bottom",
            Surface::SideNegX => "side -x",
            Surface::SidePosX => "side +x",
            Surface::SideNegY => "side -y",
            Surface::SidePosY => "side +y",
        };
        f.write_str(name)
    }
}

/// How a surface takes part in force integration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceRole {
    pub surface: Surface,
    /// Whether the surface's torque is added to the total
    pub contributes_torque: bool,
}

impl SurfaceRole {
    const fn full(surface: Surface) -> Self {
        Self {
            surface,
            contributes_torque: true,
        }
    }

    const fn force_only(surface: Surface) -> Self {
        Self {
            surface,
            contributes_torque: false,
        }
    }
}

const BOX_SURFACES: [SurfaceRole; 6] = [
    SurfaceRole::full(Surface::Top),
    // The bottom of a box sits in the wake; its lever arm is not applied
    SurfaceRole::force_only(Surface::Bottom),
    SurfaceRole::full(Surface::SideNegX),
    SurfaceRole::full(Surface::SidePosX),
    SurfaceRole::full(Surface::SideNegY),
    SurfaceRole::full(Surface::SidePosY),
];

const TEARDROP_SURFACES: [SurfaceRole; 2] = [
    SurfaceRole::full(Surface::Top),
    SurfaceRole::full(Surface::Bottom),
];

/// Recognized payload geometries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadGeometry {
    /// Rectangular box: top, bottom and four sides
    Box,
    /// Surface of revolution: top and bottom halves
    Teardrop,
}

impl PayloadGeometry {
    /// Surfaces integrated for this geometry, in accumulation order
    #[must_use]
    pub fn surfaces(self) -> &'static [SurfaceRole] {
        match self {
            PayloadGeometry::Box => &BOX_SURFACES,
            PayloadGeometry::Teardrop => &TEARDROP_SURFACES,
        }
    }
}

/// A per-patch attribute that is either shared by the whole batch or given
/// for every patch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PerPatch<'a, T> {
    Shared(T),
    Each(&'a [T]),
}

impl<T: Copy> PerPatch<'_, T> {
    /// Value for patch `idx`
    #[inline]
    #[must_use]
    pub fn get(&self, idx: usize) -> T {
        match self {
            PerPatch::Shared(value) => *value,
            PerPatch::Each(values) => values[idx],
        }
    }

    fn len(&self) -> Option<usize> {
        match self {
            PerPatch::Shared(_) => None,
            PerPatch::Each(values) => Some(values.len()),
        }
    }
}

/// Patch data for one surface, as parallel sequences
#[derive(Debug, Clone, Copy)]
pub struct PatchBatch<'a> {
    /// Patch centers in the world frame (m)
    pub world_positions: &'a [Vec3],
    /// Patch centers in the payload frame (m), used as lever arms
    pub local_positions: &'a [Vec3],
    /// Outward unit normals in the world frame
    pub normals: PerPatch<'a, Vec3>,
    /// Patch areas (m²)
    pub areas: PerPatch<'a, f64>,
}

impl PatchBatch<'_> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.world_positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.world_positions.is_empty()
    }

    /// Check that every per-patch sequence has the same length.
    ///
    /// # Errors
    /// Returns [`DownwashError::MalformedPatches`] naming the first mismatch.
    pub fn validate(&self, surface: Surface) -> Result<()> {
        let expected = self.len();
        let mismatch = |what: &str, got: usize| DownwashError::MalformedPatches {
            surface: surface.to_string(),
            reason: format!("{got} {what} for {expected} positions"),
        };

        if self.local_positions.len() != expected {
            return Err(mismatch("lever arms", self.local_positions.len()));
        }
        if let Some(got) = self.normals.len().filter(|&n| n != expected) {
            return Err(mismatch("normals", got));
        }
        if let Some(got) = self.areas.len().filter(|&n| n != expected) {
            return Err(mismatch("areas", got));
        }
        Ok(())
    }
}

/// A payload whose surfaces can be integrated by the sampler
pub trait Payload {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Geometry variant, `None` when the payload is not one the sampler knows
    fn geometry(&self) -> Option<PayloadGeometry>;

    /// Current patch batch of `surface`, `None` if the payload has no such surface
    fn surface(&self, surface: Surface) -> Option<PatchBatch<'_>>;
}

/// Patch data stored in owned buffers, kept current with the payload pose.
///
/// Flat surfaces store a single normal and a single area.
#[derive(Debug, Clone, Default)]
pub(crate) struct SurfacePatches {
    pub flat: bool,
    pub local_positions: Vec<Vec3>,
    pub local_normals: Vec<Vec3>,
    pub areas: Vec<f64>,
    pub world_positions: Vec<Vec3>,
    pub world_normals: Vec<Vec3>,
}

fn attribute<T: Copy>(values: &[T], flat: bool) -> PerPatch<'_, T> {
    match (flat, values) {
        (true, [shared]) => PerPatch::Shared(*shared),
        _ => PerPatch::Each(values),
    }
}

impl SurfacePatches {
    pub(crate) fn update_pose(&mut self, pose: &Pose) {
        self.world_positions = self
            .local_positions
            .iter()
            .map(|p| pose.transform_point(p))
            .collect();
        self.world_normals = rotate_vectors(&pose.orientation, &self.local_normals);
    }

    pub(crate) fn as_batch(&self) -> PatchBatch<'_> {
        PatchBatch {
            world_positions: &self.world_positions,
            local_positions: &self.local_positions,
            normals: attribute(&self.world_normals, self.flat),
            areas: attribute(&self.areas, self.flat),
        }
    }

    pub(crate) fn total_area(&self) -> f64 {
        if self.flat {
            self.areas.first().copied().unwrap_or(0.0) * self.local_positions.len() as f64
        } else {
            self.areas.iter().sum()
        }
    }
}
