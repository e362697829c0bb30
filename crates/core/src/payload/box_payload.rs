//! Rectangular box payload
//!
//! Each face is split into `subdivisions × subdivisions` equal rectangles.
//! Faces are flat, so a face batch carries one shared normal and one shared
//! patch area.

use crate::core_types::vec3::Vec3;
use crate::error::{DownwashError, Result};
use crate::frame::Pose;
use crate::payload::{PatchBatch, Payload, PayloadGeometry, Surface, SurfacePatches};

/// Box-shaped payload centered on its own frame origin
#[derive(Debug, Clone)]
pub struct BoxPayload {
    name: String,
    /// Full edge lengths along the payload x, y and z axes (m)
    size: Vec3,
    subdivisions: usize,
    pose: Pose,
    faces: Vec<(Surface, SurfacePatches)>,
}

/// Outward axis and sign of each face
const FACES: [(Surface, usize, f64); 6] = [
    (Surface::Top, 2, 1.0),
    (Surface::Bottom, 2, -1.0),
    (Surface::SideNegX, 0, -1.0),
    (Surface::SidePosX, 0, 1.0),
    (Surface::SideNegY, 1, -1.0),
    (Surface::SidePosY, 1, 1.0),
];

fn face_patches(normal_axis: usize, sign: f64, size: &Vec3, subdivisions: usize) -> SurfacePatches {
    let u = (normal_axis + 1) % 3;
    let v = (normal_axis + 2) % 3;
    let du = size[u] / subdivisions as f64;
    let dv = size[v] / subdivisions as f64;

    let mut local_positions = Vec::with_capacity(subdivisions * subdivisions);
    for a in 0..subdivisions {
        for b in 0..subdivisions {
            let mut p = Vec3::zeros();
            p[normal_axis] = sign * size[normal_axis] / 2.0;
            p[u] = -size[u] / 2.0 + (a as f64 + 0.5) * du;
            p[v] = -size[v] / 2.0 + (b as f64 + 0.5) * dv;
            local_positions.push(p);
        }
    }

    let mut normal = Vec3::zeros();
    normal[normal_axis] = sign;

    SurfacePatches {
        flat: true,
        local_positions,
        local_normals: vec![normal],
        areas: vec![du * dv],
        ..Default::default()
    }
}

impl BoxPayload {
    /// Create a box of the given edge lengths at the world origin.
    ///
    /// # Errors
    /// Returns [`DownwashError::Config`] if an edge length is not positive or
    /// `subdivisions` is zero.
    pub fn new(size: Vec3, subdivisions: usize) -> Result<Self> {
        if size.iter().any(|&edge| !(edge > 0.0 && edge.is_finite())) {
            return Err(DownwashError::config(format!(
                "box edge lengths must be positive, got {size:?}"
            )));
        }
        if subdivisions == 0 {
            return Err(DownwashError::config("box needs at least one patch per face edge"));
        }

        let faces = FACES
            .iter()
            .map(|&(surface, axis, sign)| (surface, face_patches(axis, sign, &size, subdivisions)))
            .collect();

        let mut payload = Self {
            name: "box".to_string(),
            size,
            subdivisions,
            pose: Pose::identity(),
            faces,
        };
        payload.set_pose(Pose::identity());
        Ok(payload)
    }

    /// Rename the payload for diagnostics.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Move the payload and refresh every face's world-frame data.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        for (_, face) in &mut self.faces {
            face.update_pose(&pose);
        }
    }

    #[must_use]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.size
    }

    #[must_use]
    pub fn subdivisions(&self) -> usize {
        self.subdivisions
    }

    /// Total discretized surface area (m²)
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.faces.iter().map(|(_, face)| face.total_area()).sum()
    }
}

impl Payload for BoxPayload {
    fn name(&self) -> &str {
        &self.name
    }

    fn geometry(&self) -> Option<PayloadGeometry> {
        Some(PayloadGeometry::Box)
    }

    fn surface(&self, surface: Surface) -> Option<PatchBatch<'_>> {
        self.faces
            .iter()
            .find(|(s, _)| *s == surface)
            .map(|(_, face)| face.as_batch())
    }
}
