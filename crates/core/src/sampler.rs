//! Downwash Force Sampler
//!
//! Integrates the precomputed rotor downwash over a payload's surface patches
//! and returns the net force and torque acting on the payload.
//!
//! # Rotor frame
//!
//! The sampled cube is N cm on a side, centered horizontally under the rotor
//! hub and extending N cm below it. Its corner is the rotor frame origin:
//!
//! ```text
//! origin_body = rotor_offset - (N/200, N/200, N/100)   [m]
//! ```
//!
//! A world point maps to cell `(i, j, k)` by subtracting the world-frame
//! origin, rotating into the drone's frame and rounding centimeters.
//!
//! # Force model
//!
//! Per patch with outward normal `n`, area `A`, pressure `p` and local flow
//! velocity `v`:
//!
//! ```text
//! F = -p · n · A  -  ρ · A · (v · n) · v
//! τ = r × F
//! ```
//!
//! where `r` is the patch position in the payload frame. The velocity term is
//! only evaluated when a velocity source is configured.

use tracing::{debug, info};

use crate::config::{constants, FieldSourceConfig, SamplerConfig};
use crate::core_types::units::{Centimeters, CENTIMETERS_PER_METER};
use crate::core_types::vec3::Vec3;
use crate::drone::DroneState;
use crate::error::{DownwashError, Result};
use crate::frame::{offset_origin, to_local_frame, to_world_frame, Pose};
use crate::grid::{loader, CellValue, FieldDictionary, GridField};
use crate::payload::{PatchBatch, Payload, Surface, SurfaceRole};

/// Where one physical quantity is sampled from
#[derive(Debug, Clone)]
pub enum FieldSource<T> {
    /// One field used at every rotor speed
    Direct(GridField<T>),
    /// Fields for several rotor speeds, interpolated at the current one
    Dictionary(FieldDictionary<T>),
}

impl<T: CellValue> FieldSource<T> {
    /// Load a source described by `config`.
    ///
    /// # Errors
    /// Propagates load failures from [`loader::load_field`] and
    /// [`loader::load_dictionary`].
    pub fn load(config: &FieldSourceConfig) -> Result<Self> {
        match config {
            FieldSourceConfig::File(path) => loader::load_field(path).map(Self::Direct),
            FieldSourceConfig::Dictionary(dir) => {
                loader::load_dictionary(dir).map(Self::Dictionary)
            }
        }
    }

    #[must_use]
    pub fn cube_size(&self) -> usize {
        match self {
            FieldSource::Direct(field) => field.cube_size(),
            FieldSource::Dictionary(dict) => dict.cube_size(),
        }
    }

    #[must_use]
    pub fn is_dictionary(&self) -> bool {
        matches!(self, FieldSource::Dictionary(_))
    }

    /// Sample a batch of cells; `rotor_speed` only matters for dictionaries.
    #[must_use]
    pub fn sample(&self, indices: &[[usize; 3]], rotor_speed: f64) -> Vec<T> {
        match self {
            FieldSource::Direct(field) => field.sample_many(indices),
            FieldSource::Dictionary(dict) => dict.sample(rotor_speed, indices),
        }
    }

    fn describe(&self) -> String {
        match self {
            FieldSource::Direct(_) => "single field".to_string(),
            FieldSource::Dictionary(dict) => format!("dictionary of {}", dict.len()),
        }
    }
}

impl<T> From<GridField<T>> for FieldSource<T> {
    fn from(field: GridField<T>) -> Self {
        FieldSource::Direct(field)
    }
}

impl<T> From<FieldDictionary<T>> for FieldSource<T> {
    fn from(dict: FieldDictionary<T>) -> Self {
        FieldSource::Dictionary(dict)
    }
}

/// Force and torque contributed by one payload surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceForces {
    pub surface: Surface,
    pub force: Vec3,
    /// Torque about the payload origin; only summed if `contributes_torque`
    pub torque: Vec3,
    pub contributes_torque: bool,
    /// Patches that fell inside the sampled cube
    pub sampled_patches: usize,
}

/// Converts downwash fields into forces on payload surfaces
#[derive(Debug, Clone)]
pub struct SurfaceSampler {
    pressure: FieldSource<f64>,
    velocity: Option<FieldSource<Vec3>>,
    cube_size: usize,
    /// Rotor hub in the drone body frame (m)
    rotor_offset: Vec3,
    /// Cube corner in the drone body frame (m)
    origin_offset: Vec3,
    /// Shift along rotor-frame z applied to payload positions.
    /// Single writer: only changed through `set_payload_offset`.
    payload_offset: Centimeters,
    /// Exclusive upper bound of valid rotor-frame coordinates (m)
    index_upper_limit: f64,
    air_density: f64,
}

impl SurfaceSampler {
    /// Build a sampler from loaded sources.
    ///
    /// # Errors
    /// Returns [`DownwashError::Config`] if the velocity source's cube size
    /// differs from the pressure source's.
    pub fn new(
        pressure: impl Into<FieldSource<f64>>,
        velocity: Option<FieldSource<Vec3>>,
        rotor_offset: Vec3,
    ) -> Result<Self> {
        let pressure = pressure.into();
        let cube_size = pressure.cube_size();

        if let Some(velocity) = &velocity {
            if velocity.cube_size() != cube_size {
                return Err(DownwashError::config(format!(
                    "velocity cube size {} does not match pressure cube size {cube_size}",
                    velocity.cube_size()
                )));
            }
        }

        let n = cube_size as f64;
        let origin_offset = rotor_offset
            - Vec3::new(n / 200.0, n / 200.0, n / CENTIMETERS_PER_METER);
        let index_upper_limit = (n - 0.5) / CENTIMETERS_PER_METER;

        info!(
            "Surface sampler ready: {}^3 cells, pressure from {}, velocity from {}",
            cube_size,
            pressure.describe(),
            velocity
                .as_ref()
                .map_or_else(|| "nowhere".to_string(), FieldSource::describe)
        );

        Ok(Self {
            pressure,
            velocity,
            cube_size,
            rotor_offset,
            origin_offset,
            payload_offset: Centimeters::ZERO,
            index_upper_limit,
            air_density: constants::AIR_DENSITY,
        })
    }

    /// Load every source named in `config` and build the sampler.
    ///
    /// # Errors
    /// Propagates load failures and the cube-size check of [`Self::new`].
    pub fn from_config(config: &SamplerConfig) -> Result<Self> {
        let pressure: FieldSource<f64> = FieldSource::load(&config.pressure)?;
        let velocity = config
            .velocity
            .as_ref()
            .map(FieldSource::load)
            .transpose()?;

        let mut sampler = Self::new(pressure, velocity, config.rotor_offset)?
            .with_air_density(config.air_density);
        sampler.set_payload_offset(config.payload_offset);
        Ok(sampler)
    }

    pub fn with_air_density(mut self, air_density: f64) -> Self {
        self.air_density = air_density;
        self
    }

    /// Shift payload positions along the rotor-frame z axis.
    pub fn set_payload_offset(&mut self, offset: impl Into<Centimeters>) {
        self.payload_offset = offset.into();
        debug!("Payload offset set to {}", self.payload_offset);
    }

    #[must_use]
    pub fn payload_offset_cm(&self) -> Centimeters {
        self.payload_offset
    }

    #[must_use]
    pub fn payload_offset_m(&self) -> f64 {
        *self.payload_offset.to_meters()
    }

    #[must_use]
    pub fn cube_size(&self) -> usize {
        self.cube_size
    }

    #[must_use]
    pub fn index_upper_limit(&self) -> f64 {
        self.index_upper_limit
    }

    #[must_use]
    pub fn rotor_offset(&self) -> Vec3 {
        self.rotor_offset
    }

    #[must_use]
    pub fn air_density(&self) -> f64 {
        self.air_density
    }

    #[must_use]
    pub fn has_velocity(&self) -> bool {
        self.velocity.is_some()
    }

    fn uses_dictionary(&self) -> bool {
        self.pressure.is_dictionary()
            || self
                .velocity
                .as_ref()
                .is_some_and(FieldSource::is_dictionary)
    }

    /// World-frame pose of the rotor frame (cube corner and drone attitude).
    #[must_use]
    pub fn position_orientation<D: DroneState + ?Sized>(&self, drone: &D) -> Pose {
        let orientation = drone.orientation();
        let position = offset_origin(&drone.position(), &orientation, &self.origin_offset);
        Pose::new(position, orientation)
    }

    /// World-frame corners of the sampled cube.
    #[must_use]
    pub fn field_vertices<D: DroneState + ?Sized>(&self, drone: &D) -> [Vec3; 8] {
        let side = self.cube_size as f64 / CENTIMETERS_PER_METER;
        let corners: Vec<Vec3> = (0..8_u8)
            .map(|bits| {
                Vec3::new(
                    f64::from(bits & 1) * side,
                    f64::from((bits >> 1) & 1) * side,
                    f64::from((bits >> 2) & 1) * side,
                ) + self.origin_offset
            })
            .collect();

        let world = to_world_frame(&corners, &drone.position(), &drone.orientation());
        let mut vertices = [Vec3::zeros(); 8];
        vertices.copy_from_slice(&world);
        vertices
    }

    /// Net force and torque of the downwash on `payload`.
    ///
    /// # Errors
    /// Returns [`DownwashError::UnsupportedPayload`] if the payload has no
    /// recognized geometry or lacks one of its geometry's surfaces, and
    /// [`DownwashError::MalformedPatches`] if a surface's patch data is
    /// inconsistent. Nothing is accumulated in either case.
    pub fn generate_forces<D, P>(&self, drone: &D, payload: &P) -> Result<(Vec3, Vec3)>
    where
        D: DroneState + ?Sized,
        P: Payload + ?Sized,
    {
        let surfaces = self.generate_forces_per_surface(drone, payload)?;

        let mut force = Vec3::zeros();
        let mut torque = Vec3::zeros();
        for contribution in &surfaces {
            force += contribution.force;
            if contribution.contributes_torque {
                torque += contribution.torque;
            }
        }

        debug!(
            "Downwash on {}: F=({:.4}, {:.4}, {:.4}) N, T=({:.5}, {:.5}, {:.5}) N·m",
            payload.name(),
            force.x,
            force.y,
            force.z,
            torque.x,
            torque.y,
            torque.z
        );
        Ok((force, torque))
    }

    /// Force and torque of each surface of `payload`, in the geometry's
    /// surface order.
    ///
    /// # Errors
    /// Same as [`Self::generate_forces`].
    pub fn generate_forces_per_surface<D, P>(
        &self,
        drone: &D,
        payload: &P,
    ) -> Result<Vec<SurfaceForces>>
    where
        D: DroneState + ?Sized,
        P: Payload + ?Sized,
    {
        let geometry = payload
            .geometry()
            .ok_or_else(|| DownwashError::UnsupportedPayload(payload.name().to_string()))?;

        // Gather and check every batch before integrating any of them
        let batches = geometry
            .surfaces()
            .iter()
            .map(|role| -> Result<(SurfaceRole, PatchBatch<'_>)> {
                let batch = payload.surface(role.surface).ok_or_else(|| {
                    DownwashError::UnsupportedPayload(format!(
                        "{} has no {} surface",
                        payload.name(),
                        role.surface
                    ))
                })?;
                batch.validate(role.surface)?;
                Ok((*role, batch))
            })
            .collect::<Result<Vec<_>>>()?;

        let frame = self.position_orientation(drone);
        let rotor_speed = if self.uses_dictionary() {
            drone.representative_rotor_speed()
        } else {
            0.0
        };

        Ok(batches
            .iter()
            .map(|(role, batch)| self.surface_forces(*role, batch, &frame, rotor_speed))
            .collect())
    }

    fn surface_forces(
        &self,
        role: SurfaceRole,
        batch: &PatchBatch<'_>,
        frame: &Pose,
        rotor_speed: f64,
    ) -> SurfaceForces {
        let offset_z = self.payload_offset_m();
        let mut local = to_local_frame(batch.world_positions, &frame.position, &frame.orientation);
        for p in &mut local {
            p.z += offset_z;
        }

        let (survivors, indices) = self.cull_and_index(&local);

        let mut force = Vec3::zeros();
        let mut torque = Vec3::zeros();

        if !survivors.is_empty() {
            let pressures = self.pressure.sample(&indices, rotor_speed);
            let velocities = self
                .velocity
                .as_ref()
                .map(|source| source.sample(&indices, rotor_speed));

            for (n, &patch) in survivors.iter().enumerate() {
                let normal = batch.normals.get(patch);
                let area = batch.areas.get(patch);

                let mut patch_force = -pressures[n] * normal * area;
                if let Some(velocities) = &velocities {
                    let v = velocities[n];
                    patch_force -= self.air_density * area * v.dot(&normal) * v;
                }

                force += patch_force;
                torque += batch.local_positions[patch].cross(&patch_force);
            }
        }

        SurfaceForces {
            surface: role.surface,
            force,
            torque,
            contributes_torque: role.contributes_torque,
            sampled_patches: survivors.len(),
        }
    }

    /// Keep rotor-frame positions inside `[0, index_upper_limit)` on every
    /// axis and convert them to cell indices.
    ///
    /// A coordinate just below the limit can still scale to exactly `N - 0.5`
    /// and round up to `N`, so indices are clamped to the last cell.
    ///
    /// Returns the surviving patch numbers alongside their cells.
    fn cull_and_index(&self, local: &[Vec3]) -> (Vec<usize>, Vec<[usize; 3]>) {
        let limit = self.index_upper_limit;
        let last = self.cube_size - 1;
        let inside = |c: f64| (0.0..limit).contains(&c);
        let cell = |c: f64| ((c * CENTIMETERS_PER_METER).round_ties_even() as usize).min(last);

        local
            .iter()
            .enumerate()
            .filter(|(_, p)| inside(p.x) && inside(p.y) && inside(p.z))
            .map(|(patch, p)| (patch, [cell(p.x), cell(p.y), cell(p.z)]))
            .unzip()
    }
}
