//! Force integration over whole payloads
//!
//! Places payloads inside the sampled cube of a drone hovering at the origin
//! and checks the integrated force/torque against hand-computed values.
//!
//! Run tests with: `cargo test --test downwash_forces`

use approx::assert_relative_eq;
use downwash_core::{
    BoxPayload, DownwashError, DronePose, FieldDictionary, PatchBatch, Payload, PayloadGeometry,
    PerPatch, Pose, PressureField, Quat, Surface, SurfaceSampler, TeardropPayload, Vec3,
    VelocityField,
};
use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const N: usize = 21;

/// World point directly below the rotor at `depth` meters
fn below_rotor(depth: f64) -> Vec3 {
    Vec3::new(0.0, 0.0, -depth)
}

fn hovering_drone() -> DronePose {
    DronePose::hovering(Vec3::zeros(), 0.0)
}

fn uniform_sampler(pressure: f64) -> SurfaceSampler {
    SurfaceSampler::new(PressureField::uniform(N, pressure), None, Vec3::zeros()).unwrap()
}

/// Pressure growing by 10 Pa per centimeter of rotor-frame height
fn layered_sampler() -> SurfaceSampler {
    let field = PressureField::from_fn(N, |_, _, k| 10.0 * k as f64);
    SurfaceSampler::new(field, None, Vec3::zeros()).unwrap()
}

struct LoosePatches {
    geometry: Option<PayloadGeometry>,
    world: Vec<Vec3>,
    lever: Vec<Vec3>,
    normal: Vec3,
    area: f64,
}

impl LoosePatches {
    fn single(world: Vec3, lever: Vec3, normal: Vec3, area: f64) -> Self {
        Self {
            geometry: Some(PayloadGeometry::Teardrop),
            world: vec![world],
            lever: vec![lever],
            normal,
            area,
        }
    }
}

impl Payload for LoosePatches {
    fn name(&self) -> &str {
        "loose patches"
    }

    fn geometry(&self) -> Option<PayloadGeometry> {
        self.geometry
    }

    fn surface(&self, surface: Surface) -> Option<PatchBatch<'_>> {
        let (world, lever) = match surface {
            Surface::Top => (self.world.as_slice(), self.lever.as_slice()),
            Surface::Bottom => (&self.world[..0], &self.lever[..0]),
            _ => return None,
        };
        Some(PatchBatch {
            world_positions: world,
            local_positions: lever,
            normals: PerPatch::Shared(self.normal),
            areas: PerPatch::Shared(self.area),
        })
    }
}

#[test]
fn test_single_patch_in_uniform_field() {
    let sampler = uniform_sampler(100.0);
    let payload = LoosePatches::single(below_rotor(0.1), Vec3::zeros(), Vec3::z(), 0.01);

    let (force, torque) = sampler.generate_forces(&hovering_drone(), &payload).unwrap();

    assert_relative_eq!(force, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
    assert_relative_eq!(torque, Vec3::zeros(), epsilon = 1e-12);
}

#[test]
fn test_box_in_uniform_field_cancels() {
    let sampler = uniform_sampler(100.0);
    let mut payload = BoxPayload::new(Vec3::new(0.1, 0.1, 0.06), 5).unwrap();
    payload.set_pose(Pose::new(below_rotor(0.105), Quat::identity()));

    let per_surface = sampler
        .generate_forces_per_surface(&hovering_drone(), &payload)
        .unwrap();
    assert_eq!(per_surface.len(), 6);
    assert!(per_surface.iter().all(|s| s.sampled_patches == 25));

    let (force, torque) = sampler.generate_forces(&hovering_drone(), &payload).unwrap();
    assert!(force.norm() < 1e-9, "net force should cancel: {force:?}");
    assert!(torque.norm() < 1e-9, "net torque should cancel: {torque:?}");
}

#[test]
fn test_teardrop_in_uniform_field_nearly_cancels() {
    let pressure = 100.0;
    let sampler = uniform_sampler(pressure);
    let mut payload = TeardropPayload::new(0.1, 0.04, 20, 24).unwrap();
    payload.set_pose(Pose::new(below_rotor(0.105), Quat::identity()));

    let (force, torque) = sampler.generate_forces(&hovering_drone(), &payload).unwrap();

    let scale = pressure * payload.surface_area();
    assert!(force.norm() < 0.01 * scale, "net force too large: {force:?}");
    assert!(torque.norm() < 1e-3 * scale, "net torque too large: {torque:?}");
}

#[test]
fn test_box_in_layered_field() {
    let sampler = layered_sampler();
    let mut payload = BoxPayload::new(Vec3::new(0.08, 0.08, 0.06), 4).unwrap();
    // Center 10 cm up the cube: top face in cell k = 13, bottom in k = 7
    payload.set_pose(Pose::new(below_rotor(0.11), Quat::identity()));

    let (force, _) = sampler.generate_forces(&hovering_drone(), &payload).unwrap();

    let face_area = 0.08 * 0.08;
    assert_relative_eq!(force.z, -(130.0 - 70.0) * face_area, epsilon = 1e-9);
    assert_relative_eq!(force.x, 0.0, epsilon = 1e-9);
    assert_relative_eq!(force.y, 0.0, epsilon = 1e-9);
}

#[test]
fn test_drone_yaw_does_not_change_vertical_load() {
    let sampler = layered_sampler();
    let mut payload = BoxPayload::new(Vec3::new(0.08, 0.08, 0.06), 4).unwrap();
    payload.set_pose(Pose::new(below_rotor(0.11), Quat::identity()));

    let level = hovering_drone();
    let mut yawed = hovering_drone();
    yawed.orientation = Quat::from_axis_angle(&Vec3::z_axis(), 30_f64.to_radians());

    let (level_force, _) = sampler.generate_forces(&level, &payload).unwrap();
    let (yawed_force, _) = sampler.generate_forces(&yawed, &payload).unwrap();

    assert_relative_eq!(level_force.z, yawed_force.z, epsilon = 1e-9);
}

#[test]
fn test_payload_outside_cube_feels_nothing() {
    let sampler = uniform_sampler(100.0);
    let mut payload = BoxPayload::new(Vec3::new(0.05, 0.05, 0.05), 3).unwrap();
    payload.set_pose(Pose::new(Vec3::new(0.0, 0.0, -1.0), Quat::identity()));

    let (force, torque) = sampler.generate_forces(&hovering_drone(), &payload).unwrap();
    assert_eq!(force, Vec3::zeros());
    assert_eq!(torque, Vec3::zeros());
}

#[test]
fn test_box_bottom_contributes_force_only() {
    let sampler = layered_sampler();
    let mut payload = BoxPayload::new(Vec3::new(0.08, 0.08, 0.06), 4).unwrap();
    // Tilt the box so the bottom face's lever arms produce torque
    let tilt = Quat::from_axis_angle(&Vec3::x_axis(), 10_f64.to_radians());
    payload.set_pose(Pose::new(below_rotor(0.11), tilt));

    let per_surface = sampler
        .generate_forces_per_surface(&hovering_drone(), &payload)
        .unwrap();
    let (force, torque) = sampler.generate_forces(&hovering_drone(), &payload).unwrap();

    let bottom = per_surface
        .iter()
        .find(|s| s.surface == Surface::Bottom)
        .unwrap();
    assert!(!bottom.contributes_torque);

    let summed_force: Vec3 = per_surface.iter().map(|s| s.force).sum();
    let summed_torque: Vec3 = per_surface
        .iter()
        .filter(|s| s.surface != Surface::Bottom)
        .map(|s| s.torque)
        .sum();
    assert_relative_eq!(force, summed_force, epsilon = 1e-12);
    assert_relative_eq!(torque, summed_torque, epsilon = 1e-12);
}

#[test]
fn test_dictionary_interpolates_on_rotor_speed() {
    let dict = FieldDictionary::new(vec![
        (400.0, PressureField::uniform(N, 40.0)),
        (600.0, PressureField::uniform(N, 80.0)),
    ])
    .unwrap();
    let sampler = SurfaceSampler::new(dict, None, Vec3::zeros()).unwrap();
    let payload = LoosePatches::single(below_rotor(0.1), Vec3::zeros(), Vec3::z(), 0.01);

    let at = |speed: f64| {
        let drone = DronePose::hovering(Vec3::zeros(), speed);
        sampler.generate_forces(&drone, &payload).unwrap().0.z
    };

    assert_relative_eq!(at(400.0), -0.4, epsilon = 1e-12);
    assert_relative_eq!(at(500.0), -0.6, epsilon = 1e-12);
    assert_relative_eq!(at(600.0), -0.8, epsilon = 1e-12);
    // Clamped outside the stored speeds
    assert_relative_eq!(at(100.0), -0.4, epsilon = 1e-12);
    assert_relative_eq!(at(2000.0), -0.8, epsilon = 1e-12);
}

#[test]
fn test_velocity_dictionary_with_direct_pressure() {
    let velocity = FieldDictionary::new(vec![
        (400.0, VelocityField::uniform(N, Vec3::new(0.0, 0.0, -2.0))),
        (600.0, VelocityField::uniform(N, Vec3::new(0.0, 0.0, -4.0))),
    ])
    .unwrap();
    let sampler = SurfaceSampler::new(
        PressureField::uniform(N, 100.0),
        Some(velocity.into()),
        Vec3::zeros(),
    )
    .unwrap()
    .with_air_density(1.25);
    let payload = LoosePatches::single(below_rotor(0.1), Vec3::zeros(), Vec3::z(), 0.01);

    let at = |speed: f64| {
        let drone = DronePose::hovering(Vec3::zeros(), speed);
        sampler.generate_forces(&drone, &payload).unwrap().0.z
    };
    // Pressure gives -1 N; downward flow w adds -rho * A * w^2
    let expected = |w: f64| -1.0 - 1.25 * 0.01 * w * w;

    assert_relative_eq!(at(400.0), expected(2.0), epsilon = 1e-12);
    assert_relative_eq!(at(500.0), expected(3.0), epsilon = 1e-12);
    assert_relative_eq!(at(600.0), expected(4.0), epsilon = 1e-12);
    // Clamped outside the stored speeds
    assert_relative_eq!(at(0.0), expected(2.0), epsilon = 1e-12);
    assert_relative_eq!(at(1500.0), expected(4.0), epsilon = 1e-12);
}

#[test]
fn test_unsupported_payload_is_rejected() {
    let sampler = uniform_sampler(100.0);
    let mut sphere = LoosePatches::single(below_rotor(0.1), Vec3::zeros(), Vec3::z(), 0.01);
    sphere.geometry = None;

    let err = sampler.generate_forces(&hovering_drone(), &sphere).unwrap_err();
    assert!(matches!(err, DownwashError::UnsupportedPayload(_)));

    // A payload claiming to be a box but lacking its sides is rejected too
    let mut fake_box = LoosePatches::single(below_rotor(0.1), Vec3::zeros(), Vec3::z(), 0.01);
    fake_box.geometry = Some(PayloadGeometry::Box);
    assert!(matches!(
        sampler.generate_forces(&hovering_drone(), &fake_box),
        Err(DownwashError::UnsupportedPayload(_))
    ));

    // The sampler is unaffected by the failed calls
    let valid = LoosePatches::single(below_rotor(0.1), Vec3::zeros(), Vec3::z(), 0.01);
    let (force, _) = sampler.generate_forces(&hovering_drone(), &valid).unwrap();
    assert_relative_eq!(force.z, -1.0, epsilon = 1e-12);
}

#[test]
fn test_malformed_batch_is_rejected() {
    let sampler = uniform_sampler(100.0);
    let mut payload = LoosePatches::single(below_rotor(0.1), Vec3::zeros(), Vec3::z(), 0.01);
    payload.lever.push(Vec3::zeros());

    assert!(matches!(
        sampler.generate_forces(&hovering_drone(), &payload),
        Err(DownwashError::MalformedPatches { .. })
    ));
}
