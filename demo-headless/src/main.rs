use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use downwash_core::frame::quat_from_wxyz;
use downwash_core::{
    BoxPayload, Centimeters, DronePose, FieldSource, FieldSourceConfig, Payload, Pose,
    PressureField, Quat, Result, SamplerConfig, SurfaceSampler, TeardropPayload, Vec3,
    VelocityField,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Payload shapes the demo can hang under the rotor
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Shape {
    Box,
    Teardrop,
}

/// Downwash force sweep: lowers a payload through the rotor wake and reports
/// the force and torque at each depth
#[derive(Parser, Debug)]
#[command(name = "downwash-headless")]
#[command(about = "Rotor downwash force sampler demo", long_about = None)]
struct Args {
    /// Pressure grid file, or folder of grid files with --dictionary
    /// (a synthetic wake is used if omitted)
    #[arg(short, long)]
    pressure: Option<PathBuf>,

    /// Velocity grid file, or folder of grid files with --dictionary
    #[arg(short, long)]
    velocity: Option<PathBuf>,

    /// Treat --pressure and --velocity as dictionary folders keyed by rotor speed
    #[arg(short, long)]
    dictionary: bool,

    /// Cube size of the synthetic wake in cells (1 cell = 1 cm)
    #[arg(long, default_value_t = 40)]
    cube_size: usize,

    /// Payload shape
    #[arg(short, long, value_enum, default_value_t = Shape::Box)]
    shape: Shape,

    /// Box edge lengths in meters (x y z)
    #[arg(long, num_args = 3, default_values_t = [0.1, 0.1, 0.06])]
    box_size: Vec<f64>,

    /// Teardrop height in meters
    #[arg(long, default_value_t = 0.12)]
    height: f64,

    /// Teardrop widest radius in meters
    #[arg(long, default_value_t = 0.04)]
    radius: f64,

    /// Patches per box face edge, or meridian segments for the teardrop
    #[arg(long, default_value_t = 8)]
    resolution: usize,

    /// Rotor speed used for every motor (rad/s)
    #[arg(short, long, default_value_t = 500.0)]
    rotor_speed: f64,

    /// Drone roll and pitch in degrees
    #[arg(long, num_args = 2, default_values_t = [0.0, 0.0])]
    tilt: Vec<f64>,

    /// Drone attitude as a scalar-first quaternion (w x y z), as exported by
    /// physics engines; overrides --tilt
    #[arg(long, num_args = 4, allow_negative_numbers = true)]
    attitude: Option<Vec<f64>>,

    /// Vertical payload offset in the rotor frame (cm)
    #[arg(long, default_value_t = 0.0)]
    payload_offset: f64,

    /// Depths below the rotor to sample, in cm
    #[arg(long, num_args = 1.., default_values_t = [5.0, 10.0, 15.0, 20.0, 25.0, 30.0])]
    depths: Vec<f64>,
}

/// Round jet: pressure and downward flow decay away from the rotor axis and
/// with distance below the hub.
fn synthetic_sampler(cube_size: usize) -> Result<SurfaceSampler> {
    let n = cube_size as f64;
    let center = (n - 1.0) / 2.0;
    let core_radius = n / 6.0;
    let profile = move |i: usize, j: usize, k: usize| {
        let r2 = (i as f64 - center).powi(2) + (j as f64 - center).powi(2);
        let depth = (n - k as f64) / n;
        (-r2 / (core_radius * core_radius)).exp() / (1.0 + depth)
    };

    let pressure = PressureField::from_fn(cube_size, |i, j, k| 40.0 * profile(i, j, k));
    let velocity =
        VelocityField::from_fn(cube_size, |i, j, k| Vec3::new(0.0, 0.0, -8.0 * profile(i, j, k)));

    SurfaceSampler::new(pressure, Some(FieldSource::Direct(velocity)), Vec3::zeros())
}

fn build_sampler(args: &Args) -> Result<SurfaceSampler> {
    let source = |path: &PathBuf| {
        if args.dictionary {
            FieldSourceConfig::Dictionary(path.clone())
        } else {
            FieldSourceConfig::File(path.clone())
        }
    };

    let mut sampler = match &args.pressure {
        Some(pressure) => {
            let mut config = SamplerConfig::new(source(pressure));
            if let Some(velocity) = &args.velocity {
                config = config.with_velocity(source(velocity));
            }
            SurfaceSampler::from_config(&config)?
        }
        None => {
            info!("No pressure data given, using a synthetic {}^3 wake", args.cube_size);
            synthetic_sampler(args.cube_size)?
        }
    };
    sampler.set_payload_offset(Centimeters::new(args.payload_offset));
    Ok(sampler)
}

enum DemoPayload {
    Box(BoxPayload),
    Teardrop(TeardropPayload),
}

impl DemoPayload {
    fn build(args: &Args) -> Result<Self> {
        Ok(match args.shape {
            Shape::Box => {
                let size = Vec3::new(args.box_size[0], args.box_size[1], args.box_size[2]);
                Self::Box(BoxPayload::new(size, args.resolution)?)
            }
            Shape::Teardrop => Self::Teardrop(TeardropPayload::new(
                args.height,
                args.radius,
                args.resolution * 2,
                args.resolution * 4,
            )?),
        })
    }

    fn set_pose(&mut self, pose: Pose) {
        match self {
            Self::Box(payload) => payload.set_pose(pose),
            Self::Teardrop(payload) => payload.set_pose(pose),
        }
    }

    fn as_payload(&self) -> &dyn Payload {
        match self {
            Self::Box(payload) => payload,
            Self::Teardrop(payload) => payload,
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let sampler = build_sampler(args)?;
    let mut payload = DemoPayload::build(args)?;

    let tilt = match &args.attitude {
        Some(q) => quat_from_wxyz(q[0], q[1], q[2], q[3]),
        None => {
            Quat::from_euler_angles(args.tilt[0].to_radians(), args.tilt[1].to_radians(), 0.0)
        }
    };
    let mut drone = DronePose::hovering(Vec3::zeros(), args.rotor_speed);
    drone.orientation = tilt;

    println!("=== Downwash Force Sweep ===\n");
    println!(
        "Cube: {}^3 cells, velocity term: {}, payload offset: {}",
        sampler.cube_size(),
        if sampler.has_velocity() { "on" } else { "off" },
        sampler.payload_offset_cm()
    );
    let vertices = sampler.field_vertices(&drone);
    println!(
        "Sampled volume: ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3}) m",
        vertices[0].x, vertices[0].y, vertices[0].z, vertices[7].x, vertices[7].y, vertices[7].z
    );
    println!(
        "Payload: {}, rotor speed {:.1} rad/s\n",
        payload.as_payload().name(),
        args.rotor_speed
    );

    println!(
        "Depth(cm) |     Fx(N)  |     Fy(N)  |     Fz(N)  |   Tx(N·m)  |   Ty(N·m)  |   Tz(N·m)"
    );
    println!(
        "----------|------------|------------|------------|------------|------------|-----------"
    );

    for &depth in &args.depths {
        let depth_m = *Centimeters::new(depth).to_meters();
        let center = drone.position - tilt * Vec3::new(0.0, 0.0, depth_m);
        payload.set_pose(Pose::new(center, tilt));

        let (force, torque) = sampler.generate_forces(&drone, payload.as_payload())?;
        println!(
            "{:>9.1} | {:>10.5} | {:>10.5} | {:>10.5} | {:>10.6} | {:>10.6} | {:>10.6}",
            depth, force.x, force.y, force.z, torque.x, torque.y, torque.z
        );
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
