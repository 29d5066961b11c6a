use clap::Parser;
use repoh_core::{
    ConnectedRegions, Grid, RepohParams, Sweep, SweepGeometry, SweepInputs, SweepResult,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const MISSING: f64 = Grid::DEFAULT_MISSING;

/// Runs the humidity pipeline on a synthetic dual-wavelength sweep
#[derive(Parser, Debug)]
#[command(name = "repoh-demo")]
#[command(about = "REPoH humidity retrieval on a synthetic sweep", long_about = None)]
struct Args {
    /// Parameter file (JSON); defaults are used when absent
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Number of beams
    #[arg(short, long, default_value_t = 36)]
    beams: usize,

    /// Number of range gates per beam
    #[arg(short, long, default_value_t = 400)]
    gates: usize,

    /// Gate spacing in km
    #[arg(long, default_value_t = 0.25)]
    gate_spacing: f64,

    /// Number of clumps along each beam
    #[arg(short, long, default_value_t = 4)]
    clumps: usize,

    /// Extra K-band loss per km of range (dB/km)
    #[arg(long, default_value_t = 0.1)]
    attenuation: f64,

    /// Elevation angle in degrees
    #[arg(long, default_value_t = 0.5)]
    vlevel: f64,

    /// Print kernel boundaries as JSON
    #[arg(long)]
    polygons: bool,

    /// Log every kernel report
    #[arg(short, long)]
    debug: bool,
}

/// Owned synthetic fields
struct SyntheticSweep {
    s_dbz: Grid,
    k_dbz: Grid,
    s_zdr: Grid,
    pid: Grid,
    s_noise: Grid,
    k_noise: Grid,
    s_rhohv: Grid,
}

impl SyntheticSweep {
    /// Evenly spaced clumps whose K-band reflectivity falls off with range
    fn new(args: &Args) -> Self {
        let (nx, ny) = (args.gates, args.beams);
        let period = (nx / args.clumps.max(1)).max(4);
        let width = period / 2;
        let inside = |x: usize, y: usize| {
            let offset = (x + period - width / 2) % period;
            // clump edges wobble a little from beam to beam
            let wobble = (y * 7 % 5) / 2;
            x > width / 2 && offset >= wobble && offset < width
        };
        let s = |x: usize, y: usize| 18.0 + ((x * 3 + y) % 7) as f64 * 0.8;
        let k = |x: usize, y: usize| {
            let range_km = x as f64 * args.gate_spacing;
            s(x, y) - 1.0 - 2.0 * args.attenuation * range_km
        };

        Self {
            s_dbz: Grid::from_fn(nx, ny, MISSING, |x, y| inside(x, y).then(|| s(x, y))),
            k_dbz: Grid::from_fn(nx, ny, MISSING, |x, y| inside(x, y).then(|| k(x, y))),
            s_zdr: Grid::from_fn(nx, ny, MISSING, |x, y| inside(x, y).then_some(0.3)),
            pid: Grid::from_fn(nx, ny, MISSING, |x, y| inside(x, y).then_some(2.0)),
            s_noise: Grid::with_value(nx, ny, MISSING, -30.0),
            k_noise: Grid::with_value(nx, ny, MISSING, -33.0),
            s_rhohv: Grid::from_fn(nx, ny, MISSING, |x, y| inside(x, y).then_some(0.98)),
        }
    }

    fn inputs(&self, vlevel: f64) -> SweepInputs<'_> {
        SweepInputs {
            vlevel,
            clump_field: &self.s_dbz,
            s_dbz: &self.s_dbz,
            k_dbz: &self.k_dbz,
            s_zdr: &self.s_zdr,
            pid: &self.pid,
            s_noise: &self.s_noise,
            k_noise: &self.k_noise,
            s_rhohv: &self.s_rhohv,
            k_dbz_adjusted: None,
            dbz_diff: None,
        }
    }
}

fn print_result(result: &SweepResult, geometry: &SweepGeometry, polygons: bool) {
    println!("=== Sweep {:.2} ===", result.vlevel);
    println!(
        "Clumps: {}  PID clumps: {}",
        result.clumps.len(),
        result.pid_clumps.len()
    );
    println!(
        "Gaps: {} detected, {} removed by width, {} removed by penetration",
        result.all_gaps.len(),
        result.width_report.len(),
        result.penetration_report.len()
    );
    println!(
        "Kernel pairs: {} usable, {} good\n",
        result.all_kernels.len(),
        result.kernels.len()
    );

    for line in result.kernels.summary(geometry.gate_spacing_km) {
        println!("{}", line);
    }

    println!("\n  vlevel      az    x_far   x_near  attenuation  humidity");
    for record in &result.records {
        println!("{}", record);
    }

    if polygons {
        match serde_json::to_string_pretty(&result.polygons) {
            Ok(json) => println!("\n{}", json),
            Err(e) => error!("Failed to serialize polygons: {}", e),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut params = match &args.params {
        Some(path) => match RepohParams::load(path) {
            Ok(p) => p,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => RepohParams::default(),
    };
    params.kernel.debug |= args.debug;

    let geometry = SweepGeometry {
        gate_spacing_km: args.gate_spacing,
        delta_az_deg: 360.0 / args.beams.max(1) as f64,
        ..SweepGeometry::default()
    };

    info!(
        "Synthetic sweep: {} beams x {} gates, {} clumps per beam",
        args.beams, args.gates, args.clumps
    );
    let sweep = SyntheticSweep::new(&args);

    match Sweep::process(&sweep.inputs(args.vlevel), &params, &geometry, &ConnectedRegions) {
        Ok(result) => {
            print_result(&result, &geometry, args.polygons);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Sweep failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
