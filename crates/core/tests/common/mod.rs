//! Shared fixtures for the scenario tests
#![allow(dead_code)]

use repoh_core::{Grid, SweepInputs};

const MISSING: f64 = Grid::DEFAULT_MISSING;

#[ctor::ctor]
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Owned fields of one synthetic sweep
pub struct Fields {
    pub s_dbz: Grid,
    pub k_dbz: Grid,
    pub s_zdr: Grid,
    pub pid: Grid,
    pub s_noise: Grid,
    pub k_noise: Grid,
    pub s_rhohv: Grid,
}

impl Fields {
    /// Sweep inputs with `s_dbz` doubling as the clump field
    pub fn inputs(&self, vlevel: f64) -> SweepInputs<'_> {
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

/// Fields for clumps given as `(x0, x1, k_loss_db)` spanning every beam
///
/// S reflectivity inside a clump ripples between 20 and 23 dBZ, K
/// reflectivity is S minus the clump's loss, and everything outside the
/// clumps is missing except the noise fields.
pub fn clump_sweep(nx: usize, ny: usize, clumps: &[(usize, usize, f64)]) -> Fields {
    let loss = |x: usize| {
        clumps
            .iter()
            .find(|(x0, x1, _)| (*x0..=*x1).contains(&x))
            .map(|c| c.2)
    };
    let s = |x: usize, y: usize| 20.0 + ((x + y) % 4) as f64;
    Fields {
        s_dbz: Grid::from_fn(nx, ny, MISSING, |x, y| loss(x).map(|_| s(x, y))),
        k_dbz: Grid::from_fn(nx, ny, MISSING, |x, y| loss(x).map(|l| s(x, y) - l)),
        s_zdr: Grid::from_fn(nx, ny, MISSING, |x, _| loss(x).map(|_| 0.4)),
        pid: Grid::from_fn(nx, ny, MISSING, |x, _| loss(x).map(|_| 3.0)),
        s_noise: Grid::with_value(nx, ny, MISSING, -30.0),
        k_noise: Grid::with_value(nx, ny, MISSING, -32.0),
        s_rhohv: Grid::from_fn(nx, ny, MISSING, |x, _| loss(x).map(|_| 0.98)),
    }
}
