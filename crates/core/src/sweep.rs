//! Per-sweep pipeline
//!
//! Runs the full clump → gap → kernel chain for one 2D sweep:
//!
//! 1. Label weather clumps, drop small ones, relabel and paint them.
//! 2. Label particle-ID clumps and associate them with the weather clumps.
//! 3. Detect gaps per beam, then filter by width and by PID penetration.
//! 4. Build kernel pairs on the surviving gaps and keep the good ones.
//! 5. Derive attenuation, humidity, center points and output records.
//! 6. Compute the along-beam clump products.

use crate::beam::BeamProducts;
use crate::clump::{ClumpAssociate, ClumpRegions, RegionLabeler};
use crate::config::{ConfigError, RepohParams};
use crate::gap::CloudGaps;
use crate::grid::Grid;
use crate::kernel::{KernelGrids, Kernels};
use crate::output::{AsciiRecord, KernelPolygon};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that stop a sweep before any gap is detected
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Field {field} is {nx}x{ny}, expected {expected_nx}x{expected_ny}")]
    ShapeMismatch {
        field: &'static str,
        nx: usize,
        ny: usize,
        expected_nx: usize,
        expected_ny: usize,
    },

    #[error("Gate spacing must be positive, got {0} km")]
    InvalidGateSpacing(f64),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Radar geometry of one sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepGeometry {
    /// Distance between range gates (km)
    pub gate_spacing_km: f64,
    /// Range of gate 0 (km)
    pub first_gate_km: f64,
    /// Azimuth of beam 0 (degrees)
    pub start_az_deg: f64,
    /// Azimuth step between beams (degrees)
    pub delta_az_deg: f64,
}

impl Default for SweepGeometry {
    fn default() -> Self {
        Self {
            gate_spacing_km: 0.25,
            first_gate_km: 0.0,
            start_az_deg: 0.0,
            delta_az_deg: 1.0,
        }
    }
}

impl SweepGeometry {
    /// Range of gate `x` (km)
    pub fn range_km(&self, x: i32) -> f64 {
        self.first_gate_km + f64::from(x) * self.gate_spacing_km
    }

    /// Azimuth of beam `y`, in `[0, 360)`
    pub fn azimuth_deg(&self, y: i32) -> f64 {
        (self.start_az_deg + f64::from(y) * self.delta_az_deg).rem_euclid(360.0)
    }

    /// Whole gates covered by `km`
    pub fn gates(&self, km: f64) -> usize {
        RepohParams::km_to_gates(km, self.gate_spacing_km)
    }
}

/// Input fields of one sweep
///
/// Every field must share the shape of `s_dbz`. The adjusted K field and
/// the S/K difference are derived from `k_dbz` when not supplied.
#[derive(Debug, Clone, Copy)]
pub struct SweepInputs<'a> {
    /// Vertical level (elevation angle, degrees)
    pub vlevel: f64,
    /// Non-missing points form weather clumps
    pub clump_field: &'a Grid,
    pub s_dbz: &'a Grid,
    pub k_dbz: &'a Grid,
    pub s_zdr: &'a Grid,
    pub pid: &'a Grid,
    pub s_noise: &'a Grid,
    pub k_noise: &'a Grid,
    pub s_rhohv: &'a Grid,
    pub k_dbz_adjusted: Option<&'a Grid>,
    pub dbz_diff: Option<&'a Grid>,
}

impl SweepInputs<'_> {
    fn validate(&self) -> Result<(), SweepError> {
        let fields = [
            ("clump_field", Some(self.clump_field)),
            ("k_dbz", Some(self.k_dbz)),
            ("s_zdr", Some(self.s_zdr)),
            ("pid", Some(self.pid)),
            ("s_noise", Some(self.s_noise)),
            ("k_noise", Some(self.k_noise)),
            ("s_rhohv", Some(self.s_rhohv)),
            ("k_dbz_adjusted", self.k_dbz_adjusted),
            ("dbz_diff", self.dbz_diff),
        ];
        for (field, grid) in fields {
            let Some(grid) = grid else {
                continue;
            };
            if !grid.same_shape(self.s_dbz) {
                return Err(SweepError::ShapeMismatch {
                    field,
                    nx: grid.nx(),
                    ny: grid.ny(),
                    expected_nx: self.s_dbz.nx(),
                    expected_ny: self.s_dbz.ny(),
                });
            }
        }
        Ok(())
    }
}

/// Everything one sweep produced
#[derive(Debug, Clone)]
pub struct SweepResult {
    pub vlevel: f64,
    /// Weather clumps after small-clump removal
    pub clumps: ClumpRegions,
    /// Weather clumps painted with their colors
    pub clump_grid: Grid,
    pub pid_clumps: ClumpRegions,
    pub pid_clump_grid: Grid,
    pub associate: ClumpAssociate,
    /// Gaps before filtering
    pub all_gaps: CloudGaps,
    /// Gaps surviving both filters
    pub gaps: CloudGaps,
    pub width_report: Vec<String>,
    pub penetration_report: Vec<String>,
    pub edge_grid: Grid,
    pub outside_grid: Grid,
    /// Every usable pair, good or not
    pub all_kernels: Kernels,
    /// Good pairs only
    pub kernels: Kernels,
    pub center_points: Grid,
    pub attenuation: Grid,
    pub humidity: Grid,
    pub records: Vec<AsciiRecord>,
    pub polygons: Vec<KernelPolygon>,
    /// Along-beam clump products
    pub beam: BeamProducts,
}

/// Single-sweep driver
pub struct Sweep;

impl Sweep {
    /// Run the pipeline on one sweep
    ///
    /// # Arguments
    ///
    /// * `inputs` - Sweep fields
    /// * `params` - Algorithm parameters
    /// * `geometry` - Gate spacing and beam azimuths
    /// * `labeler` - Connected-region labeling used for both clumpings
    pub fn process<L>(
        inputs: &SweepInputs<'_>,
        params: &RepohParams,
        geometry: &SweepGeometry,
        labeler: &L,
    ) -> Result<SweepResult, SweepError>
    where
        L: RegionLabeler + ?Sized,
    {
        params.validate()?;
        if geometry.gate_spacing_km <= 0.0 || !geometry.gate_spacing_km.is_finite() {
            return Err(SweepError::InvalidGateSpacing(geometry.gate_spacing_km));
        }
        inputs.validate()?;

        let raw = ClumpRegions::from_grid(inputs.clump_field, labeler);
        let cleaned = raw.remove_small_clumps(inputs.clump_field, params.clump_min_npt);
        let clumps = ClumpRegions::from_grid(&cleaned, labeler);
        let clump_grid = clumps.to_grid(inputs.clump_field);
        debug!(
            "{} clumps, {} after removing those under {} points",
            raw.len(),
            clumps.len(),
            params.clump_min_npt
        );

        let pid_mask = inputs.pid.masked(|v| params.clump_pid.contains(v));
        let pid_clumps = ClumpRegions::from_grid(&pid_mask, labeler);
        let pid_clump_grid = pid_clumps.to_grid(inputs.pid);
        let associate = ClumpAssociate::new(&clumps, &clump_grid, &pid_clump_grid);

        let all_gaps = CloudGaps::build(&clump_grid, params.leading_edge_depth);
        let mut gaps = all_gaps.clone();
        let width_report = gaps.filter_by_width(geometry.gates(params.min_km));
        let penetration_report = gaps.filter_by_penetration(
            &pid_clump_grid,
            &associate,
            geometry.gates(params.max_km_penetration),
        );

        let outside_mask = clumps.inverse_mask(&clump_grid);

        let derived_k;
        let k_dbz_adjusted = if let Some(g) = inputs.k_dbz_adjusted {
            g
        } else {
            derived_k = inputs.k_dbz.offset_by(params.k_dbz_offset);
            &derived_k
        };
        let derived_diff;
        let dbz_diff = if let Some(g) = inputs.dbz_diff {
            g
        } else {
            derived_diff =
                inputs
                    .s_dbz
                    .difference(k_dbz_adjusted)
                    .ok_or(SweepError::ShapeMismatch {
                        field: "k_dbz_adjusted",
                        nx: k_dbz_adjusted.nx(),
                        ny: k_dbz_adjusted.ny(),
                        expected_nx: inputs.s_dbz.nx(),
                        expected_ny: inputs.s_dbz.ny(),
                    })?;
            &derived_diff
        };

        let grids = KernelGrids {
            s_dbz: inputs.s_dbz,
            k_dbz: inputs.k_dbz,
            s_zdr: inputs.s_zdr,
            pid: inputs.pid,
            s_noise: inputs.s_noise,
            k_noise: inputs.k_noise,
            s_rhohv: inputs.s_rhohv,
            k_dbz_adjusted,
            dbz_diff,
        };

        let all_kernels = Kernels::build(
            &gaps,
            &clumps,
            &clump_grid,
            &outside_mask,
            &grids,
            &params.kernel,
        );
        let kernels = all_kernels.filtered_to_good();

        let dx = geometry.gate_spacing_km;
        let humidity = kernels.humidity_grid(dx, &clump_grid);
        let beam = BeamProducts::compute(&clump_grid, dbz_diff, inputs.s_dbz, &humidity, params, dx);
        let result = SweepResult {
            vlevel: inputs.vlevel,
            edge_grid: gaps.edge_grid(&clump_grid),
            outside_grid: gaps.outside_grid(&clump_grid),
            center_points: kernels.center_points_grid(&clump_grid),
            attenuation: kernels.attenuation_grid(dx, &clump_grid),
            humidity,
            beam,
            records: kernels.ascii_records(inputs.vlevel, geometry),
            polygons: all_kernels.polygons(inputs.vlevel),
            clumps,
            clump_grid,
            pid_clumps,
            pid_clump_grid,
            associate,
            all_gaps,
            gaps,
            width_report,
            penetration_report,
            all_kernels,
            kernels,
        };

        info!(
            "Sweep {:.2}: {} clumps, {} gaps ({} kept), {} kernel pairs, {} good",
            result.vlevel,
            result.clumps.len(),
            result.all_gaps.len(),
            result.gaps.len(),
            result.all_kernels.len(),
            result.kernels.len()
        );
        Ok(result)
    }
}
