//! Kernel statistics and pass/fail tests
//!
//! Cloud points are first thinned by iterative outlier rejection on the
//! S/K difference field. All remaining statistics are taken over the
//! surviving points; outside statistics use every outside point.

use super::grids::KernelGrids;
use super::points::KernelPoints;
use crate::config::KernelParams;
use crate::grid::{Grid, GridPoint};
use crate::stats::{linear_mean, linearized_mean_db, mean, min_max, pearson};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mean ZDR below this is physically implausible for rain (dB)
pub const MIN_PLAUSIBLE_ZDR_DB: f64 = -0.2;

/// Result of outlier rejection
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierFilter {
    /// Points that survived, in original order
    pub kept: Vec<GridPoint>,
    /// Points dropped as outliers
    pub removed: usize,
    /// Points skipped for lack of `dbz_diff` data
    pub ignored: usize,
    /// True when the spread fell below the threshold
    pub converged: bool,
    /// True when at least the minimum number of points remain
    pub passed: bool,
}

/// Drop extreme `dbz_diff` points until their spread falls below `threshold`
///
/// Points without `dbz_diff` data are counted and ignored. Each round removes the
/// extreme farther from the mean (the maximum on a tie). Rejection stops
/// without converging once only `min_points` remain.
pub fn reject_outliers(
    points: &[GridPoint],
    dbz_diff: &Grid,
    threshold: f64,
    min_points: usize,
) -> OutlierFilter {
    let mut samples: Vec<(GridPoint, f64)> = points
        .iter()
        .filter_map(|&p| dbz_diff.value_at(p).map(|v| (p, v)))
        .collect();
    let ignored = points.len() - samples.len();
    if ignored > 0 {
        debug!(
            "Outlier rejection ignoring {ignored} of {} points without dbz_diff",
            points.len()
        );
    }
    let mut removed = 0;
    let mut converged = false;

    loop {
        let values: Vec<f64> = samples.iter().map(|s| s.1).collect();
        let (Some(((imin, vmin), (imax, vmax))), Some(m)) = (min_max(&values), mean(&values))
        else {
            converged = true;
            break;
        };
        if values.len() < 2 || vmax - vmin < threshold {
            converged = true;
            break;
        }
        if values.len() <= min_points {
            break;
        }
        let victim = if (vmin - m).abs() > (vmax - m).abs() {
            imin
        } else {
            imax
        };
        samples.remove(victim);
        removed += 1;
    }

    OutlierFilter {
        passed: samples.len() >= min_points,
        converged,
        kept: samples.into_iter().map(|s| s.0).collect(),
        removed,
        ignored,
    }
}

/// Outcome of each quality test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityFlags {
    pub outliers: bool,
    pub pid: bool,
    pub mean_s_dbz: bool,
    pub contrast: bool,
    pub spread: bool,
    pub zdr: bool,
    pub d0: bool,
    pub correlation: bool,
}

impl QualityFlags {
    /// Every test passed
    pub const fn passing() -> Self {
        Self {
            outliers: true,
            pid: true,
            mean_s_dbz: true,
            contrast: true,
            spread: true,
            zdr: true,
            d0: true,
            correlation: true,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failures().is_empty()
    }

    /// Names of failed tests
    pub fn failures(&self) -> Vec<&'static str> {
        [
            ("outliers", self.outliers),
            ("pid", self.pid),
            ("mean_s_dbz", self.mean_s_dbz),
            ("contrast", self.contrast),
            ("spread", self.spread),
            ("zdr", self.zdr),
            ("d0", self.d0),
            ("correlation", self.correlation),
        ]
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(name, _)| name)
        .collect()
    }
}

/// Derived statistics of one kernel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KernelStats {
    pub n_cloud: usize,
    pub n_outside: usize,
    pub n_removed: usize,
    /// Linearized mean S reflectivity (dBZ)
    pub s_dbz_mean: Option<f64>,
    /// Linearized mean outside S reflectivity, noise where missing (dBZ)
    pub s_dbz_outside_mean: Option<f64>,
    /// Max minus min S reflectivity (dB)
    pub s_dbz_spread: Option<f64>,
    /// Linearized mean adjusted K reflectivity (dBZ)
    pub k_dbz_mean: Option<f64>,
    /// Linearized mean outside adjusted K reflectivity, noise where missing (dBZ)
    pub k_dbz_outside_mean: Option<f64>,
    /// Linearized mean ZDR floored at zero (dB)
    pub zdr: Option<f64>,
    pub d0: Option<f64>,
    /// Pearson correlation of S and adjusted K reflectivity
    pub correlation: Option<f64>,
    pub rhohv_mean: Option<f64>,
}

impl KernelStats {
    /// Statistics of the radar-origin kernel
    pub fn zeroed(n_cloud: usize) -> Self {
        Self {
            n_cloud,
            n_outside: 0,
            n_removed: 0,
            s_dbz_mean: Some(0.0),
            s_dbz_outside_mean: Some(0.0),
            s_dbz_spread: Some(0.0),
            k_dbz_mean: Some(0.0),
            k_dbz_outside_mean: Some(0.0),
            zdr: Some(0.0),
            d0: Some(0.0),
            correlation: Some(0.0),
            rhohv_mean: Some(0.0),
        }
    }
}

/// Median drop diameter from ZDR (dB, floored) and linear reflectivity
pub fn median_drop_diameter(zdr: f64, z_linear: f64) -> f64 {
    1.81 * (zdr / z_linear.powf(0.37)).powf(0.486) * z_linear.powf(0.136)
}

/// Full evaluation of one kernel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    /// Cloud points left after outlier rejection
    pub kept: Vec<GridPoint>,
    pub flags: QualityFlags,
    pub stats: KernelStats,
}

fn values_at(points: &[GridPoint], grid: &Grid) -> Vec<f64> {
    points.iter().filter_map(|&p| grid.value_at(p)).collect()
}

fn values_with_fallback(points: &[GridPoint], grid: &Grid, fallback: &Grid) -> Vec<f64> {
    points
        .iter()
        .filter_map(|&p| grid.value_at(p).or_else(|| fallback.value_at(p)))
        .collect()
}

/// Run outlier rejection and every quality test
pub fn evaluate(points: &KernelPoints, grids: &KernelGrids<'_>, params: &KernelParams) -> Evaluation {
    let filter = reject_outliers(
        points.cloud(),
        grids.dbz_diff,
        params.dbz_diff_threshold,
        params.min_kernel_size,
    );
    let kept = filter.kept;
    let mut flags = QualityFlags {
        outliers: filter.passed,
        ..QualityFlags::default()
    };
    let mut stats = KernelStats {
        n_cloud: points.cloud().len(),
        n_outside: points.outside().len(),
        n_removed: filter.removed,
        ..KernelStats::default()
    };

    flags.pid = values_at(&kept, grids.pid)
        .into_iter()
        .all(|v| params.weather_pid.contains(v));

    let s = values_at(&kept, grids.s_dbz);
    stats.s_dbz_mean = linearized_mean_db(&s);
    flags.mean_s_dbz = stats.s_dbz_mean.is_some_and(|m| m > params.min_mean_s_dbz);

    stats.s_dbz_outside_mean =
        linearized_mean_db(&values_with_fallback(points.outside(), grids.s_dbz, grids.s_noise));
    flags.contrast = match (stats.s_dbz_mean, stats.s_dbz_outside_mean) {
        (Some(inside), Some(outside)) => inside - outside > params.min_s_dbz_kernel_non_kernel_diff,
        _ => false,
    };

    stats.s_dbz_spread = min_max(&s).map(|((_, lo), (_, hi))| hi - lo);
    flags.spread = stats
        .s_dbz_spread
        .is_some_and(|d| d <= params.max_s_dbz_kernel_diff);

    let zdr_db = linearized_mean_db(&values_at(&kept, grids.s_zdr));
    flags.zdr = zdr_db.is_some_and(|z| z >= MIN_PLAUSIBLE_ZDR_DB);
    stats.zdr = zdr_db.map(|z| z.max(0.0));

    stats.d0 = match (linear_mean(&s), stats.zdr) {
        (Some(z), Some(zdr)) if z != 0.0 => Some(median_drop_diameter(zdr, z)),
        _ => None,
    };
    flags.d0 = stats.d0.is_some_and(|d| d <= params.max_d0);

    stats.k_dbz_mean = linearized_mean_db(&values_at(&kept, grids.k_dbz_adjusted));
    stats.k_dbz_outside_mean = linearized_mean_db(&values_with_fallback(
        points.outside(),
        grids.k_dbz_adjusted,
        grids.k_noise,
    ));

    let pairs: Vec<(f64, f64)> = kept
        .iter()
        .filter_map(|&p| Some((grids.s_dbz.value_at(p)?, grids.k_dbz_adjusted.value_at(p)?)))
        .collect();
    stats.correlation = pearson(&pairs);
    flags.correlation = stats
        .correlation
        .is_some_and(|c| c > params.min_s_k_dbz_correlation);

    stats.rhohv_mean = mean(&values_at(&kept, grids.s_rhohv));

    Evaluation { kept, flags, stats }
}
