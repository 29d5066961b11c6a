//! One kernel: the grown point sets on one side of a gap

use super::grids::KernelGrids;
use super::points::KernelPoints;
use super::quality::{evaluate, Evaluation, KernelStats, QualityFlags};
use crate::config::KernelParams;
use crate::gap::CloudGap;
use crate::grid::{Grid, GridPoint};
use rustc_hash::FxHashSet;
use std::fmt::Write as _;
use tracing::debug;

/// Cloud and outside points for one edge of a gap, with their statistics
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    id: Option<usize>,
    center: GridPoint,
    is_far: bool,
    color: Option<f64>,
    points: KernelPoints,
    ok: bool,
    evaluation: Evaluation,
}

impl Kernel {
    /// Grow and evaluate the kernel on one side of `gap`
    ///
    /// The near kernel of a closest gap sits at the radar and is always
    /// usable with zeroed statistics. Any other kernel is evaluated only
    /// when both point lists reach `min_kernel_size`.
    ///
    /// # Arguments
    ///
    /// * `gap` - Gap the kernel borders
    /// * `is_far` - Build on the far side of the gap
    /// * `cloud_mask` - Points of the clump on that side
    /// * `outside_mask` - Background points
    /// * `grids` - Fields read for statistics
    /// * `params` - Size budget and test thresholds
    pub fn build(
        gap: &CloudGap,
        is_far: bool,
        cloud_mask: &Grid,
        outside_mask: &Grid,
        grids: &KernelGrids<'_>,
        params: &KernelParams,
    ) -> Self {
        let center = gap.kernel_seed(is_far);
        let color = gap.color(is_far);

        if center.x == 0 && !is_far {
            let points = KernelPoints::radar_origin(center);
            return Self {
                id: None,
                center,
                is_far,
                color,
                ok: true,
                evaluation: Evaluation {
                    kept: points.cloud().to_vec(),
                    flags: QualityFlags::passing(),
                    stats: KernelStats::zeroed(1),
                },
                points,
            };
        }

        let points = KernelPoints::grow(
            center,
            is_far,
            cloud_mask,
            outside_mask,
            params.max_kernel_size,
        );
        let ok = points.is_big_enough(params.min_kernel_size);
        let evaluation = if ok {
            evaluate(&points, grids, params)
        } else {
            Evaluation {
                stats: KernelStats {
                    n_cloud: points.cloud().len(),
                    n_outside: points.outside().len(),
                    ..KernelStats::default()
                },
                ..Evaluation::default()
            }
        };

        let kernel = Self {
            id: None,
            center,
            is_far,
            color,
            points,
            ok,
            evaluation,
        };
        if params.debug {
            debug!("{}", kernel.report());
        }
        kernel
    }

    /// Assign the kernel id
    pub fn finish(&mut self, id: usize) {
        self.id = Some(id);
    }

    /// Id assigned when the kernel joined a collection
    pub fn id(&self) -> Option<usize> {
        self.id
    }

    pub fn center(&self) -> GridPoint {
        self.center
    }

    /// Beam index
    pub fn y(&self) -> i32 {
        self.center.y
    }

    pub fn is_far(&self) -> bool {
        self.is_far
    }

    /// Color of the seeded clump, `None` at the radar
    pub fn color(&self) -> Option<f64> {
        self.color
    }

    pub fn points(&self) -> &KernelPoints {
        &self.points
    }

    /// True for the single-point kernel at the radar
    pub fn is_radar_origin(&self) -> bool {
        self.center.x == 0 && !self.is_far
    }

    /// Both point lists are big enough
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Usable and every quality test passed
    pub fn is_good(&self) -> bool {
        self.ok && self.evaluation.flags.all_passed()
    }

    pub fn flags(&self) -> &QualityFlags {
        &self.evaluation.flags
    }

    pub fn stats(&self) -> &KernelStats {
        &self.evaluation.stats
    }

    /// Cloud points that survived outlier rejection
    pub fn kept_points(&self) -> &[GridPoint] {
        &self.evaluation.kept
    }

    /// Cloud points with a 4-neighbor outside the cloud set, in cloud order
    pub fn boundary(&self) -> Vec<GridPoint> {
        let set: FxHashSet<GridPoint> = self.points.cloud().iter().copied().collect();
        self.points
            .cloud()
            .iter()
            .copied()
            .filter(|p| p.neighbors4().iter().any(|n| !set.contains(n)))
            .collect()
    }

    /// Multi-line diagnostic report
    pub fn report(&self) -> String {
        let s = self.stats();
        let side = if self.is_far { "far" } else { "near" };
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));

        let mut out = String::new();
        let _ = writeln!(
            out,
            "Kernel {} ({side}) center=({},{}) ok={} good={}",
            self.id.map_or_else(|| "?".to_string(), |id| id.to_string()),
            self.center.x,
            self.center.y,
            self.ok,
            self.is_good()
        );
        let _ = writeln!(
            out,
            "  npt cloud={} outside={} removed={}",
            s.n_cloud, s.n_outside, s.n_removed
        );
        let _ = writeln!(
            out,
            "  s_dbz mean={} outside={} spread={}",
            fmt(s.s_dbz_mean),
            fmt(s.s_dbz_outside_mean),
            fmt(s.s_dbz_spread)
        );
        let _ = writeln!(
            out,
            "  k_dbz mean={} outside={}",
            fmt(s.k_dbz_mean),
            fmt(s.k_dbz_outside_mean)
        );
        let _ = writeln!(
            out,
            "  zdr={} D0={} corr={} rhohv={}",
            fmt(s.zdr),
            fmt(s.d0),
            fmt(s.correlation),
            fmt(s.rhohv_mean)
        );
        let failures = self.flags().failures();
        if failures.is_empty() {
            out.push_str("  all tests passed");
        } else {
            let _ = write!(out, "  failed: {}", failures.join(", "));
        }
        out
    }
}
