//! Near and far kernels bracketing one gap

use super::grids::KernelGrids;
use super::kernel::Kernel;
use crate::config::KernelParams;
use crate::gap::CloudGap;
use crate::grid::Grid;
use tracing::{error, warn};

/// Humidity (g/m^3) from one-way attenuation (dB/km)
pub fn humidity_from_attenuation(attenuation: f64) -> f64 {
    let a = attenuation;
    201.40 * a.powi(3) - 209.60 * a.powi(2) + 120.55 * a - 2.25
}

/// One-way attenuation between two kernels
///
/// # Arguments
///
/// * `near_db` - Mean K-band reflectivity of the near kernel (dBZ)
/// * `far_db` - Mean K-band reflectivity of the far kernel (dBZ)
/// * `path_km` - Distance between the kernels
///
/// # Returns
///
/// `None` for a non-positive path
pub fn attenuation_from_means(near_db: f64, far_db: f64, path_km: f64) -> Option<f64> {
    (path_km > 0.0).then(|| (far_db - near_db) / (2.0 * path_km))
}

/// Kernels on both sides of one gap
#[derive(Debug, Clone, PartialEq)]
pub struct KernelPair {
    gap: CloudGap,
    near: Kernel,
    far: Kernel,
}

impl KernelPair {
    /// Build both kernels of a gap
    ///
    /// # Arguments
    ///
    /// * `gap` - The gap
    /// * `near_mask` - Points of the near clump (all missing for a closest gap)
    /// * `far_mask` - Points of the far clump
    /// * `outside_mask` - Background points
    /// * `grids` - Fields read for statistics
    /// * `params` - Kernel thresholds
    pub fn build(
        gap: &CloudGap,
        near_mask: &Grid,
        far_mask: &Grid,
        outside_mask: &Grid,
        grids: &KernelGrids<'_>,
        params: &KernelParams,
    ) -> Self {
        Self {
            gap: *gap,
            near: Kernel::build(gap, false, near_mask, outside_mask, grids, params),
            far: Kernel::build(gap, true, far_mask, outside_mask, grids, params),
        }
    }

    /// Assign kernel ids
    pub fn finish(&mut self, near_id: usize, far_id: usize) {
        self.near.finish(near_id);
        self.far.finish(far_id);
    }

    pub fn gap(&self) -> &CloudGap {
        &self.gap
    }

    pub fn near(&self) -> &Kernel {
        &self.near
    }

    pub fn far(&self) -> &Kernel {
        &self.far
    }

    /// Both kernels are big enough
    pub fn is_ok(&self) -> bool {
        self.near.is_ok() && self.far.is_ok()
    }

    /// Both kernels passed every test
    pub fn is_good(&self) -> bool {
        self.near.is_good() && self.far.is_good()
    }

    /// Shared beam index, the near kernel's when the two disagree
    pub fn y(&self) -> i32 {
        let (yn, yf) = (self.near.y(), self.far.y());
        if yn != yf {
            error!("Kernel pair spans beams {} and {}, using {}", yn, yf, yn);
        }
        yn
    }

    /// Inclusive gate span between the kernel centers
    pub fn x_span(&self) -> (i32, i32) {
        let (a, b) = (self.near.center().x, self.far.center().x);
        (a.min(b), a.max(b))
    }

    /// Gates between the kernel centers
    pub fn path_gates(&self) -> i32 {
        (self.far.center().x - self.near.center().x).abs()
    }

    /// One-way attenuation (dB/km) for gate spacing `dx_km`
    pub fn attenuation(&self, dx_km: f64) -> Option<f64> {
        let near = self.near.stats().k_dbz_mean?;
        let far = self.far.stats().k_dbz_mean?;
        let path_km = f64::from(self.path_gates()) * dx_km;
        let a = attenuation_from_means(near, far, path_km);
        if a.is_none() {
            warn!(
                "Kernel pair on beam {} has zero path length, no attenuation",
                self.y()
            );
        }
        a
    }

    /// Humidity (g/m^3) for gate spacing `dx_km`
    pub fn humidity(&self, dx_km: f64) -> Option<f64> {
        self.attenuation(dx_km).map(humidity_from_attenuation)
    }
}
