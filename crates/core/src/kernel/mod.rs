//! Kernels: statistics regions on both sides of a gap
//!
//! Each surviving gap gets a [`KernelPair`]. The near kernel grows from the
//! near clump's last gate back toward the radar and the far kernel grows
//! from the far clump's first gate away from it; each also collects the
//! background points just across the gap. The closest gap's near kernel is
//! the single radar gate. Pairs whose kernels are big enough are numbered
//! and evaluated, and good pairs yield attenuation and humidity.

#[allow(clippy::module_inception)]
mod kernel;
mod grids;
mod kernels;
mod pair;
mod points;
mod quality;
mod template;

pub use grids::KernelGrids;
pub use kernel::Kernel;
pub use kernels::{Kernels, FIRST_KERNEL_ID};
pub use pair::{attenuation_from_means, humidity_from_attenuation, KernelPair};
pub use points::KernelPoints;
pub use quality::{
    evaluate, median_drop_diameter, reject_outliers, Evaluation, KernelStats, OutlierFilter,
    QualityFlags, MIN_PLAUSIBLE_ZDR_DB,
};
pub use template::{Direction, KernelTemplate, TemplateOffset, MOVING_IN, MOVING_OUT, TEMPLATE_LEN};
