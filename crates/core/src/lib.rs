//! REPoH Core Library
//!
//! Humidity retrieval from dual-wavelength (S/K band) weather radar. Along
//! each beam, gaps between precipitation clumps are bracketed by a pair of
//! kernels grown just inside the clump edges. The drop in K-band reflectivity
//! from the near kernel to the far kernel gives the one-way attenuation over
//! the gap, and attenuation maps to humidity.
//!
//! ## Pipeline
//!
//! - [`clump`]: connected-region labeling, painting and PID association
//! - [`gap`]: beam-wise clump edges and the gaps between them
//! - [`kernel`]: template growth, quality tests, pairs and collections
//! - [`beam`]: along-beam attenuation, summed Z and FIR products per clump run
//! - [`sweep`] / [`volume`]: the per-sweep driver and its parallel wrapper

pub mod beam;
pub mod clump;
pub mod config;
pub mod gap;
pub mod grid;
pub mod kernel;
pub mod output;
pub mod stats;
pub mod sweep;
pub mod volume;

pub use beam::BeamProducts;
pub use clump::{ClumpAssociate, ClumpRegions, ConnectedRegions, RegionLabeler};
pub use config::{ConfigError, KernelParams, PidCategories, RepohParams};
pub use gap::{CloudEdge, CloudGap, CloudGaps};
pub use grid::{Grid, GridPoint, Region};
pub use kernel::{Kernel, KernelGrids, KernelPair, KernelTemplate, Kernels};
pub use output::{AsciiRecord, KernelPolygon};
pub use sweep::{Sweep, SweepError, SweepGeometry, SweepInputs, SweepResult};
pub use volume::Volume;
