//! Algorithm parameters
//!
//! All thresholds consumed by the clump/gap/kernel pipeline. Parameters are
//! plain serde structs so they can be loaded from JSON; every field has a
//! default so partial files are accepted.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Tolerance when matching a numeric particle-ID code
pub const PID_TOLERANCE: f64 = 0.33;

/// Errors raised while loading or validating parameters
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read parameter file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse parameters: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A set of particle-ID codes, matched with [`PID_TOLERANCE`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PidCategories(Vec<f64>);

impl PidCategories {
    /// Create from a list of numeric codes
    pub fn new(codes: Vec<f64>) -> Self {
        Self(codes)
    }

    /// The configured codes
    pub fn codes(&self) -> &[f64] {
        &self.0
    }

    /// True when `value` is within tolerance of any configured code
    pub fn contains(&self, value: f64) -> bool {
        self.0.iter().any(|&c| (value - c).abs() <= PID_TOLERANCE)
    }
}

/// Thresholds used while building and evaluating one kernel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelParams {
    /// Maximum number of points grown into either point list
    #[serde(default = "default_max_kernel_size")]
    pub max_kernel_size: usize,

    /// Minimum size of both point lists for a kernel to be usable
    #[serde(default = "default_min_kernel_size")]
    pub min_kernel_size: usize,

    /// Outlier rejection stops once the dbz-diff spread is below this
    #[serde(default = "default_dbz_diff_threshold")]
    pub dbz_diff_threshold: f64,

    /// Floor on the linearized mean S-band reflectivity (dBZ)
    #[serde(default = "default_min_mean_s_dbz")]
    pub min_mean_s_dbz: f64,

    /// Floor on kernel minus outside mean S-band reflectivity (dB)
    #[serde(default = "default_min_s_dbz_kernel_non_kernel_diff")]
    pub min_s_dbz_kernel_non_kernel_diff: f64,

    /// Ceiling on max minus min S-band reflectivity in the kernel (dB)
    #[serde(default = "default_max_s_dbz_kernel_diff")]
    pub max_s_dbz_kernel_diff: f64,

    /// Ceiling on the median drop diameter estimate
    #[serde(rename = "max_D0", default = "default_max_d0")]
    pub max_d0: f64,

    /// Floor on the S/K reflectivity correlation
    #[serde(rename = "min_S_K_dbz_correlation", default = "default_min_s_k_dbz_correlation")]
    pub min_s_k_dbz_correlation: f64,

    /// PID codes that count as weather inside a kernel
    #[serde(default = "default_weather_pid")]
    pub weather_pid: PidCategories,

    /// Emit the full per-kernel report at debug level
    #[serde(default)]
    pub debug: bool,
}

/// Full parameter set for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepohParams {
    /// Width in gates of the inside/outside runs recorded at each clump edge
    #[serde(default = "default_leading_edge_depth")]
    pub leading_edge_depth: usize,

    /// Minimum gap width (km)
    #[serde(default = "default_min_km")]
    pub min_km: f64,

    /// Maximum PID-clump penetration at a gap edge (km)
    #[serde(default = "default_max_km_penetration")]
    pub max_km_penetration: f64,

    /// Clumps with fewer points are discarded before gap detection
    #[serde(default = "default_clump_min_npt")]
    pub clump_min_npt: usize,

    /// Bias added to K-band reflectivity (dB)
    #[serde(default)]
    pub k_dbz_offset: f64,

    /// PID codes that form penetration clumps
    #[serde(default = "default_clump_pid")]
    pub clump_pid: PidCategories,

    /// Shortest along-beam path for the clump attenuation products (km)
    #[serde(default = "default_min_attenuation_km")]
    pub min_attenuation_km: f64,

    /// Exponent applied to linear S reflectivity in the summed-Z product
    #[serde(default = "default_sum_z_power")]
    pub sum_z_power: f64,

    /// FIR smoothing coefficients for the humidity product, empty to skip
    #[serde(default)]
    pub fir_coefficients: Vec<f64>,

    /// Kernel thresholds
    #[serde(flatten)]
    pub kernel: KernelParams,
}

fn default_leading_edge_depth() -> usize {
    3
}

fn default_min_km() -> f64 {
    2.0
}

fn default_max_km_penetration() -> f64 {
    1.0
}

fn default_clump_min_npt() -> usize {
    20
}

fn default_min_attenuation_km() -> f64 {
    2.0
}

fn default_sum_z_power() -> f64 {
    1.0
}

fn default_max_kernel_size() -> usize {
    20
}

fn default_min_kernel_size() -> usize {
    5
}

fn default_dbz_diff_threshold() -> f64 {
    5.0
}

fn default_min_mean_s_dbz() -> f64 {
    -25.0
}

fn default_min_s_dbz_kernel_non_kernel_diff() -> f64 {
    10.0
}

fn default_max_s_dbz_kernel_diff() -> f64 {
    20.0
}

fn default_max_d0() -> f64 {
    1.5
}

fn default_min_s_k_dbz_correlation() -> f64 {
    0.5
}

fn default_weather_pid() -> PidCategories {
    PidCategories::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
}

fn default_clump_pid() -> PidCategories {
    PidCategories::new(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0])
}

impl Default for KernelParams {
    fn default() -> Self {
        Self {
            max_kernel_size: default_max_kernel_size(),
            min_kernel_size: default_min_kernel_size(),
            dbz_diff_threshold: default_dbz_diff_threshold(),
            min_mean_s_dbz: default_min_mean_s_dbz(),
            min_s_dbz_kernel_non_kernel_diff: default_min_s_dbz_kernel_non_kernel_diff(),
            max_s_dbz_kernel_diff: default_max_s_dbz_kernel_diff(),
            max_d0: default_max_d0(),
            min_s_k_dbz_correlation: default_min_s_k_dbz_correlation(),
            weather_pid: default_weather_pid(),
            debug: false,
        }
    }
}

impl Default for RepohParams {
    fn default() -> Self {
        Self {
            leading_edge_depth: default_leading_edge_depth(),
            min_km: default_min_km(),
            max_km_penetration: default_max_km_penetration(),
            clump_min_npt: default_clump_min_npt(),
            k_dbz_offset: 0.0,
            clump_pid: default_clump_pid(),
            min_attenuation_km: default_min_attenuation_km(),
            sum_z_power: default_sum_z_power(),
            fir_coefficients: Vec::new(),
            kernel: KernelParams::default(),
        }
    }
}

impl RepohParams {
    /// Load parameters from a JSON file and validate them
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse parameters from a JSON string and validate them
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Check parameter consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.leading_edge_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "leading_edge_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        if i32::try_from(self.leading_edge_depth).is_err() {
            return Err(ConfigError::Invalid {
                field: "leading_edge_depth",
                reason: format!("{} exceeds the gate index range", self.leading_edge_depth),
            });
        }
        if self.min_km < 0.0 {
            return Err(ConfigError::Invalid {
                field: "min_km",
                reason: format!("negative distance {}", self.min_km),
            });
        }
        if self.max_km_penetration < 0.0 {
            return Err(ConfigError::Invalid {
                field: "max_km_penetration",
                reason: format!("negative distance {}", self.max_km_penetration),
            });
        }
        if self.min_attenuation_km < 0.0 {
            return Err(ConfigError::Invalid {
                field: "min_attenuation_km",
                reason: format!("negative distance {}", self.min_attenuation_km),
            });
        }
        if !self.fir_coefficients.is_empty() && self.fir_coefficients.iter().sum::<f64>() == 0.0 {
            return Err(ConfigError::Invalid {
                field: "fir_coefficients",
                reason: "coefficients sum to zero".to_string(),
            });
        }
        let k = &self.kernel;
        if k.min_kernel_size == 0 {
            return Err(ConfigError::Invalid {
                field: "min_kernel_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if k.min_kernel_size > k.max_kernel_size {
            return Err(ConfigError::Invalid {
                field: "max_kernel_size",
                reason: format!(
                    "{} is smaller than min_kernel_size {}",
                    k.max_kernel_size, k.min_kernel_size
                ),
            });
        }
        if k.dbz_diff_threshold <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "dbz_diff_threshold",
                reason: format!("must be positive, got {}", k.dbz_diff_threshold),
            });
        }
        Ok(())
    }

    /// Convert a distance to a whole number of range gates
    ///
    /// Truncates toward zero, so a partial gate never counts.
    pub fn km_to_gates(km: f64, gate_spacing_km: f64) -> usize {
        if gate_spacing_km <= 0.0 || km <= 0.0 {
            return 0;
        }
        (km / gate_spacing_km).floor() as usize
    }
}
