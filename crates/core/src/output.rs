//! Per-pair and per-kernel output records
//!
//! The core produces the values; writers decide where they go. Both record
//! types serialize with serde, and [`AsciiRecord`] also renders the
//! fixed-width text line used by the ASCII writer.

use crate::grid::GridPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One line of the ASCII humidity output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AsciiRecord {
    /// Vertical level (elevation angle, degrees)
    pub vlevel: f64,
    /// Beam azimuth (degrees)
    pub azimuth: f64,
    /// Range of the far kernel center (km)
    pub x_far_km: f64,
    /// Range of the near kernel center (km)
    pub x_near_km: f64,
    /// One-way attenuation (dB/km)
    pub attenuation: f64,
    /// Humidity (g/m^3)
    pub humidity: f64,
}

impl fmt::Display for AsciiRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:7.2} {:7.2} {:8.3} {:8.3} {:10.5} {:10.5}",
            self.vlevel, self.azimuth, self.x_far_km, self.x_near_km, self.attenuation, self.humidity
        )
    }
}

/// Boundary of one kernel, keyed by kernel id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelPolygon {
    pub id: usize,
    pub vlevel: f64,
    pub beam: i32,
    pub is_far: bool,
    pub good: bool,
    /// Boundary points in kernel growth order
    pub points: Vec<GridPoint>,
}
