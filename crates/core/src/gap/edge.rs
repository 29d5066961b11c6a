//! Clump edges along one beam

use crate::grid::Grid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive range of gate indices on one beam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XRange {
    /// First gate
    pub x0: i32,
    /// Last gate, inclusive
    pub x1: i32,
}

impl XRange {
    /// Create a range
    pub const fn new(x0: i32, x1: i32) -> Self {
        Self { x0, x1 }
    }

    /// Number of gates covered
    pub fn len(&self) -> usize {
        if self.x1 < self.x0 {
            0
        } else {
            (self.x1 - self.x0 + 1) as usize
        }
    }

    /// True when the range covers no gates
    pub fn is_empty(&self) -> bool {
        self.x1 < self.x0
    }

    /// True when `x` lies in the range
    pub fn contains(&self, x: i32) -> bool {
        x >= self.x0 && x <= self.x1
    }

    /// True when the two ranges share a gate
    pub fn overlaps(&self, other: &XRange) -> bool {
        !self.is_empty() && !other.is_empty() && self.x0 <= other.x1 && other.x0 <= self.x1
    }
}

impl fmt::Display for XRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.x0, self.x1)
    }
}

/// One side of a clump run on one beam
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudEdge {
    /// Beam index
    pub y: i32,
    /// Gates just inside the clump at this edge
    pub inside: XRange,
    /// Background gates just outside the clump at this edge
    pub outside: Option<XRange>,
    /// Color of the clump
    pub color: f64,
    /// True when the edge faces the radar
    pub moving_in: bool,
}

impl CloudEdge {
    /// Edges of the clump run `x0..=x1` on beam `y`
    ///
    /// Scans up to `depth` background gates before `x0` and after `x1`,
    /// stopping early at a labeled gate. An edge is produced only for a
    /// non-empty outside run; its inside range is the `min(run, depth)`
    /// gates of the clump anchored at that end. A depth longer than the
    /// beam scans the whole beam.
    pub fn for_run(grid: &Grid, y: i32, x0: i32, x1: i32, color: f64, depth: usize) -> Vec<CloudEdge> {
        let depth = i32::try_from(depth.min(grid.nx())).unwrap_or(i32::MAX);
        let mut edges = Vec::with_capacity(2);

        let mut xb = x0;
        while xb - 1 >= 0 && x0 - (xb - 1) <= depth && grid.is_missing(xb - 1, y) {
            xb -= 1;
        }
        if xb < x0 {
            edges.push(CloudEdge {
                y,
                inside: XRange::new(x0, x1.min(x0.saturating_add(depth - 1))),
                outside: Some(XRange::new(xb, x0 - 1)),
                color,
                moving_in: true,
            });
        }

        let nx = grid.nx() as i32;
        let mut xa = x1;
        while xa + 1 < nx && (xa + 1) - x1 <= depth && grid.is_missing(xa + 1, y) {
            xa += 1;
        }
        if xa > x1 {
            edges.push(CloudEdge {
                y,
                inside: XRange::new(x0.max(x1.saturating_sub(depth - 1)), x1),
                outside: Some(XRange::new(x1 + 1, xa)),
                color,
                moving_in: false,
            });
        }
        edges
    }

    /// All edges on beam `y`, in the order encountered moving away from the radar
    pub fn scan_beam(grid: &Grid, y: i32, depth: usize) -> Vec<CloudEdge> {
        clump_runs(grid, y)
            .into_iter()
            .flat_map(|(run, color)| Self::for_run(grid, y, run.x0, run.x1, color, depth))
            .collect()
    }
}

/// Maximal runs of one color on beam `y`, nearest the radar first
pub fn clump_runs(grid: &Grid, y: i32) -> Vec<(XRange, f64)> {
    let nx = grid.nx() as i32;
    let mut runs = Vec::new();
    let mut run: Option<(i32, f64)> = None;

    for x in 0..nx {
        let v = grid.value(x, y);
        if let Some((start, color)) = run {
            if v == Some(color) {
                continue;
            }
            runs.push((XRange::new(start, x - 1), color));
            run = None;
        }
        if let Some(c) = v {
            run = Some((x, c));
        }
    }
    if let Some((start, color)) = run {
        runs.push((XRange::new(start, nx - 1), color));
    }
    runs
}
