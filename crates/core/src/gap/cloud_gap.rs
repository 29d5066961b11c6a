//! A gap between the radar and a clump, or between two clumps

use super::edge::{CloudEdge, XRange};
use crate::grid::GridPoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

/// One side of a gap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapEndpoint {
    /// Clump gates adjacent to the gap
    pub inner: XRange,
    /// Background gates adjacent to the clump, `None` for the radar sentinel
    pub outer: Option<XRange>,
    /// Clump color, `None` for the radar sentinel
    pub color: Option<f64>,
}

impl GapEndpoint {
    /// The radar-side sentinel of a closest gap
    pub const fn radar() -> Self {
        Self {
            inner: XRange::new(0, 0),
            outer: None,
            color: None,
        }
    }

    /// True for the radar sentinel
    pub fn is_radar(&self) -> bool {
        self.outer.is_none()
    }
}

impl From<&CloudEdge> for GapEndpoint {
    fn from(edge: &CloudEdge) -> Self {
        Self {
            inner: edge.inside,
            outer: edge.outside,
            color: Some(edge.color),
        }
    }
}

/// The beam-local interval between two clumps (or the radar and a clump)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudGap {
    /// Beam index
    pub y: i32,
    /// Endpoint closer to the radar
    pub near: GapEndpoint,
    /// Endpoint farther from the radar
    pub far: GapEndpoint,
}

impl CloudGap {
    /// Gap between the radar and the clump whose radar-facing edge is `edge`
    pub fn closest(edge: &CloudEdge) -> Self {
        Self {
            y: edge.y,
            near: GapEndpoint::radar(),
            far: GapEndpoint::from(edge),
        }
    }

    /// Gap bounded by the away-facing edge `near` and the radar-facing edge `far`
    ///
    /// Edges on different beams are logged and the near edge's beam is kept.
    pub fn between(near: &CloudEdge, far: &CloudEdge) -> Self {
        if near.y != far.y {
            error!(
                "Pairing edges on different beams {} and {}, using {}",
                near.y, far.y, near.y
            );
        }
        Self {
            y: near.y,
            near: GapEndpoint::from(near),
            far: GapEndpoint::from(far),
        }
    }

    /// True for the radar-to-first-clump gap
    pub fn is_closest(&self) -> bool {
        self.near.is_radar()
    }

    /// Gates between the near clump's last gate and the far clump's first gate
    ///
    /// For a closest gap this is the first gate of the first clump.
    pub fn width(&self) -> i32 {
        self.far.inner.x0 - self.near.inner.x1
    }

    /// Endpoint on the requested side
    pub fn endpoint(&self, is_far: bool) -> &GapEndpoint {
        if is_far {
            &self.far
        } else {
            &self.near
        }
    }

    /// Clump color on the requested side
    pub fn color(&self, is_far: bool) -> Option<f64> {
        self.endpoint(is_far).color
    }

    /// Kernel seed: the clump gate adjacent to the gap on the requested side
    pub fn kernel_seed(&self, is_far: bool) -> GridPoint {
        if is_far {
            GridPoint::new(self.far.inner.x0, self.y)
        } else {
            GridPoint::new(self.near.inner.x1, self.y)
        }
    }

    /// Every range this gap claims on its beam
    pub fn ranges(&self) -> Vec<XRange> {
        let mut out = Vec::with_capacity(4);
        for e in [&self.near, &self.far] {
            if e.is_radar() {
                continue;
            }
            out.push(e.inner);
            if let Some(o) = e.outer {
                out.push(o);
            }
        }
        out
    }
}

impl fmt::Display for CloudGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_closest() {
            write!(f, "y={} radar -> {}", self.y, self.far.inner)
        } else {
            write!(
                f,
                "y={} {}{} -> {}{}",
                self.y,
                self.near.inner,
                self.near.outer.map_or_else(String::new, |o| format!("+{o}")),
                self.far.outer.map_or_else(String::new, |o| format!("{o}+")),
                self.far.inner
            )
        }
    }
}
