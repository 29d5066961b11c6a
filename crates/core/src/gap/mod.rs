//! Beam-wise detection of gaps between clumps
//!
//! Each beam of a labeled clump grid is scanned outward from the radar. The
//! end of every clump run produces up to two [`CloudEdge`]s, one facing the
//! radar and one facing away. The first edge of a beam seeds the "closest"
//! gap (radar to first clump); following edges pair into gaps between
//! consecutive clumps.

mod cloud_gap;
mod cloud_gaps;
mod edge;

pub use cloud_gap::{CloudGap, GapEndpoint};
pub use cloud_gaps::CloudGaps;
pub use edge::{clump_runs, CloudEdge, XRange};
