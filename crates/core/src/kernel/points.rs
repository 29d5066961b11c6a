//! Cloud and outside point lists of one kernel

use super::template::{Direction, KernelTemplate};
use crate::grid::{Grid, GridPoint};
use serde::{Deserialize, Serialize};

/// Points grown for one gap edge
///
/// Both lists only grow during construction and are frozen afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KernelPoints {
    cloud: Vec<GridPoint>,
    outside: Vec<GridPoint>,
}

impl KernelPoints {
    /// Grow both lists from a seed at a gap edge
    ///
    /// Cloud points grow from `seed` into the clump, outside points grow
    /// the other way starting one gate past the seed.
    ///
    /// # Arguments
    ///
    /// * `seed` - Clump gate adjacent to the gap
    /// * `is_far` - True when the clump lies beyond the gap
    /// * `cloud_mask` - Points of the seeded clump
    /// * `outside_mask` - Background points
    /// * `max_points` - Budget for each list
    pub fn grow(
        seed: GridPoint,
        is_far: bool,
        cloud_mask: &Grid,
        outside_mask: &Grid,
        max_points: usize,
    ) -> Self {
        let into_clump = if is_far {
            Direction::MovingOut
        } else {
            Direction::MovingIn
        };
        let into_gap = into_clump.mirrored();

        let cloud = KernelTemplate::new(into_clump).grow(seed, cloud_mask, max_points);
        let outside_seed = seed.offset(into_gap.step(), 0);
        let outside = KernelTemplate::new(into_gap).grow(outside_seed, outside_mask, max_points);
        Self { cloud, outside }
    }

    /// The single-point kernel at the radar
    pub fn radar_origin(seed: GridPoint) -> Self {
        Self {
            cloud: vec![seed],
            outside: Vec::new(),
        }
    }

    pub fn cloud(&self) -> &[GridPoint] {
        &self.cloud
    }

    pub fn outside(&self) -> &[GridPoint] {
        &self.outside
    }

    /// True when both lists hold at least `min_points`
    pub fn is_big_enough(&self, min_points: usize) -> bool {
        self.cloud.len() >= min_points && self.outside.len() >= min_points
    }
}
