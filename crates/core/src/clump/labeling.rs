//! Binary grid to labeled regions

use crate::grid::{Grid, GridPoint, Region};
use std::collections::VecDeque;

/// Turns a foreground grid (non-missing = foreground) into ordered regions
///
/// Region `i` is later painted with color `i + 1`, so implementations must
/// return regions in a deterministic order for identical input.
pub trait RegionLabeler {
    /// Build the ordered region list for `grid`
    fn build_regions(&self, grid: &Grid) -> Vec<Region>;
}

/// 4-connected flood-fill labeling
///
/// Regions are ordered by their first point in scan order (beam by beam,
/// gate by gate within a beam). Points within a region are listed in
/// breadth-first discovery order from that first point.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectedRegions;

impl RegionLabeler for ConnectedRegions {
    fn build_regions(&self, grid: &Grid) -> Vec<Region> {
        let nx = grid.nx();
        let ny = grid.ny();
        let mut visited = vec![false; nx * ny];
        let mut regions = Vec::new();
        let mut queue = VecDeque::new();

        for y in 0..ny {
            for x in 0..nx {
                let start = y * nx + x;
                if visited[start] || grid.value(x as i32, y as i32).is_none() {
                    continue;
                }
                visited[start] = true;
                queue.push_back(GridPoint::new(x as i32, y as i32));

                let mut region = Vec::new();
                while let Some(p) = queue.pop_front() {
                    region.push(p);
                    for n in p.neighbors4() {
                        if grid.value_at(n).is_none() {
                            continue;
                        }
                        let idx = n.y as usize * nx + n.x as usize;
                        if !visited[idx] {
                            visited[idx] = true;
                            queue.push_back(n);
                        }
                    }
                }
                regions.push(region);
            }
        }
        regions
    }
}
