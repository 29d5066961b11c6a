//! Owner of one grid's region list

use super::{color_to_index, index_to_color, RegionLabeler};
use crate::grid::{Grid, Region};
use tracing::{debug, error};

/// The labeled regions of one grid, valid for one sweep
#[derive(Debug, Clone, Default)]
pub struct ClumpRegions {
    regions: Vec<Region>,
}

impl ClumpRegions {
    /// Wrap an already-labeled region list
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// Label the foreground of `grid`
    pub fn from_grid<L: RegionLabeler + ?Sized>(grid: &Grid, labeler: &L) -> Self {
        let regions = labeler.build_regions(grid);
        debug!("Labeled {} clumps", regions.len());
        Self { regions }
    }

    /// Number of regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True when no regions were found
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Region by index
    pub fn region(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    /// All regions in label order
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Region index for a color, logging when it falls outside the list
    pub fn index_for_color(&self, color: f64) -> Option<usize> {
        match color_to_index(color) {
            Some(i) if i < self.regions.len() => Some(i),
            _ => {
                error!(
                    "Color {} maps outside region list [0,{})",
                    color,
                    self.regions.len()
                );
                None
            }
        }
    }

    /// Paint region `index` with `value`
    ///
    /// Returns false when the index is out of range.
    pub fn paint(&self, index: usize, value: f64, grid: &mut Grid) -> bool {
        let Some(region) = self.regions.get(index) else {
            return false;
        };
        for &p in region {
            grid.set_at(p, value);
        }
        true
    }

    /// Grid shaped like `template` holding each region's color, missing elsewhere
    pub fn to_grid(&self, template: &Grid) -> Grid {
        let mut out = template.blank_like();
        for i in 0..self.regions.len() {
            self.paint(i, index_to_color(i), &mut out);
        }
        out
    }

    /// Grid shaped like `template` set to 1.0 except region points, which are missing
    pub fn inverse_mask(&self, template: &Grid) -> Grid {
        let mut out = Grid::with_value(template.nx(), template.ny(), template.missing(), 1.0);
        for region in &self.regions {
            for &p in region {
                out.set_missing(p.x, p.y);
            }
        }
        out
    }

    /// Grid shaped like `template`, 1.0 on region `index` and missing elsewhere
    pub fn region_mask(&self, index: usize, template: &Grid) -> Option<Grid> {
        let mut out = template.blank_like();
        self.paint(index, 1.0, &mut out).then_some(out)
    }

    /// Erase region `index` from `grid` when it has fewer than `min_npt` points
    ///
    /// Returns true when the region was erased.
    pub fn remove_small_clump(&self, index: usize, min_npt: usize, grid: &mut Grid) -> bool {
        match self.regions.get(index) {
            Some(region) if region.len() < min_npt => {
                for &p in region {
                    grid.set_missing(p.x, p.y);
                }
                true
            }
            _ => false,
        }
    }

    /// Copy of `grid` with every region smaller than `min_npt` erased
    pub fn remove_small_clumps(&self, grid: &Grid, min_npt: usize) -> Grid {
        let mut out = grid.clone();
        let removed = (0..self.regions.len())
            .filter(|&i| self.remove_small_clump(i, min_npt, &mut out))
            .count();
        debug!(
            "Removed {} of {} clumps smaller than {} points",
            removed,
            self.regions.len(),
            min_npt
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clump::ConnectedRegions;
    use crate::grid::GridPoint;

    fn two_clumps() -> Grid {
        // clump A: gates 1..=3 on beam 0, clump B: gate 6 on beams 0 and 1
        Grid::from_fn(8, 2, -1.0, |x, y| {
            let a = y == 0 && (1..=3).contains(&x);
            let b = x == 6;
            (a || b).then_some(5.0)
        })
    }

    #[test]
    fn test_to_grid_paints_colors() {
        let g = two_clumps();
        let regions = ClumpRegions::from_grid(&g, &ConnectedRegions);
        assert_eq!(regions.len(), 2);

        let colored = regions.to_grid(&g);
        assert_eq!(colored.value(2, 0), Some(1.0));
        assert_eq!(colored.value(6, 1), Some(2.0));
        assert_eq!(colored.value(0, 0), None);
    }

    #[test]
    fn test_inverse_mask() {
        let g = two_clumps();
        let regions = ClumpRegions::from_grid(&g, &ConnectedRegions);
        let inv = regions.inverse_mask(&g);
        assert_eq!(inv.value(0, 0), Some(1.0));
        assert_eq!(inv.value(1, 0), None);
        assert_eq!(inv.count_valid(), 16 - 5);
    }

    #[test]
    fn test_remove_small_clumps() {
        let g = two_clumps();
        let regions = ClumpRegions::from_grid(&g, &ConnectedRegions);
        let filtered = regions.remove_small_clumps(&g, 3);
        assert_eq!(filtered.value(2, 0), Some(5.0));
        assert_eq!(filtered.value(6, 0), None);
        assert_eq!(filtered.value(6, 1), None);
    }

    #[test]
    fn test_region_mask_and_color_lookup() {
        let g = two_clumps();
        let regions = ClumpRegions::from_grid(&g, &ConnectedRegions);
        let mask = regions.region_mask(1, &g).unwrap();
        assert_eq!(mask.count_valid(), 2);
        assert_eq!(mask.value_at(GridPoint::new(6, 0)), Some(1.0));

        assert_eq!(regions.index_for_color(2.0), Some(1));
        assert_eq!(regions.index_for_color(3.0), None);
        assert!(regions.region_mask(5, &g).is_none());
    }

    #[test]
    fn test_relabeling_is_stable() {
        let g = two_clumps();
        let first = ClumpRegions::from_grid(&g, &ConnectedRegions);
        let relabeled = ClumpRegions::from_grid(&first.to_grid(&g), &ConnectedRegions);

        let mut a: Vec<Vec<GridPoint>> = first.regions().to_vec();
        let mut b: Vec<Vec<GridPoint>> = relabeled.regions().to_vec();
        for r in a.iter_mut().chain(b.iter_mut()) {
            r.sort();
        }
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }
}
