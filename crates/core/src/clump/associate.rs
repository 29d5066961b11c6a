//! Cross-reference between two clumpings of the same sweep
//!
//! Each primary (weather) clump records which secondary (particle-ID) clumps
//! its points overlap. Gap filtering then asks how far those secondary clumps
//! reach into the primary clump from the gap side.

use super::{color_key, index_to_color, ClumpRegions};
use crate::gap::{CloudGap, GapEndpoint};
use crate::grid::Grid;
use rustc_hash::{FxHashMap, FxHashSet};

/// One primary color and the secondary colors it overlaps
#[derive(Debug, Clone)]
pub struct ClumpAssociation {
    color: f64,
    secondary: Vec<f64>,
    keys: FxHashSet<i64>,
}

impl ClumpAssociation {
    fn new(color: f64) -> Self {
        Self {
            color,
            secondary: Vec::new(),
            keys: FxHashSet::default(),
        }
    }

    fn add(&mut self, color: f64) {
        if self.keys.insert(color_key(color)) {
            self.secondary.push(color);
        }
    }

    /// The primary color
    pub fn color(&self) -> f64 {
        self.color
    }

    /// Secondary colors in order of first discovery, no duplicates
    pub fn secondary(&self) -> &[f64] {
        &self.secondary
    }

    /// True when `color` is one of the associated secondary colors
    pub fn contains(&self, color: f64) -> bool {
        self.keys.contains(&color_key(color))
    }
}

/// Association table for every primary clump of one sweep
#[derive(Debug, Clone, Default)]
pub struct ClumpAssociate {
    entries: Vec<ClumpAssociation>,
    by_color: FxHashMap<i64, usize>,
}

impl ClumpAssociate {
    /// Build the table
    ///
    /// # Arguments
    ///
    /// * `primary` - Regions of the primary clumping
    /// * `primary_grid` - The primary clumping painted with colors
    /// * `secondary_grid` - The secondary clumping painted with colors
    pub fn new(primary: &ClumpRegions, primary_grid: &Grid, secondary_grid: &Grid) -> Self {
        let mut table = Self::default();
        for (i, region) in primary.regions().iter().enumerate() {
            let color = region
                .iter()
                .find_map(|&p| primary_grid.value_at(p))
                .unwrap_or_else(|| index_to_color(i));

            let mut entry = ClumpAssociation::new(color);
            for &p in region {
                if let Some(s) = secondary_grid.value_at(p) {
                    entry.add(s);
                }
            }
            table.by_color.insert(color_key(color), table.entries.len());
            table.entries.push(entry);
        }
        table
    }

    /// Number of primary clumps in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Association for a primary color
    pub fn association(&self, color: f64) -> Option<&ClumpAssociation> {
        self.by_color
            .get(&color_key(color))
            .map(|&i| &self.entries[i])
    }

    /// Secondary colors touching primary color `color`, empty when unknown
    pub fn secondary_colors(&self, color: f64) -> &[f64] {
        self.association(color).map_or(&[], ClumpAssociation::secondary)
    }

    /// Depth in gates that associated secondary clumps reach into each side of a gap
    ///
    /// The gap's endpoint on each side is its last gap pixel. Counting starts
    /// one pixel beyond it, on the clump's boundary gate, and walks away from
    /// the gap, stopping at the first pixel not labeled with an associated
    /// secondary color or at the grid edge.
    ///
    /// # Returns
    ///
    /// `(near, far)` penetration counts
    pub fn penetration(&self, gap: &CloudGap, secondary_grid: &Grid) -> (usize, usize) {
        let near = self.endpoint_penetration(&gap.near, gap.y, -1, secondary_grid);
        let far = self.endpoint_penetration(&gap.far, gap.y, 1, secondary_grid);
        (near, far)
    }

    fn endpoint_penetration(
        &self,
        endpoint: &GapEndpoint,
        y: i32,
        step: i32,
        secondary_grid: &Grid,
    ) -> usize {
        let Some(color) = endpoint.color else {
            return 0;
        };
        let Some(assoc) = self.association(color) else {
            return 0;
        };

        let mut x = if step < 0 {
            endpoint.inner.x1
        } else {
            endpoint.inner.x0
        };
        let mut count = 0;
        while let Some(v) = secondary_grid.value(x, y) {
            if !assoc.contains(v) {
                break;
            }
            count += 1;
            x += step;
        }
        count
    }
}
