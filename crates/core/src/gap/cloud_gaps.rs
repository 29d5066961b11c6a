//! All gaps of one sweep, with the size and penetration filters

use super::cloud_gap::CloudGap;
use super::edge::CloudEdge;
use crate::clump::ClumpAssociate;
use crate::grid::Grid;
use tracing::{debug, warn};

/// Ordered gap list for one sweep (beam order, then distance from radar)
#[derive(Debug, Clone, Default)]
pub struct CloudGaps {
    gaps: Vec<CloudGap>,
}

impl CloudGaps {
    /// Detect gaps on every beam of a labeled clump grid
    ///
    /// # Arguments
    ///
    /// * `clumps` - Clump grid painted with region colors
    /// * `depth` - Leading edge depth in gates
    pub fn build(clumps: &Grid, depth: usize) -> Self {
        let mut gaps = Self::default();
        for y in 0..clumps.ny() {
            gaps.add_gaps(y as i32, clumps, depth);
        }
        debug!("Detected {} gaps over {} beams", gaps.len(), clumps.ny());
        gaps
    }

    /// Detect and append the gaps on beam `y`
    ///
    /// A radar-facing first edge seeds the closest gap and later edges pair
    /// as `(edge[2k-1], edge[2k])`. When the first clump touches the radar
    /// there is no closest gap and pairing starts at the first edge. A
    /// trailing edge without a partner is dropped.
    pub fn add_gaps(&mut self, y: i32, clumps: &Grid, depth: usize) {
        let edges = CloudEdge::scan_beam(clumps, y, depth);
        let Some(first) = edges.first() else {
            return;
        };

        let mut k = if first.moving_in {
            self.gaps.push(CloudGap::closest(first));
            1
        } else {
            warn!("Beam {}: first clump touches the radar, no closest gap", y);
            0
        };
        while k + 1 < edges.len() {
            let near = &edges[k];
            let far = &edges[k + 1];
            if near.moving_in || !far.moving_in {
                warn!(
                    "Beam {}: edges {} and {} do not bound a gap (colors {} and {})",
                    y,
                    k,
                    k + 1,
                    near.color,
                    far.color
                );
            } else {
                self.gaps.push(CloudGap::between(near, far));
            }
            k += 2;
        }
        if k < edges.len() {
            debug!("Beam {}: trailing edge {} left unpaired", y, k);
        }
    }

    /// Number of gaps
    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    /// True when no gaps remain
    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    /// Gap by index
    pub fn get(&self, index: usize) -> Option<&CloudGap> {
        self.gaps.get(index)
    }

    /// Iterate gaps in detection order
    pub fn iter(&self) -> std::slice::Iter<'_, CloudGap> {
        self.gaps.iter()
    }

    /// Drop gaps between clumps narrower than `min_gridpt` gates
    ///
    /// Closest gaps are always kept: their width is the range of the first
    /// clump, not a separation between clumps.
    ///
    /// # Returns
    ///
    /// One report line per removed gap
    pub fn filter_by_width(&mut self, min_gridpt: usize) -> Vec<String> {
        let min = i32::try_from(min_gridpt).unwrap_or(i32::MAX);
        let mut report = Vec::new();
        self.gaps.retain(|g| {
            let keep = g.is_closest() || g.width() >= min;
            if !keep {
                let line = format!("{g} removed: width {} < {}", g.width(), min);
                debug!("{}", line);
                report.push(line);
            }
            keep
        });
        report
    }

    /// Drop gaps where an associated PID clump reaches more than `max_gridpt`
    /// gates into either bounding clump
    ///
    /// # Returns
    ///
    /// One report line per removed gap
    pub fn filter_by_penetration(
        &mut self,
        pid_clumps: &Grid,
        associate: &ClumpAssociate,
        max_gridpt: usize,
    ) -> Vec<String> {
        let mut report = Vec::new();
        self.gaps.retain(|g| {
            let (near, far) = associate.penetration(g, pid_clumps);
            let keep = near <= max_gridpt && far <= max_gridpt;
            if !keep {
                let line = format!(
                    "{g} removed: penetration near={near} far={far} > {max_gridpt}"
                );
                debug!("{}", line);
                report.push(line);
            }
            keep
        });
        report
    }

    /// 1.0 at every inner gate of every clump-side endpoint, missing elsewhere
    pub fn edge_grid(&self, template: &Grid) -> Grid {
        let mut out = template.blank_like();
        for g in &self.gaps {
            for e in [&g.near, &g.far] {
                if e.is_radar() {
                    continue;
                }
                for x in e.inner.x0..=e.inner.x1 {
                    out.set(x, g.y, 1.0);
                }
            }
        }
        out
    }

    /// 1.0 at every outer gate of every endpoint, missing elsewhere
    pub fn outside_grid(&self, template: &Grid) -> Grid {
        let mut out = template.blank_like();
        for g in &self.gaps {
            for o in [g.near.outer, g.far.outer].into_iter().flatten() {
                for x in o.x0..=o.x1 {
                    out.set(x, g.y, 1.0);
                }
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a CloudGaps {
    type Item = &'a CloudGap;
    type IntoIter = std::slice::Iter<'a, CloudGap>;

    fn into_iter(self) -> Self::IntoIter {
        self.gaps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gap::XRange;

    fn beam(cells: &str) -> Grid {
        Grid::from_fn(cells.len(), 1, -1.0, |x, _| {
            let c = cells.as_bytes()[x];
            c.is_ascii_digit().then(|| f64::from(c - b'0'))
        })
    }

    #[test]
    fn test_three_clumps_give_closest_plus_two() {
        //             0         1         2
        //             0123456789012345678901234
        let g = beam("....1111....2222....3333.");
        let mut gaps = CloudGaps::default();
        gaps.add_gaps(0, &g, 2);

        assert_eq!(gaps.len(), 3);
        assert!(gaps.get(0).unwrap().is_closest());
        let g1 = gaps.get(1).unwrap();
        assert_eq!(g1.near.color, Some(1.0));
        assert_eq!(g1.far.color, Some(2.0));
        assert_eq!(g1.near.inner, XRange::new(6, 7));
        assert_eq!(g1.far.inner, XRange::new(12, 13));
        assert_eq!(gaps.get(2).unwrap().far.color, Some(3.0));
    }

    #[test]
    fn test_gaps_never_share_ranges_on_a_beam() {
        let g = beam("...111111......222222......333333..");
        let mut gaps = CloudGaps::default();
        gaps.add_gaps(0, &g, 2);
        assert_eq!(gaps.len(), 3);
        let all: Vec<&CloudGap> = gaps.iter().collect();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                for ra in a.ranges() {
                    for rb in b.ranges() {
                        assert!(!ra.overlaps(&rb), "{a} overlaps {b}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_width_filter_removes_narrow_gap() {
        // clumps separated by 3 background gates
        let g = beam("..11111...22222..");
        let mut gaps = CloudGaps::default();
        gaps.add_gaps(0, &g, 2);
        assert_eq!(gaps.len(), 2);

        let report = gaps.filter_by_width(5);
        assert_eq!(report.len(), 1);
        assert_eq!(gaps.len(), 1);
        assert!(gaps.get(0).unwrap().is_closest());
    }

    #[test]
    fn test_width_filter_keeps_closest_gap_near_radar() {
        // first clump starts 2 gates out, far closer than the minimum width
        let g = beam("..1111........2222..");
        let mut gaps = CloudGaps::default();
        gaps.add_gaps(0, &g, 2);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps.get(0).unwrap().width(), 2);

        let report = gaps.filter_by_width(8);
        assert!(report.is_empty());
        assert_eq!(gaps.len(), 2);

        let report = gaps.filter_by_width(10);
        assert_eq!(report.len(), 1);
        assert_eq!(gaps.len(), 1);
        assert!(gaps.get(0).unwrap().is_closest());
    }

    #[test]
    fn test_edge_and_outside_grids() {
        let g = beam("...111....222...");
        let gaps = CloudGaps::build(&g, 2);
        let edge = gaps.edge_grid(&g);
        let outside = gaps.outside_grid(&g);

        // closest gap far side and inter-clump gap
        assert_eq!(edge.value(3, 0), Some(1.0));
        assert_eq!(edge.value(5, 0), Some(1.0));
        assert_eq!(edge.value(10, 0), Some(1.0));
        assert_eq!(edge.value(0, 0), None);

        assert_eq!(outside.value(1, 0), Some(1.0));
        assert_eq!(outside.value(6, 0), Some(1.0));
        assert_eq!(outside.value(9, 0), Some(1.0));
        assert_eq!(outside.value(3, 0), None);
    }

    #[test]
    fn test_clump_touching_radar_has_no_closest_gap() {
        let g = beam("111...222...");
        let mut gaps = CloudGaps::default();
        gaps.add_gaps(0, &g, 2);
        assert_eq!(gaps.len(), 1);
        let gap = gaps.get(0).unwrap();
        assert!(!gap.is_closest());
        assert_eq!(gap.near.color, Some(1.0));
        assert_eq!(gap.far.color, Some(2.0));
        assert_eq!(gap.width(), 4);
    }
}
