//! Fixed-order point growth
//!
//! A kernel grows from its seed through 30 relative offsets in a fixed
//! spiral order. Every offset past the seed names earlier offsets it depends
//! on; an offset is taken only when at least one of them was already taken
//! during the same growth call. Each dependency is edge-adjacent to its
//! dependent, so a grown set never contains a pixel attached to the rest by
//! a corner only.

use crate::grid::{Grid, GridPoint};
use serde::{Deserialize, Serialize};

/// Number of offsets in each table
pub const TEMPLATE_LEN: usize = 30;

/// Growth direction along the beam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Toward the radar (decreasing gate index)
    MovingIn,
    /// Away from the radar (increasing gate index)
    MovingOut,
}

impl Direction {
    /// The opposite direction
    #[must_use]
    pub fn mirrored(self) -> Self {
        match self {
            Direction::MovingIn => Direction::MovingOut,
            Direction::MovingOut => Direction::MovingIn,
        }
    }

    /// Sign of a gate step in this direction
    pub fn step(self) -> i32 {
        match self {
            Direction::MovingIn => -1,
            Direction::MovingOut => 1,
        }
    }
}

/// One template entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateOffset {
    pub dx: i32,
    pub dy: i32,
    /// Earlier entries, any one of which must already be taken
    pub requires: &'static [usize],
}

const fn off(dx: i32, dy: i32, requires: &'static [usize]) -> TemplateOffset {
    TemplateOffset { dx, dy, requires }
}

/// Growth away from the radar
pub const MOVING_OUT: [TemplateOffset; TEMPLATE_LEN] = [
    off(0, 0, &[]),
    off(1, 0, &[0]),
    off(0, 1, &[0]),
    off(0, -1, &[0]),
    off(1, 1, &[1, 2]),
    off(1, -1, &[1, 3]),
    off(2, 0, &[1]),
    off(2, 1, &[6, 4]),
    off(2, -1, &[6, 5]),
    off(0, 2, &[2]),
    off(0, -2, &[3]),
    off(1, 2, &[9, 4]),
    off(1, -2, &[10, 5]),
    off(3, 0, &[6]),
    off(3, 1, &[13, 7]),
    off(3, -1, &[13, 8]),
    off(2, 2, &[11, 7]),
    off(2, -2, &[12, 8]),
    off(4, 0, &[13]),
    off(4, 1, &[18, 14]),
    off(4, -1, &[18, 15]),
    off(3, 2, &[16, 14]),
    off(3, -2, &[17, 15]),
    off(5, 0, &[18]),
    off(5, 1, &[23, 19]),
    off(5, -1, &[23, 20]),
    off(4, 2, &[21, 19]),
    off(4, -2, &[22, 20]),
    off(6, 0, &[23]),
    off(7, 0, &[28]),
];

/// Growth toward the radar, the gate-mirror of [`MOVING_OUT`]
pub const MOVING_IN: [TemplateOffset; TEMPLATE_LEN] = [
    off(0, 0, &[]),
    off(-1, 0, &[0]),
    off(0, 1, &[0]),
    off(0, -1, &[0]),
    off(-1, 1, &[1, 2]),
    off(-1, -1, &[1, 3]),
    off(-2, 0, &[1]),
    off(-2, 1, &[6, 4]),
    off(-2, -1, &[6, 5]),
    off(0, 2, &[2]),
    off(0, -2, &[3]),
    off(-1, 2, &[9, 4]),
    off(-1, -2, &[10, 5]),
    off(-3, 0, &[6]),
    off(-3, 1, &[13, 7]),
    off(-3, -1, &[13, 8]),
    off(-2, 2, &[11, 7]),
    off(-2, -2, &[12, 8]),
    off(-4, 0, &[13]),
    off(-4, 1, &[18, 14]),
    off(-4, -1, &[18, 15]),
    off(-3, 2, &[16, 14]),
    off(-3, -2, &[17, 15]),
    off(-5, 0, &[18]),
    off(-5, 1, &[23, 19]),
    off(-5, -1, &[23, 20]),
    off(-4, 2, &[21, 19]),
    off(-4, -2, &[22, 20]),
    off(-6, 0, &[23]),
    off(-7, 0, &[28]),
];

/// Growth template for one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelTemplate {
    direction: Direction,
}

impl KernelTemplate {
    pub const fn new(direction: Direction) -> Self {
        Self { direction }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Offset table in visitation order
    pub fn offsets(&self) -> &'static [TemplateOffset; TEMPLATE_LEN] {
        match self.direction {
            Direction::MovingIn => &MOVING_IN,
            Direction::MovingOut => &MOVING_OUT,
        }
    }

    /// Grow a point set from `center`
    ///
    /// # Arguments
    ///
    /// * `center` - Seed location, offset 0
    /// * `mask` - Points with data are eligible
    /// * `max_points` - Growth stops once this many points are taken
    ///
    /// # Returns
    ///
    /// Accepted points in visitation order
    pub fn grow(&self, center: GridPoint, mask: &Grid, max_points: usize) -> Vec<GridPoint> {
        let mut points = Vec::with_capacity(max_points.min(TEMPLATE_LEN));
        let mut added = [false; TEMPLATE_LEN];

        for (i, o) in self.offsets().iter().enumerate() {
            if points.len() >= max_points {
                break;
            }
            let p = center.offset(o.dx, o.dy);
            if mask.value_at(p).is_none() {
                continue;
            }
            if !o.requires.is_empty() && !o.requires.iter().any(|&r| added[r]) {
                continue;
            }
            added[i] = true;
            points.push(p);
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn random_mask(rng: &mut StdRng, fill: f64) -> Grid {
        Grid::from_fn(20, 12, -1.0, |_, _| rng.random_bool(fill).then_some(1.0))
    }

    #[test]
    fn test_tables_mirror_per_index() {
        for (i, (o, m)) in MOVING_OUT.iter().zip(MOVING_IN.iter()).enumerate() {
            assert_eq!(o.dx, -m.dx, "dx at {i}");
            assert_eq!(o.dy, m.dy, "dy at {i}");
            assert_eq!(o.requires, m.requires, "requires at {i}");
        }
    }

    #[test]
    fn test_offsets_are_distinct() {
        let set: HashSet<(i32, i32)> = MOVING_OUT.iter().map(|o| (o.dx, o.dy)).collect();
        assert_eq!(set.len(), TEMPLATE_LEN);
    }

    #[test]
    fn test_prerequisites_are_earlier_and_edge_adjacent() {
        for (i, o) in MOVING_OUT.iter().enumerate() {
            assert_eq!(o.requires.is_empty(), i == 0);
            for &r in o.requires {
                assert!(r < i, "entry {i} requires later entry {r}");
                let p = MOVING_OUT[r];
                assert_eq!((o.dx - p.dx).abs() + (o.dy - p.dy).abs(), 1, "entry {i} -> {r}");
            }
        }
    }

    #[test]
    fn test_full_mask_takes_whole_template() {
        let mask = Grid::with_value(30, 10, -1.0, 1.0);
        let t = KernelTemplate::new(Direction::MovingOut);
        let pts = t.grow(GridPoint::new(5, 5), &mask, 100);
        assert_eq!(pts.len(), TEMPLATE_LEN);
        assert_eq!(pts[0], GridPoint::new(5, 5));
        assert_eq!(pts[29], GridPoint::new(12, 5));
    }

    #[test]
    fn test_budget_truncates() {
        let mask = Grid::with_value(30, 10, -1.0, 1.0);
        let t = KernelTemplate::new(Direction::MovingIn);
        let pts = t.grow(GridPoint::new(15, 5), &mask, 4);
        assert_eq!(
            pts,
            vec![
                GridPoint::new(15, 5),
                GridPoint::new(14, 5),
                GridPoint::new(15, 6),
                GridPoint::new(15, 4),
            ]
        );
    }

    #[test]
    fn test_missing_seed_grows_nothing() {
        let mut mask = Grid::with_value(10, 10, -1.0, 1.0);
        mask.set_missing(5, 5);
        let t = KernelTemplate::new(Direction::MovingOut);
        assert!(t.grow(GridPoint::new(5, 5), &mask, 20).is_empty());
    }

    #[test]
    fn test_corner_only_pixel_is_skipped() {
        // only the seed and its diagonal (1,1) are eligible
        let mut mask = Grid::new(10, 10, -1.0);
        mask.set(5, 5, 1.0);
        mask.set(6, 6, 1.0);
        let t = KernelTemplate::new(Direction::MovingOut);
        assert_eq!(t.grow(GridPoint::new(5, 5), &mask, 20), vec![GridPoint::new(5, 5)]);
    }

    #[test]
    fn test_growth_is_prefix_stable() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mask = random_mask(&mut rng, 0.7);
            let seed = GridPoint::new(rng.random_range(0..20), rng.random_range(0..12));
            let dir = if rng.random_bool(0.5) {
                Direction::MovingIn
            } else {
                Direction::MovingOut
            };
            let t = KernelTemplate::new(dir);
            let full = t.grow(seed, &mask, TEMPLATE_LEN);
            for budget in 0..=TEMPLATE_LEN {
                let part = t.grow(seed, &mask, budget);
                assert_eq!(part.len(), budget.min(full.len()));
                assert_eq!(part[..], full[..part.len()]);
            }
        }
    }

    #[test]
    fn test_grown_points_stay_edge_connected() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let mask = random_mask(&mut rng, 0.6);
            let seed = GridPoint::new(rng.random_range(0..20), rng.random_range(0..12));
            let pts = KernelTemplate::new(Direction::MovingOut).grow(seed, &mask, TEMPLATE_LEN);
            let set: HashSet<GridPoint> = pts.iter().copied().collect();
            for p in pts.iter().skip(1) {
                assert!(
                    p.neighbors4().iter().any(|n| set.contains(n)),
                    "{p:?} attached by a corner only"
                );
            }
        }
    }

    #[test]
    fn test_directions_visit_mirrored_points() {
        let mask = Grid::with_value(40, 10, -1.0, 1.0);
        let seed = GridPoint::new(20, 5);
        let out = KernelTemplate::new(Direction::MovingOut).grow(seed, &mask, TEMPLATE_LEN);
        let inn = KernelTemplate::new(Direction::MovingIn).grow(seed, &mask, TEMPLATE_LEN);
        for (a, b) in out.iter().zip(inn.iter()) {
            assert_eq!(a.x - seed.x, seed.x - b.x);
            assert_eq!(a.y, b.y);
        }
        assert_eq!(Direction::MovingIn.mirrored(), Direction::MovingOut);
    }
}
