//! Integer grid coordinates

use serde::{Deserialize, Serialize};

/// One grid location, `x` = range gate index, `y` = beam index
///
/// Signed so that template offsets can step off the grid before the bounds
/// check rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    /// Range gate index
    pub x: i32,
    /// Beam (azimuth) index
    pub y: i32,
}

impl GridPoint {
    /// Create a point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Point displaced by `(dx, dy)`
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The four edge-sharing neighbors
    pub fn neighbors4(self) -> [Self; 4] {
        [
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(0, 1),
        ]
    }
}

impl From<(i32, i32)> for GridPoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// An ordered set of points sharing one labeled color
pub type Region = Vec<GridPoint>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_neighbors() {
        let p = GridPoint::new(3, 4);
        assert_eq!(p.offset(-3, 1), GridPoint::new(0, 5));

        let n = p.neighbors4();
        assert!(n.contains(&GridPoint::new(2, 4)));
        assert!(n.contains(&GridPoint::new(4, 4)));
        assert!(n.contains(&GridPoint::new(3, 3)));
        assert!(n.contains(&GridPoint::new(3, 5)));
    }
}
