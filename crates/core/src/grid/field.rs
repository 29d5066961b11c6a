//! Bounds-checked 2D field with a missing-data sentinel
//!
//! Stores one sweep field as a flat `Vec<f64>` in row-major order
//! (`y * nx + x`). All accessors are bounds checked and report failure
//! through their return value instead of panicking.

use super::point::GridPoint;

/// Gridded data for one sweep field
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Values in row-major order (y * nx + x)
    data: Vec<f64>,
    /// Number of range gates
    nx: usize,
    /// Number of beams
    ny: usize,
    /// Sentinel marking absent data
    missing: f64,
}

impl Grid {
    /// Default sentinel used when a caller has no preference
    pub const DEFAULT_MISSING: f64 = -99999.0;

    /// Create a grid with every point missing
    ///
    /// # Arguments
    ///
    /// * `nx` - Number of range gates
    /// * `ny` - Number of beams
    /// * `missing` - Sentinel value for absent data
    #[must_use]
    pub fn new(nx: usize, ny: usize, missing: f64) -> Self {
        Self {
            data: vec![missing; nx * ny],
            nx,
            ny,
            missing,
        }
    }

    /// Create a grid with every point set to `value`
    #[must_use]
    pub fn with_value(nx: usize, ny: usize, missing: f64, value: f64) -> Self {
        Self {
            data: vec![value; nx * ny],
            nx,
            ny,
            missing,
        }
    }

    /// Create a grid from a per-point function, `None` meaning missing
    pub fn from_fn<F>(nx: usize, ny: usize, missing: f64, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> Option<f64>,
    {
        let mut data = Vec::with_capacity(nx * ny);
        for y in 0..ny {
            for x in 0..nx {
                data.push(f(x, y).unwrap_or(missing));
            }
        }
        Self {
            data,
            nx,
            ny,
            missing,
        }
    }

    /// Same shape and sentinel, all points missing
    #[must_use]
    pub fn blank_like(&self) -> Self {
        Self::new(self.nx, self.ny, self.missing)
    }

    /// Number of range gates
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of beams
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// The missing-data sentinel
    pub fn missing(&self) -> f64 {
        self.missing
    }

    /// True when both grids have the same dimensions
    pub fn same_shape(&self, other: &Grid) -> bool {
        self.nx == other.nx && self.ny == other.ny
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.nx && y < self.ny).then(|| y * self.nx + x)
    }

    /// Value at `(x, y)`, `None` when out of bounds or missing
    pub fn value(&self, x: i32, y: i32) -> Option<f64> {
        let v = self.data[self.index(x, y)?];
        (v != self.missing).then_some(v)
    }

    /// Value at a grid point
    pub fn value_at(&self, p: GridPoint) -> Option<f64> {
        self.value(p.x, p.y)
    }

    /// True when `(x, y)` is in bounds and holds the missing sentinel
    pub fn is_missing(&self, x: i32, y: i32) -> bool {
        self.index(x, y)
            .is_some_and(|i| self.data[i] == self.missing)
    }

    /// Set a value, returns false when `(x, y)` is out of bounds
    pub fn set(&mut self, x: i32, y: i32, value: f64) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.data[i] = value;
                true
            }
            None => false,
        }
    }

    /// Set a grid point to `value`
    pub fn set_at(&mut self, p: GridPoint, value: f64) -> bool {
        self.set(p.x, p.y, value)
    }

    /// Mark `(x, y)` missing, returns false when out of bounds
    pub fn set_missing(&mut self, x: i32, y: i32) -> bool {
        let missing = self.missing;
        self.set(x, y, missing)
    }

    /// Number of non-missing points
    pub fn count_valid(&self) -> usize {
        self.data.iter().filter(|&&v| v != self.missing).count()
    }

    /// Copy with `delta` added to every non-missing value
    #[must_use]
    pub fn offset_by(&self, delta: f64) -> Self {
        let mut out = self.clone();
        for v in &mut out.data {
            if *v != self.missing {
                *v += delta;
            }
        }
        out
    }

    /// Point-wise `self - other`, missing where either input is missing
    ///
    /// Returns `None` when the shapes differ.
    pub fn difference(&self, other: &Grid) -> Option<Self> {
        if !self.same_shape(other) {
            return None;
        }
        let mut out = self.blank_like();
        for (i, o) in out.data.iter_mut().enumerate() {
            let a = self.data[i];
            let b = other.data[i];
            if a != self.missing && b != other.missing {
                *o = a - b;
            }
        }
        Some(out)
    }

    /// Keep values where `keep` returns true, everything else becomes missing
    #[must_use]
    pub fn masked<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(f64) -> bool,
    {
        let mut out = self.clone();
        for v in &mut out.data {
            if *v != self.missing && !keep(*v) {
                *v = self.missing;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10, 20, -1.0);
        assert_eq!(grid.nx(), 10);
        assert_eq!(grid.ny(), 20);
        assert_eq!(grid.count_valid(), 0);
        assert!(grid.is_missing(0, 0));
    }

    #[test]
    fn test_grid_get_set() {
        let mut grid = Grid::new(10, 10, -1.0);
        assert!(grid.set(3, 4, 123.45));
        assert_eq!(grid.value(3, 4), Some(123.45));
        assert_eq!(grid.value(4, 3), None);

        assert!(grid.set_missing(3, 4));
        assert_eq!(grid.value(3, 4), None);
    }

    #[test]
    fn test_grid_bounds_check() {
        let mut grid = Grid::with_value(10, 10, -1.0, 2.0);
        assert_eq!(grid.value(10, 5), None);
        assert_eq!(grid.value(-1, 5), None);
        assert!(!grid.set(0, 10, 1.0));
        assert!(!grid.set_missing(-3, 0));
        assert!(!grid.is_missing(100, 100));
    }

    #[test]
    fn test_difference_and_offset() {
        let a = Grid::from_fn(3, 1, -1.0, |x, _| (x != 1).then_some(10.0));
        let b = Grid::with_value(3, 1, -1.0, 4.0);

        let d = a.difference(&b).unwrap();
        assert_eq!(d.value(0, 0), Some(6.0));
        assert_eq!(d.value(1, 0), None);

        let shifted = a.offset_by(2.5);
        assert_eq!(shifted.value(2, 0), Some(12.5));
        assert_eq!(shifted.value(1, 0), None);

        assert!(a.difference(&Grid::new(2, 2, -1.0)).is_none());
    }

    #[test]
    fn test_masked() {
        let g = Grid::from_fn(4, 1, -1.0, |x, _| Some(x as f64));
        let m = g.masked(|v| v >= 2.0);
        assert_eq!(m.count_valid(), 2);
        assert_eq!(m.value(3, 0), Some(3.0));
    }
}
