//! Input fields read while evaluating a kernel

use crate::grid::Grid;

/// Borrowed view of the nine fields a kernel reads
///
/// `k_dbz_adjusted` is K-band reflectivity with the configured bias applied
/// and `dbz_diff` is `s_dbz - k_dbz_adjusted`; callers without precomputed
/// versions can build both with [`KernelGrids::derived`].
#[derive(Debug, Clone, Copy)]
pub struct KernelGrids<'a> {
    /// S-band reflectivity (dBZ)
    pub s_dbz: &'a Grid,
    /// K-band reflectivity (dBZ)
    pub k_dbz: &'a Grid,
    /// S-band differential reflectivity (dB)
    pub s_zdr: &'a Grid,
    /// Particle identification codes
    pub pid: &'a Grid,
    /// S-band noise power (dBZ), used where `s_dbz` is missing
    pub s_noise: &'a Grid,
    /// K-band noise power (dBZ), used where `k_dbz` is missing
    pub k_noise: &'a Grid,
    /// S-band correlation coefficient
    pub s_rhohv: &'a Grid,
    /// K-band reflectivity plus bias (dBZ)
    pub k_dbz_adjusted: &'a Grid,
    /// S minus adjusted K reflectivity (dB)
    pub dbz_diff: &'a Grid,
}

impl<'a> KernelGrids<'a> {
    /// Build the bias-adjusted K field and the S/K difference field
    ///
    /// # Returns
    ///
    /// `(k_dbz_adjusted, dbz_diff)`, or `None` when the two inputs differ in shape
    pub fn derived(s_dbz: &Grid, k_dbz: &Grid, k_dbz_offset: f64) -> Option<(Grid, Grid)> {
        let adjusted = k_dbz.offset_by(k_dbz_offset);
        let diff = s_dbz.difference(&adjusted)?;
        Some((adjusted, diff))
    }

    /// All fields as `(name, grid)` pairs
    pub fn fields(&self) -> [(&'static str, &'a Grid); 9] {
        [
            ("s_dbz", self.s_dbz),
            ("k_dbz", self.k_dbz),
            ("s_zdr", self.s_zdr),
            ("pid", self.pid),
            ("s_noise", self.s_noise),
            ("k_noise", self.k_noise),
            ("s_rhohv", self.s_rhohv),
            ("k_dbz_adjusted", self.k_dbz_adjusted),
            ("dbz_diff", self.dbz_diff),
        ]
    }

    /// Name of the first field whose shape differs from `s_dbz`
    pub fn mismatched_field(&self) -> Option<&'static str> {
        self.fields()
            .into_iter()
            .find(|(_, g)| !g.same_shape(self.s_dbz))
            .map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_fields() {
        let s = Grid::from_fn(3, 1, -1.0, |x, _| Some(10.0 + x as f64));
        let k = Grid::from_fn(3, 1, -1.0, |x, _| (x != 1).then_some(4.0));
        let (adj, diff) = KernelGrids::derived(&s, &k, 1.5).unwrap();
        assert_eq!(adj.value(0, 0), Some(5.5));
        assert_eq!(adj.value(1, 0), None);
        assert_eq!(diff.value(0, 0), Some(4.5));
        assert_eq!(diff.value(1, 0), None);
        assert_eq!(diff.value(2, 0), Some(6.5));

        let wrong = Grid::new(4, 1, -1.0);
        assert!(KernelGrids::derived(&s, &wrong, 0.0).is_none());
    }

    #[test]
    fn test_mismatched_field() {
        let a = Grid::new(5, 5, -1.0);
        let b = Grid::new(5, 4, -1.0);
        let grids = KernelGrids {
            s_dbz: &a,
            k_dbz: &a,
            s_zdr: &a,
            pid: &a,
            s_noise: &b,
            k_noise: &a,
            s_rhohv: &a,
            k_dbz_adjusted: &a,
            dbz_diff: &a,
        };
        assert_eq!(grids.mismatched_field(), Some("s_noise"));
    }
}
