//! Along-beam clump products
//!
//! Per-beam diagnostics computed inside each weather clump run, independent
//! of the kernel pairs:
//!
//! - path extent: gates to the next usable S/K difference at least a minimum
//!   distance further out
//! - total attenuation: the change in S/K difference over that path
//! - average attenuation: total attenuation spread over its path and averaged
//!   where paths overlap
//! - summed Z: linear S reflectivity raised to a power and summed over the path
//! - FIR smoothing of the humidity product along each beam

use crate::config::RepohParams;
use crate::gap::clump_runs;
use crate::grid::Grid;
use crate::stats::db_to_linear;
use tracing::{debug, warn};

/// Points used to fit the line that extends a beam past its valid data
const FIR_EDGE_FIT_POINTS: usize = 20;

/// Per-beam products of one sweep
#[derive(Debug, Clone)]
pub struct BeamProducts {
    /// Gates from each point to the first usable point at least the minimum path further out
    pub extent: Grid,
    /// S/K difference change over the same path
    pub total_attenuation: Grid,
    /// Total attenuation averaged over every path covering a point
    pub average_attenuation: Grid,
    /// Sum of `Z^p` over each path, `Z` linear S reflectivity
    pub sum_z: Grid,
    /// FIR-smoothed humidity, when coefficients are configured
    pub fir_humidity: Option<Grid>,
}

impl BeamProducts {
    /// Compute every product
    ///
    /// # Arguments
    ///
    /// * `clumps` - Weather clumps painted with their colors
    /// * `dbz_diff` - S minus adjusted K reflectivity
    /// * `s_dbz` - S-band reflectivity
    /// * `humidity` - Humidity grid of the good kernel pairs
    /// * `params` - Algorithm parameters
    /// * `gate_spacing_km` - Distance between gates
    pub fn compute(
        clumps: &Grid,
        dbz_diff: &Grid,
        s_dbz: &Grid,
        humidity: &Grid,
        params: &RepohParams,
        gate_spacing_km: f64,
    ) -> Self {
        let min_gates = RepohParams::km_to_gates(params.min_attenuation_km, gate_spacing_km);
        let extent = path_extent_grid(clumps, dbz_diff, min_gates);
        let total_attenuation =
            total_attenuation_grid(clumps, dbz_diff, params.min_attenuation_km, gate_spacing_km);
        let average_attenuation = average_attenuation_grid(&extent, &total_attenuation);
        let z = Grid::from_fn(s_dbz.nx(), s_dbz.ny(), s_dbz.missing(), |x, y| {
            s_dbz.value(x as i32, y as i32).map(db_to_linear)
        });
        let sum_z = sum_z_grid(&z, &extent, params.sum_z_power);
        let fir_humidity = (!params.fir_coefficients.is_empty())
            .then(|| fir_filter(humidity, &params.fir_coefficients));

        debug!(
            "Beam products: {} path points, {} with attenuation",
            extent.count_valid(),
            total_attenuation.count_valid()
        );
        Self {
            extent,
            total_attenuation,
            average_attenuation,
            sum_z,
            fir_humidity,
        }
    }
}

/// Walk every clump run, pairing each usable point with the first usable
/// point further out that `reaches` accepts
fn along_runs<F, R>(clumps: &Grid, data: &Grid, mut reaches: F, mut record: R) -> Grid
where
    F: FnMut(i32, i32) -> bool,
    R: FnMut(i32, f64, i32, f64) -> f64,
{
    let mut out = clumps.blank_like();
    for y in 0..clumps.ny() as i32 {
        for (run, _) in clump_runs(clumps, y) {
            for x in run.x0..=run.x1 {
                let Some(v) = data.value(x, y) else {
                    continue;
                };
                let far = (x + 1..=run.x1)
                    .filter_map(|xi| data.value(xi, y).map(|vi| (xi, vi)))
                    .find(|&(xi, _)| reaches(x, xi));
                if let Some((xi, vi)) = far {
                    out.set(x, y, record(x, v, xi, vi));
                }
            }
        }
    }
    out
}

/// Gates from each usable point to the first usable point at least
/// `min_gates` further out in the same clump run
pub fn path_extent_grid(clumps: &Grid, data: &Grid, min_gates: usize) -> Grid {
    let min = i32::try_from(min_gates).unwrap_or(i32::MAX);
    along_runs(clumps, data, |x, xi| xi - x >= min, |x, _, xi, _| f64::from(xi - x))
}

/// Change in `dbz_diff` from each usable point to the first usable point at
/// least `min_km` further out in the same clump run
pub fn total_attenuation_grid(clumps: &Grid, dbz_diff: &Grid, min_km: f64, gate_spacing_km: f64) -> Grid {
    along_runs(
        clumps,
        dbz_diff,
        |x, xi| f64::from(xi - x) * gate_spacing_km >= min_km,
        |_, v, _, vi| vi - v,
    )
}

/// Spread each total attenuation over `x..=x+extent` and average overlaps
pub fn average_attenuation_grid(extent: &Grid, total: &Grid) -> Grid {
    let mut out = extent.blank_like();
    let nx = extent.nx();
    for y in 0..extent.ny() as i32 {
        let mut sums = vec![0.0; nx];
        let mut counts = vec![0_u32; nx];
        for x in 0..nx as i32 {
            let (Some(a), Some(e)) = (total.value(x, y), extent.value(x, y)) else {
                continue;
            };
            let end = (x + e as i32).min(nx as i32 - 1);
            for xi in x..=end {
                sums[xi as usize] += a;
                counts[xi as usize] += 1;
            }
        }
        for (x, (sum, count)) in sums.into_iter().zip(counts).enumerate() {
            if count > 0 {
                out.set(x as i32, y, sum / f64::from(count));
            }
        }
    }
    out
}

/// Sum of `z^power` over `x..=x+extent` at every point with an extent
pub fn sum_z_grid(z: &Grid, extent: &Grid, power: f64) -> Grid {
    let mut out = extent.blank_like();
    for y in 0..extent.ny() as i32 {
        for x in 0..extent.nx() as i32 {
            let Some(e) = extent.value(x, y) else {
                continue;
            };
            let sum: f64 = (x..=x + e as i32)
                .filter_map(|xi| z.value(xi, y))
                .map(|v| v.powf(power))
                .sum();
            out.set(x, y, sum);
        }
    }
    out
}

/// Least-squares line through the first `n` usable values walking away from
/// `start`, with positions measured from `start`
fn edge_line(row: &[Option<f64>], start: usize, upward: bool, n: usize) -> Option<(f64, f64)> {
    let mut count = 0;
    let (mut sx, mut sy, mut sxy, mut sx2) = (0.0, 0.0, 0.0, 0.0);
    let len = if upward { row.len() - start } else { start + 1 };
    for k in 0..len {
        let (i, pos) = if upward {
            (start + k, k as f64)
        } else {
            (start - k, -(k as f64))
        };
        if let Some(v) = row[i] {
            count += 1;
            sx += pos;
            sy += v;
            sxy += pos * v;
            sx2 += pos * pos;
            if count == n {
                break;
            }
        }
    }
    if count < n {
        return None;
    }
    let n = n as f64;
    let slope = (n * sxy - sx * sy) / (n * sx2 - sx * sx);
    Some((slope, (sy - slope * sx) / n))
}

/// Linear interpolation across interior missing runs
fn fill_gaps(values: &mut [Option<f64>]) {
    let mut last: Option<(usize, f64)> = None;
    for i in 0..values.len() {
        let Some(v) = values[i] else {
            continue;
        };
        if let Some((i0, v0)) = last {
            let span = (i - i0) as f64;
            for k in i0 + 1..i {
                let t = (k - i0) as f64 / span;
                values[k] = Some((1.0 - t) * v0 + t * v);
            }
        }
        last = Some((i, v));
    }
}

/// Smooth every beam with the FIR `coefficients`
///
/// Each beam is extended past its first and last valid gates with a line
/// fit to the nearest valid values, then interior holes are interpolated.
/// A gate keeps a value only when it had one, the window has no unfillable
/// holes, and fewer than half of the window's original values were missing.
/// Beams with fewer than twice as many valid gates as coefficients are
/// left unfiltered.
pub fn fir_filter(grid: &Grid, coefficients: &[f64]) -> Grid {
    if coefficients.is_empty() {
        return grid.clone();
    }
    let n_coeff = coefficients.len();
    let center = n_coeff / 2;
    let window = 2 * center + 1;
    let sum_coeff: f64 = coefficients.iter().sum();
    if n_coeff % 2 == 0 {
        warn!("FIR filter has {} coefficients, using index {} as center", n_coeff, center);
    }

    let mut out = grid.clone();
    for y in 0..grid.ny() as i32 {
        let row: Vec<Option<f64>> = (0..grid.nx() as i32).map(|x| grid.value(x, y)).collect();
        let Some(i0) = row.iter().position(Option::is_some) else {
            continue;
        };
        let i1 = row.iter().rposition(Option::is_some).unwrap_or(i0);
        if i1 - i0 + 1 < 2 * n_coeff {
            warn!("FIR filter: beam {} has only {} gates of data, not filtered", y, i1 - i0 + 1);
            continue;
        }

        let low = edge_line(&row, i0, true, FIR_EDGE_FIT_POINTS);
        let high = edge_line(&row, i1, false, FIR_EDGE_FIT_POINTS);
        let extend = |line: Option<(f64, f64)>, pos: f64| line.map(|(m, b)| m * pos + b);

        let extended: Vec<Option<f64>> = (0..center)
            .map(|j| extend(low, j as f64 - center as f64))
            .chain(row[i0..=i1].iter().copied())
            .chain((1..=center).map(|k| extend(high, k as f64)))
            .collect();
        let mut filled = extended.clone();
        fill_gaps(&mut filled);

        for x in 0..grid.nx() {
            if x < i0 || x > i1 || row[x].is_none() {
                continue;
            }
            let t = x + center - i0;
            let span = t - center..=t + center;
            let holes = extended[span.clone()].iter().filter(|v| v.is_none()).count();
            let value = if filled[span].iter().all(Option::is_some) && holes < window / 2 {
                coefficients
                    .iter()
                    .zip(&filled[t - center..t - center + n_coeff])
                    .map(|(c, v)| v.map(|v| c * v))
                    .sum::<Option<f64>>()
                    .map(|s| s / sum_coeff)
            } else {
                None
            };
            match value {
                Some(v) => out.set(x as i32, y, v),
                None => out.set_missing(x as i32, y),
            };
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(values: &[Option<f64>]) -> Grid {
        Grid::from_fn(values.len(), 1, -999.0, |x, _| values[x])
    }

    fn clump(nx: usize, x0: usize, x1: usize) -> Grid {
        Grid::from_fn(nx, 1, -999.0, |x, _| (x0..=x1).contains(&x).then_some(1.0))
    }

    #[test]
    fn test_extent_and_total_attenuation_stay_inside_runs() {
        // clump over gates 0..=9, difference rising 0.5 dB per gate
        let clumps = clump(12, 0, 9);
        let diff = Grid::from_fn(12, 1, -999.0, |x, _| Some(x as f64 * 0.5));

        let extent = path_extent_grid(&clumps, &diff, 4);
        assert_eq!(extent.value(0, 0), Some(4.0));
        assert_eq!(extent.value(5, 0), Some(4.0));
        assert_eq!(extent.value(6, 0), None);
        assert_eq!(extent.value(10, 0), None);

        let total = total_attenuation_grid(&clumps, &diff, 1.0, 0.25);
        assert_relative_eq!(total.value(0, 0).unwrap(), 2.0);
        assert_relative_eq!(total.value(5, 0).unwrap(), 2.0);
        assert_eq!(total.value(6, 0), None);
    }

    #[test]
    fn test_extent_skips_missing_data() {
        let clumps = clump(8, 0, 7);
        let diff = row(&[Some(1.0), Some(1.0), None, None, None, Some(3.0), None, Some(4.0)]);
        let extent = path_extent_grid(&clumps, &diff, 2);
        assert_eq!(extent.value(0, 0), Some(5.0));
        assert_eq!(extent.value(1, 0), Some(4.0));
        assert_eq!(extent.value(2, 0), None);
        assert_eq!(extent.value(5, 0), Some(2.0));
    }

    #[test]
    fn test_runs_of_different_colors_are_separate() {
        let clumps = Grid::from_fn(8, 1, -999.0, |x, _| Some(if x < 4 { 1.0 } else { 2.0 }));
        let diff = Grid::with_value(8, 1, -999.0, 0.0);
        let extent = path_extent_grid(&clumps, &diff, 3);
        assert_eq!(extent.value(0, 0), Some(3.0));
        assert_eq!(extent.value(1, 0), None);
        assert_eq!(extent.value(4, 0), Some(3.0));
    }

    #[test]
    fn test_average_attenuation_over_overlapping_paths() {
        let extent = row(&[Some(2.0), Some(2.0), None, None, None]);
        let total = row(&[Some(1.0), Some(3.0), None, None, None]);
        let avg = average_attenuation_grid(&extent, &total);
        assert_relative_eq!(avg.value(0, 0).unwrap(), 1.0);
        assert_relative_eq!(avg.value(1, 0).unwrap(), 2.0);
        assert_relative_eq!(avg.value(2, 0).unwrap(), 2.0);
        assert_relative_eq!(avg.value(3, 0).unwrap(), 3.0);
        assert_eq!(avg.value(4, 0), None);
    }

    #[test]
    fn test_sum_z_over_extent() {
        let z = row(&[Some(1.0), Some(4.0), None, Some(9.0)]);
        let extent = row(&[Some(3.0), None, None, None]);
        let sum = sum_z_grid(&z, &extent, 0.5);
        assert_relative_eq!(sum.value(0, 0).unwrap(), 1.0 + 2.0 + 3.0);
        assert_eq!(sum.value(1, 0), None);
    }

    #[test]
    fn test_fir_preserves_a_line() {
        // a straight line survives a symmetric normalized filter, edges included
        let values: Vec<Option<f64>> = (0..40).map(|x| Some(2.0 + 0.5 * f64::from(x))).collect();
        let g = row(&values);
        let out = fir_filter(&g, &[1.0, 2.0, 3.0, 2.0, 1.0]);
        for x in 0..40 {
            assert_relative_eq!(out.value(x, 0).unwrap(), g.value(x, 0).unwrap(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_fir_fills_holes_but_keeps_them_missing() {
        let mut values: Vec<Option<f64>> = (0..30).map(|x| Some(f64::from(x % 2))).collect();
        values[10] = None;
        let out = fir_filter(&row(&values), &[1.0; 5]);
        assert_eq!(out.value(10, 0), None);
        // gates 9 and 11 are both 1, so the hole fills with 1
        assert_relative_eq!(out.value(11, 0).unwrap(), 4.0 / 5.0, epsilon = 1e-9);
        assert_relative_eq!(out.value(5, 0).unwrap(), 3.0 / 5.0, epsilon = 1e-9);

        // a three-gate window tolerates no holes
        let out = fir_filter(&row(&values), &[1.0; 3]);
        assert_eq!(out.value(9, 0), None);
        assert_eq!(out.value(11, 0), None);
        assert_relative_eq!(out.value(5, 0).unwrap(), 1.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fir_skips_short_beams() {
        let values = [None, Some(1.0), Some(5.0), Some(2.0), None];
        let g = row(&values);
        let out = fir_filter(&g, &[1.0, 1.0, 1.0]);
        assert_eq!(out, g);
    }

    #[test]
    fn test_fill_gaps_leaves_ends_missing() {
        let mut v = vec![None, Some(0.0), None, None, Some(3.0), None];
        fill_gaps(&mut v);
        assert_eq!(v, vec![None, Some(0.0), Some(1.0), Some(2.0), Some(3.0), None]);
    }
}
