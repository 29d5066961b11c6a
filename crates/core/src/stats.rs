//! Reflectivity statistics helpers
//!
//! Radar reflectivity is carried in dB. Averages of reflectivity are taken in
//! linear units and converted back ("linearized mean"), which weights strong
//! echoes the way the physical power does.

/// Convert dB to linear units
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 10.0)
}

/// Convert linear units to dB
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    10.0 * linear.log10()
}

/// Mean of dB values taken in linear space, returned in dB
///
/// # Returns
///
/// `None` for an empty input
pub fn linearized_mean_db(values: &[f64]) -> Option<f64> {
    linear_mean(values).map(linear_to_db)
}

/// Mean of dB values taken in linear space, returned in linear units
pub fn linear_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().map(|&v| db_to_linear(v)).sum();
    Some(sum / values.len() as f64)
}

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Minimum and maximum with the index of each
///
/// Ties resolve to the first occurrence.
pub fn min_max(values: &[f64]) -> Option<((usize, f64), (usize, f64))> {
    let first = *values.first()?;
    let mut lo = (0, first);
    let mut hi = (0, first);
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v < lo.1 {
            lo = (i, v);
        }
        if v > hi.1 {
            hi = (i, v);
        }
    }
    Some((lo, hi))
}

/// Pearson correlation of paired samples
///
/// # Returns
///
/// `None` when fewer than two pairs exist or either series has zero variance
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for &(a, b) in pairs {
        let da = a - mx;
        let db = b - my;
        sxy += da * db;
        sxx += da * da;
        syy += db * db;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_db_round_trip_constants() {
        assert_relative_eq!(db_to_linear(10.0), 10.0);
        assert_relative_eq!(db_to_linear(0.0), 1.0);
        assert_relative_eq!(linear_to_db(100.0), 20.0);
    }

    #[test]
    fn test_linearized_mean_weights_strong_echo() {
        // 10 dB and 20 dB: linear 10 and 100, mean 55 -> 17.40 dB
        let m = linearized_mean_db(&[10.0, 20.0]).unwrap();
        assert_relative_eq!(m, 10.0 * 55.0_f64.log10(), epsilon = 1e-12);
        assert!(m > 15.0);
        assert!(linearized_mean_db(&[]).is_none());
    }

    #[test]
    fn test_min_max_first_occurrence() {
        let ((imin, vmin), (imax, vmax)) = min_max(&[3.0, 1.0, 5.0, 1.0, 5.0]).unwrap();
        assert_eq!((imin, vmin), (1, 1.0));
        assert_eq!((imax, vmax), (2, 5.0));
    }

    #[test]
    fn test_pearson() {
        let perfect: Vec<(f64, f64)> = (0..5).map(|i| (f64::from(i), 2.0 * f64::from(i) + 1.0)).collect();
        assert_relative_eq!(pearson(&perfect).unwrap(), 1.0, epsilon = 1e-12);

        let inverse: Vec<(f64, f64)> = (0..5).map(|i| (f64::from(i), -f64::from(i))).collect();
        assert_relative_eq!(pearson(&inverse).unwrap(), -1.0, epsilon = 1e-12);

        assert!(pearson(&[(1.0, 2.0)]).is_none());
        assert!(pearson(&[(1.0, 2.0), (1.0, 3.0)]).is_none());
    }
}
