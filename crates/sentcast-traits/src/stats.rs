//! Statistical helpers shared by feature engineering, scaling and models.
//!
//! Standard deviations use the sample convention (N-1 denominator).

/// Arithmetic mean, `None` for an empty slice.
///
/// # Examples
///
/// ```
/// use sentcast_traits::stats::mean;
///
/// assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
/// assert_eq!(mean(&[]), None);
/// ```
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (Bessel's correction), `None` below two values.
///
/// # Examples
///
/// ```
/// use sentcast_traits::stats::sample_std;
///
/// let std = sample_std(&[10.0, 11.0, 12.0]).unwrap();
/// assert!((std - 1.0).abs() < 1e-12);
/// assert_eq!(sample_std(&[5.0]), None);
/// ```
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = mean(values)?;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt())
}

/// Minimum and maximum of a slice, `None` when empty or any value is NaN.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    values.iter().try_fold((first, first), |(lo, hi), &v| {
        if v.is_nan() {
            None
        } else {
            Some((lo.min(v), hi.max(v)))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_basic() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap(), 3.0);
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn test_sample_std_uses_n_minus_one() {
        // population std of [11, 12, 13] is sqrt(2/3), sample std is 1
        let std = sample_std(&[11.0, 12.0, 13.0]).unwrap();
        assert_relative_eq!(std, 1.0, epsilon = 1e-12);

        let std = sample_std(&[12.0, 11.0, 13.0]).unwrap();
        assert_relative_eq!(std, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_std_edge_cases() {
        assert!(sample_std(&[]).is_none());
        assert!(sample_std(&[42.0]).is_none());
        assert_relative_eq!(sample_std(&[5.0, 5.0, 5.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[3.0, -1.0, 7.0, 2.0]), Some((-1.0, 7.0)));
        assert_eq!(min_max(&[4.0]), Some((4.0, 4.0)));
        assert_eq!(min_max(&[]), None);
        assert_eq!(min_max(&[1.0, f64::NAN]), None);
    }
}
