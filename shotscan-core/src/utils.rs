//! Small numeric helpers shared across the library.

/// Computes the q-th percentile (0-100) of `values` using linear
/// interpolation between order statistics.
///
/// A single-element slice returns that element. An empty slice returns NaN;
/// callers always operate on at least one value.
#[must_use]
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Mean of a byte slice as f64. Returns 0.0 for an empty slice.
#[must_use]
pub fn mean_u8(values: &[u8]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_single_element() {
        assert_eq!(percentile(&[42.0], 0.0), 42.0);
        assert_eq!(percentile(&[42.0], 50.0), 42.0);
        assert_eq!(percentile(&[42.0], 100.0), 42.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 50.0), 2.5);
        assert_eq!(percentile(&values, 100.0), 4.0);
        // rank 0.25 * 3 = 0.75 -> between 1.0 and 2.0
        assert!((percentile(&values, 25.0) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_unsorted_input() {
        let values = [9.0, 1.0, 5.0];
        assert_eq!(percentile(&values, 50.0), 5.0);
    }

    #[test]
    fn test_mean_u8() {
        assert_eq!(mean_u8(&[0, 10, 20]), 10.0);
        assert_eq!(mean_u8(&[]), 0.0);
    }
}
