//! Small numeric helpers shared by the partitioner and the aggregate
//! builders, in the spirit of the teacher crate's `utils::helpers` module.

/// Returns `(argmax, max)` over `values`. Panics if `values` is empty; every
/// caller in this crate only invokes this on a non-empty slice of radial
/// distances.
pub fn arg_max(values: &[f64]) -> (usize, f64) {
    values
        .iter()
        .enumerate()
        .fold((0, values[0]), |(i_max, v_max), (i, &v)| {
            if v > v_max {
                (i, v)
            } else {
                (i_max, v_max)
            }
        })
}

/// Unweighted arithmetic mean of `values`.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unweighted median of `values`. Does not mutate the input; allocates a
/// sorted copy.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("coordinate values are never NaN"));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// `(min, max)` over `values`.
pub fn min_max(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn test_arg_max() {
        let (i, v) = arg_max(&[1.0, 5.0, 3.0]);
        assert_eq!(i, 1);
        assert!(approx_eq!(f64, v, 5.0));
    }

    #[test]
    fn test_median_odd_even() {
        assert!(approx_eq!(f64, median(&[3.0, 1.0, 2.0]), 2.0));
        assert!(approx_eq!(f64, median(&[1.0, 2.0, 3.0, 4.0]), 2.5));
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[3.0, -1.0, 7.0, 2.0]), (-1.0, 7.0));
    }
}
