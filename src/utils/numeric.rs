// src/utils/numeric.rs
//! Small numeric kernels shared by the feature calculators
//!
//! All functions take plain slices and allocate only where they return a new
//! sequence. Callers are responsible for length checks; on an empty slice the
//! reductions return 0.0.

/// Arithmetic mean
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population variance (divisor N) around a precomputed mean
///
/// Exactly 0.0 for a flat sequence, even when `mean` carries rounding error.
pub fn population_variance(data: &[f64], mean: f64) -> f64 {
    if is_flat(data) {
        return 0.0;
    }
    data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / data.len() as f64
}

/// True when every value equals the first (or the slice is empty)
pub fn is_flat(data: &[f64]) -> bool {
    data.iter().all(|&x| x == data[0])
}

/// First discrete difference, `out[i] = data[i + 1] - data[i]`
pub fn diff(data: &[f64]) -> Vec<f64> {
    data.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Mean of the first discrete difference
///
/// Telescopes to `(last - first) / (N - 1)` but is summed explicitly so the
/// rounding matches the difference sequence.
pub fn diff_mean(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    data.windows(2).map(|w| w[1] - w[0]).sum::<f64>() / (data.len() - 1) as f64
}

/// Trapezoidal integral of uniformly spaced samples
pub fn trapezoid(values: &[f64], dx: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let interior: f64 = values[1..values.len() - 1].iter().sum();
    dx * (interior + 0.5 * (values[0] + values[values.len() - 1]))
}

/// Least-squares slope of `y` against `x`
///
/// Returns `None` when `x` has no spread.
pub fn linear_regression_slope(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let mean_x = mean(&x[..n]);
    let mean_y = mean(&y[..n]);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (&xi, &yi) in x[..n].iter().zip(&y[..n]) {
        sxy += (xi - mean_x) * (yi - mean_y);
        sxx += (xi - mean_x).powi(2);
    }

    if sxx == 0.0 {
        None
    } else {
        Some(sxy / sxx)
    }
}

/// Index of the first maximum, ignoring NaN
pub fn argmax(data: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &value) in data.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_variance() {
        let data = [1.0, 2.0, 3.0, 4.0];
        let m = mean(&data);
        assert_eq!(m, 2.5);
        assert!((population_variance(&data, m) - 1.25).abs() < 1e-12);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_variance(&[0.1; 1000], mean(&[0.1; 1000])), 0.0);
        assert!(is_flat(&[]));
        assert!(!is_flat(&[1.0, 1.0, 2.0]));
    }

    #[test]
    fn test_diff() {
        assert_eq!(diff(&[1.0, 4.0, 9.0, 16.0]), vec![3.0, 5.0, 7.0]);
        assert!(diff(&[1.0]).is_empty());
        assert_eq!(diff_mean(&[1.0, 4.0, 9.0, 16.0]), 5.0);
    }

    #[test]
    fn test_trapezoid() {
        // Integral of y = x over [0, 4] is 8
        let values = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert!((trapezoid(&values, 1.0) - 8.0).abs() < 1e-12);
        assert_eq!(trapezoid(&[5.0], 1.0), 0.0);
    }

    #[test]
    fn test_linear_regression_slope() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [3.0, 5.0, 7.0, 9.0];
        assert!((linear_regression_slope(&x, &y).unwrap() - 2.0).abs() < 1e-12);
        assert!(linear_regression_slope(&[1.0, 1.0], &[2.0, 3.0]).is_none());
    }

    #[test]
    fn test_argmax_first_occurrence() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[f64::NAN, 0.5]), Some(1));
        assert_eq!(argmax(&[]), None);
    }
}
