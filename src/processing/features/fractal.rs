//! Higuchi and Petrosian fractal dimensions

use crate::config::constants::fractal::{
    HIGUCHI_SAMPLES_PER_SCALE,
    MIN_HIGUCHI_KMAX,
    PETROSIAN_SIGN_CHANGE_WEIGHT,
};
use crate::config::constants::time_domain::MIN_SAMPLES_SECOND_DIFFERENCE;
use crate::error::{FeatureError, FeatureResult};
use crate::utils::linear_regression_slope;

const METRIC_HIGUCHI: &str = "Higuchi_FD";
const METRIC_PETROSIAN: &str = "Petrosian_FD";

/// Fractal dimension estimator
#[derive(Debug, Clone, Copy)]
pub struct FractalDimensionEstimator {
    k_max: usize,
}

impl FractalDimensionEstimator {
    pub fn new(k_max: usize) -> FeatureResult<Self> {
        if k_max < MIN_HIGUCHI_KMAX {
            return Err(FeatureError::configuration(
                "higuchi_kmax",
                format!("must be at least {}, got {}", MIN_HIGUCHI_KMAX, k_max),
            ));
        }
        Ok(Self { k_max })
    }

    pub fn k_max(&self) -> usize {
        self.k_max
    }

    /// Higuchi fractal dimension
    ///
    /// Slope of `ln L(k)` against `ln(1/k)` for `k = 1..=k_max`, where
    /// `L(k)` is the normalized curve length averaged over the `k` start
    /// offsets. Close to 1 for smooth curves and to 2 for white noise.
    pub fn higuchi(&self, signal: &[f64]) -> FeatureResult<f64> {
        let n = signal.len();
        let required = HIGUCHI_SAMPLES_PER_SCALE * self.k_max;
        if n < required {
            return Err(FeatureError::insufficient_length(METRIC_HIGUCHI, required, n));
        }

        let mut log_inverse_k = Vec::with_capacity(self.k_max);
        let mut log_length = Vec::with_capacity(self.k_max);

        for k in 1..=self.k_max {
            let mut total = 0.0;
            for m in 0..k {
                let n_max = (n - m - 1) / k;
                let mut length = 0.0;
                for j in 1..n_max {
                    length += (signal[m + j * k] - signal[m + (j - 1) * k]).abs();
                }
                length *= (n - 1) as f64 / (k * k * n_max) as f64;
                total += length;
            }
            let mean_length = total / k as f64;

            if mean_length <= 0.0 || !mean_length.is_finite() {
                return Err(FeatureError::degenerate(
                    METRIC_HIGUCHI,
                    format!("curve length at scale k={} is zero", k),
                ));
            }
            log_inverse_k.push((1.0 / k as f64).ln());
            log_length.push(mean_length.ln());
        }

        linear_regression_slope(&log_inverse_k, &log_length)
            .ok_or_else(|| FeatureError::degenerate(METRIC_HIGUCHI, "regression has no spread"))
    }

    /// Petrosian fractal dimension
    ///
    /// Counts sign changes of the first difference by sign bit, so a zero
    /// difference counts as positive.
    pub fn petrosian(&self, signal: &[f64]) -> FeatureResult<f64> {
        let n = signal.len();
        if n < MIN_SAMPLES_SECOND_DIFFERENCE {
            return Err(FeatureError::insufficient_length(
                METRIC_PETROSIAN,
                MIN_SAMPLES_SECOND_DIFFERENCE,
                n,
            ));
        }

        let signs: Vec<bool> = signal
            .windows(2)
            .map(|w| (w[1] - w[0]).is_sign_negative())
            .collect();
        let sign_changes = signs.windows(2).filter(|s| s[0] != s[1]).count();

        let n = n as f64;
        let log_n = n.log10();
        let weighted = n + PETROSIAN_SIGN_CHANGE_WEIGHT * sign_changes as f64;
        Ok(log_n / (log_n + (n / weighted).log10()))
    }
}

impl Default for FractalDimensionEstimator {
    fn default() -> Self {
        Self {
            k_max: crate::config::constants::fractal::DEFAULT_HIGUCHI_KMAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|n| n as f64 * 0.01).collect()
    }

    #[test]
    fn test_ramp_dimensions() {
        let estimator = FractalDimensionEstimator::new(10).unwrap();
        let signal = ramp(1000);

        let higuchi = estimator.higuchi(&signal).unwrap();
        assert!((higuchi - 1.0).abs() < 0.05, "higuchi {}", higuchi);

        let petrosian = estimator.petrosian(&signal).unwrap();
        assert!((petrosian - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_white_noise_is_rough() {
        let mut rng = StdRng::seed_from_u64(42);
        let signal: Vec<f64> = (0..2000).map(|_| rng.gen_range(-1.0..1.0)).collect();

        let estimator = FractalDimensionEstimator::default();
        let higuchi = estimator.higuchi(&signal).unwrap();
        assert!(higuchi > 1.8, "higuchi {}", higuchi);
        assert!(estimator.petrosian(&signal).unwrap() > 1.0);
    }

    #[test]
    fn test_alternating_signal_maximizes_sign_changes() {
        let estimator = FractalDimensionEstimator::default();
        let zigzag: Vec<f64> = (0..100).map(|n| if n % 2 == 0 { 1.0 } else { -1.0 }).collect();

        // 98 sign changes over 100 samples
        let n: f64 = 100.0;
        let expected = n.log10() / (n.log10() + (n / (n + 0.4 * 98.0)).log10());
        assert!((estimator.petrosian(&zigzag).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_constant_signal_is_degenerate_for_higuchi() {
        let estimator = FractalDimensionEstimator::default();
        assert!(matches!(
            estimator.higuchi(&[3.0; 100]),
            Err(FeatureError::DegenerateSignal { metric: "Higuchi_FD", .. })
        ));
        // No sign changes at all
        assert!((estimator.petrosian(&[3.0; 100]).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_and_configuration_checks() {
        let estimator = FractalDimensionEstimator::new(10).unwrap();
        assert!(matches!(
            estimator.higuchi(&ramp(29)),
            Err(FeatureError::InsufficientLength { required: 30, actual: 29, .. })
        ));
        assert!(estimator.higuchi(&ramp(30)).is_ok());
        assert!(matches!(
            estimator.petrosian(&[1.0, 2.0]),
            Err(FeatureError::InsufficientLength { metric: "Petrosian_FD", .. })
        ));
        assert!(matches!(
            FractalDimensionEstimator::new(1),
            Err(FeatureError::Configuration { .. })
        ));
    }
}
