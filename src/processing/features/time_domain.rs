//! Statistical moments and difference means

use crate::config::constants::time_domain::MIN_SAMPLES_SECOND_DIFFERENCE;
use crate::error::{FeatureError, FeatureResult};
use crate::utils::{diff, diff_mean, mean, population_variance};

/// Time domain statistics of a single channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticalMoments {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    /// Excess (Fisher) kurtosis, zero for a Gaussian
    pub kurtosis: f64,
    pub skewness: f64,
    pub first_diff_mean: f64,
    pub second_diff_mean: f64,
}

/// Moment calculator
///
/// Mean and standard deviation are defined for any non-empty channel, so a
/// flat channel still has `std == 0.0`. Kurtosis and skewness divide by the
/// variance and fail as degenerate on a flat channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticalMomentCalculator;

impl StatisticalMomentCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, signal: &[f64]) -> FeatureResult<StatisticalMoments> {
        Self::check_length("Mean", signal)?;

        let mean = mean(signal);
        let (m2, m3, m4) = central_moments(signal, mean);
        if m2 == 0.0 {
            return Err(FeatureError::degenerate("Kurtosis", "signal has zero variance"));
        }

        let first = diff(signal);
        Ok(StatisticalMoments {
            mean,
            std: m2.sqrt(),
            kurtosis: m4 / (m2 * m2) - 3.0,
            skewness: m3 / m2.powf(1.5),
            first_diff_mean: diff_mean(signal),
            second_diff_mean: diff_mean(&first),
        })
    }

    pub fn mean(&self, signal: &[f64]) -> FeatureResult<f64> {
        Self::check_length("Mean", signal)?;
        Ok(mean(signal))
    }

    pub fn std(&self, signal: &[f64]) -> FeatureResult<f64> {
        Self::check_length("Std", signal)?;
        Ok(population_variance(signal, mean(signal)).sqrt())
    }

    pub fn kurtosis(&self, signal: &[f64]) -> FeatureResult<f64> {
        Self::check_length("Kurtosis", signal)?;
        let (m2, _, m4) = central_moments(signal, mean(signal));
        if m2 == 0.0 {
            return Err(FeatureError::degenerate("Kurtosis", "signal has zero variance"));
        }
        Ok(m4 / (m2 * m2) - 3.0)
    }

    pub fn skewness(&self, signal: &[f64]) -> FeatureResult<f64> {
        Self::check_length("Skewness", signal)?;
        let (m2, m3, _) = central_moments(signal, mean(signal));
        if m2 == 0.0 {
            return Err(FeatureError::degenerate("Skewness", "signal has zero variance"));
        }
        Ok(m3 / m2.powf(1.5))
    }

    pub fn first_diff_mean(&self, signal: &[f64]) -> FeatureResult<f64> {
        Self::check_length("First_Diff_Mean", signal)?;
        Ok(diff_mean(signal))
    }

    pub fn second_diff_mean(&self, signal: &[f64]) -> FeatureResult<f64> {
        Self::check_length("Second_Diff_Mean", signal)?;
        Ok(diff_mean(&diff(signal)))
    }

    fn check_length(metric: &'static str, signal: &[f64]) -> FeatureResult<()> {
        if signal.len() < MIN_SAMPLES_SECOND_DIFFERENCE {
            return Err(FeatureError::insufficient_length(
                metric,
                MIN_SAMPLES_SECOND_DIFFERENCE,
                signal.len(),
            ));
        }
        Ok(())
    }
}

// Second, third and fourth central moments (divisor N)
fn central_moments(signal: &[f64], mean: f64) -> (f64, f64, f64) {
    let n = signal.len() as f64;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &x in signal {
        let d = x - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_moments() {
        let signal = [1.0, 2.0, 3.0, 4.0, 10.0];
        let moments = StatisticalMomentCalculator::new().compute(&signal).unwrap();

        assert!((moments.mean - 4.0).abs() < 1e-12);
        // Population variance 10.0
        assert!((moments.std - 10.0_f64.sqrt()).abs() < 1e-12);
        // m3 = 36.0, m4 = 278.8
        assert!((moments.skewness - 36.0 / 10.0_f64.powf(1.5)).abs() < 1e-12);
        assert!((moments.kurtosis - (2.788 - 3.0)).abs() < 1e-12);
        assert!((moments.first_diff_mean - 2.25).abs() < 1e-12);
        // Second difference of [1, 1, 1, 6] is [0, 0, 5]
        assert!((moments.second_diff_mean - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric_signal_has_zero_skew() {
        let signal = [-2.0, -1.0, 0.0, 1.0, 2.0];
        let calculator = StatisticalMomentCalculator::new();
        assert!(calculator.skewness(&signal).unwrap().abs() < 1e-12);
        // Uniform-ish samples are platykurtic
        assert!(calculator.kurtosis(&signal).unwrap() < 0.0);
    }

    #[test]
    fn test_flat_channel() {
        let flat = [0.0; 16];
        let calculator = StatisticalMomentCalculator::new();

        assert_eq!(calculator.mean(&flat).unwrap(), 0.0);
        assert_eq!(calculator.std(&flat).unwrap(), 0.0);
        assert_eq!(calculator.first_diff_mean(&flat).unwrap(), 0.0);
        assert!(matches!(
            calculator.kurtosis(&flat),
            Err(FeatureError::DegenerateSignal { metric: "Kurtosis", .. })
        ));
        assert!(matches!(
            calculator.skewness(&flat),
            Err(FeatureError::DegenerateSignal { metric: "Skewness", .. })
        ));
        assert!(calculator.compute(&flat).is_err());
    }

    #[test]
    fn test_too_short() {
        let calculator = StatisticalMomentCalculator::new();
        assert!(matches!(
            calculator.second_diff_mean(&[1.0, 2.0]),
            Err(FeatureError::InsufficientLength { metric: "Second_Diff_Mean", .. })
        ));
    }
}
