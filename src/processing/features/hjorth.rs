//! Hjorth mobility and complexity

use crate::config::constants::time_domain::MIN_SAMPLES_SECOND_DIFFERENCE;
use crate::error::{FeatureError, FeatureResult};
use crate::utils::{diff, mean, population_variance};

const METRIC_MOBILITY: &str = "Hjorth_Mobility";
const METRIC_COMPLEXITY: &str = "Hjorth_Complexity";

/// Hjorth descriptors of a single channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HjorthParameters {
    /// `sqrt(var(x') / var(x))`
    pub mobility: f64,
    /// `mobility(x') / mobility(x)`
    pub complexity: f64,
}

/// Hjorth parameter calculator
///
/// Variances are population variances. A zero-variance signal or first
/// difference is rejected as degenerate rather than mapped to a number.
#[derive(Debug, Clone, Copy, Default)]
pub struct HjorthCalculator;

impl HjorthCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, signal: &[f64]) -> FeatureResult<HjorthParameters> {
        Self::check_length(METRIC_MOBILITY, signal)?;

        let first = diff(signal);
        let mobility = Self::mobility_of(signal, &first, METRIC_MOBILITY)?;

        let second = diff(&first);
        let first_mobility = Self::mobility_of(&first, &second, METRIC_COMPLEXITY)?;

        Ok(HjorthParameters {
            mobility,
            complexity: first_mobility / mobility,
        })
    }

    pub fn mobility(&self, signal: &[f64]) -> FeatureResult<f64> {
        Self::check_length(METRIC_MOBILITY, signal)?;
        Self::mobility_of(signal, &diff(signal), METRIC_MOBILITY)
    }

    pub fn complexity(&self, signal: &[f64]) -> FeatureResult<f64> {
        Self::check_length(METRIC_COMPLEXITY, signal)?;
        self.compute(signal).map(|p| p.complexity)
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

    fn mobility_of(signal: &[f64], derivative: &[f64], metric: &'static str) -> FeatureResult<f64> {
        let signal_var = population_variance(signal, mean(signal));
        if signal_var == 0.0 {
            let reason = if metric == METRIC_MOBILITY {
                "signal has zero variance"
            } else {
                "first difference has zero variance"
            };
            return Err(FeatureError::degenerate(metric, reason));
        }
        let derivative_var = population_variance(derivative, mean(derivative));
        Ok((derivative_var / signal_var).sqrt())
    }
}
