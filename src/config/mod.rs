// src/config/mod.rs
//! Analysis configuration
//!
//! The whole pipeline is driven by one immutable [`AnalysisConfig`] value that
//! is passed in explicitly. Two configurations (e.g. different montages) can
//! run side by side without sharing any state.

pub mod bands;
pub mod constants;
pub mod loader;

pub use bands::{FrequencyBand, FrequencyBands};
pub use constants::*;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};
use crate::processing::features::wavelets::{ExtensionMode, WaveletBasis};

/// What the batch processor does with a segment that fails
///
/// Applies to every row-level failure (shape, length, degenerate signal,
/// schema divergence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowErrorPolicy {
    /// Stop the run at the first failing segment
    Abort,
    /// Leave the segment out of the table and report it
    SkipAndReport,
}

impl std::str::FromStr for RowErrorPolicy {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(RowErrorPolicy::Abort),
            "skip-and-report" | "skip" => Ok(RowErrorPolicy::SkipAndReport),
            other => Err(FeatureError::configuration(
                "on_schema_mismatch",
                format!("expected 'abort' or 'skip-and-report', got '{}'", other),
            )),
        }
    }
}

/// Complete analysis configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AnalysisConfig {
    #[serde(default = "defaults::sampling_frequency")]
    pub sampling_frequency: f64,

    #[serde(default = "defaults::num_channels")]
    pub num_channels: usize,

    /// Fixed samples per channel; inferred from the first segment when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples_per_channel: Option<usize>,

    #[serde(default)]
    pub wavelet_basis: WaveletBasis,

    #[serde(default = "defaults::wavelet_levels")]
    pub wavelet_levels: usize,

    #[serde(default)]
    pub wavelet_mode: ExtensionMode,

    #[serde(default = "defaults::higuchi_kmax")]
    pub higuchi_kmax: usize,

    #[serde(default = "defaults::on_schema_mismatch")]
    pub on_schema_mismatch: RowErrorPolicy,

    /// Worker threads for batch runs; all cores when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Band name to `[low, high]` in Hz; serialized last as a TOML table
    #[serde(default)]
    pub frequency_bands: FrequencyBands,
}

/// Default value providers using constants
mod defaults {
    use super::RowErrorPolicy;
    use crate::config::constants::*;

    pub fn sampling_frequency() -> f64 { signal::DEFAULT_SAMPLING_FREQUENCY_HZ }
    pub fn num_channels() -> usize { signal::DEFAULT_CHANNEL_COUNT }
    pub fn wavelet_levels() -> usize { wavelet::DEFAULT_LEVELS }
    pub fn higuchi_kmax() -> usize { fractal::DEFAULT_HIGUCHI_KMAX }
    pub fn on_schema_mismatch() -> RowErrorPolicy { RowErrorPolicy::Abort }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sampling_frequency: defaults::sampling_frequency(),
            num_channels: defaults::num_channels(),
            samples_per_channel: None,
            frequency_bands: FrequencyBands::default(),
            wavelet_basis: WaveletBasis::default(),
            wavelet_levels: defaults::wavelet_levels(),
            wavelet_mode: ExtensionMode::default(),
            higuchi_kmax: defaults::higuchi_kmax(),
            on_schema_mismatch: defaults::on_schema_mismatch(),
            workers: None,
        }
    }
}

impl AnalysisConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> FeatureResult<Self> {
        let config: AnalysisConfig = toml::from_str(content)
            .map_err(|e| FeatureError::configuration("<toml>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> FeatureResult<String> {
        toml::to_string_pretty(self).map_err(|e| FeatureError::configuration("<toml>", e.to_string()))
    }

    /// Check every option before the pipeline is built
    pub fn validate(&self) -> FeatureResult<()> {
        if !self.sampling_frequency.is_finite() || self.sampling_frequency <= 0.0 {
            return Err(FeatureError::configuration(
                "sampling_frequency",
                format!("must be a positive number, got {}", self.sampling_frequency),
            ));
        }
        if self.num_channels < signal::MIN_CHANNEL_COUNT {
            return Err(FeatureError::configuration("num_channels", "at least one channel is required"));
        }
        if self.samples_per_channel == Some(0) {
            return Err(FeatureError::configuration("samples_per_channel", "must be positive when set"));
        }
        self.frequency_bands.validate()?;
        if self.wavelet_levels < wavelet::MIN_LEVELS {
            return Err(FeatureError::configuration("wavelet_levels", "at least one level is required"));
        }
        if self.higuchi_kmax < fractal::MIN_HIGUCHI_KMAX {
            return Err(FeatureError::configuration(
                "higuchi_kmax",
                format!("must be at least {}, got {}", fractal::MIN_HIGUCHI_KMAX, self.higuchi_kmax),
            ));
        }
        if self.workers == Some(0) {
            return Err(FeatureError::configuration("workers", "must be positive when set"));
        }
        Ok(())
    }

    /// Welch periodogram length in samples
    pub fn welch_window_samples(&self) -> usize {
        (spectral::WELCH_WINDOW_SECONDS * self.sampling_frequency).round() as usize
    }

    /// Nyquist frequency in Hz
    pub fn nyquist(&self) -> f64 {
        self.sampling_frequency / 2.0
    }

    /// Number of feature columns each channel contributes
    pub fn features_per_channel(&self) -> usize {
        channel_feature_count(self.frequency_bands.len(), self.wavelet_levels)
    }
}

/// Keys emitted per channel for a band table and decomposition depth
///
/// Hjorth (2) + moments and differences (6) + peak power (2) + band powers
/// + fractal dimensions (2) + one wavelet energy per level plus the
/// approximation.
pub fn channel_feature_count(num_bands: usize, wavelet_levels: usize) -> usize {
    10 + num_bands + 2 + wavelet_levels + 1
}
