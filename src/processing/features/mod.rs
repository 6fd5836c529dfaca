//! Per-channel EEG feature extraction
//!
//! This module provides the calculators that turn one channel of one segment
//! into named scalar features:
//! - Hjorth mobility and complexity
//! - Statistical moments and difference means
//! - Welch PSD peak and relative band powers
//! - Higuchi and Petrosian fractal dimensions
//! - Multilevel DWT band energies
//!
//! [`ChannelFeatureAggregator`] runs all of them once per channel and emits
//! the keys in a fixed order, so every well-formed segment yields the same
//! column layout.

pub mod fractal;
pub mod frequency;
pub mod hjorth;
pub mod time_domain;
pub mod wavelets;

use crate::config::{channel_feature_count, AnalysisConfig, FrequencyBands};
use crate::error::{FeatureError, FeatureResult};
use crate::processing::record::FeatureRecord;

pub use fractal::FractalDimensionEstimator;
pub use frequency::{PowerSpectrum, SpectralEstimator, SpectralPeak};
pub use hjorth::{HjorthCalculator, HjorthParameters};
pub use time_domain::{StatisticalMomentCalculator, StatisticalMoments};
pub use wavelets::{ExtensionMode, WaveletBasis, WaveletEnergyExtractor};

/// Metric reported for non-finite input samples
pub const METRIC_INPUT: &str = "Input_Sample";

/// Combines every calculator into one record per channel
///
/// Holds only immutable state (FFT plan, wavelet filters, band table), so a
/// single aggregator is shared by reference across worker threads.
#[derive(Debug, Clone)]
pub struct ChannelFeatureAggregator {
    hjorth: HjorthCalculator,
    moments: StatisticalMomentCalculator,
    spectral: SpectralEstimator,
    fractal: FractalDimensionEstimator,
    wavelet: WaveletEnergyExtractor,
    bands: FrequencyBands,
}

impl ChannelFeatureAggregator {
    pub fn new(config: &AnalysisConfig) -> FeatureResult<Self> {
        config.validate()?;
        Ok(Self {
            hjorth: HjorthCalculator::new(),
            moments: StatisticalMomentCalculator::new(),
            spectral: SpectralEstimator::new(config.sampling_frequency)?,
            fractal: FractalDimensionEstimator::new(config.higuchi_kmax)?,
            wavelet: WaveletEnergyExtractor::new(
                config.wavelet_basis,
                config.wavelet_levels,
                config.wavelet_mode,
            )?,
            bands: config.frequency_bands.clone(),
        })
    }

    /// Feature names emitted for `channel`, in emission order
    pub fn feature_names(&self, channel: usize) -> Vec<String> {
        let prefix = format!("Ch{}_", channel);
        let mut names: Vec<String> = [
            "Hjorth_Mobility",
            "Hjorth_Complexity",
            "Mean",
            "Std",
            "Kurtosis",
            "Skewness",
            "First_Diff_Mean",
            "Second_Diff_Mean",
            "Max_Power",
            "Max_Power_Freq",
        ]
        .iter()
        .map(|name| format!("{}{}", prefix, name))
        .collect();

        names.extend(self.bands.iter().map(|band| format!("{}RBP_{}", prefix, band.name)));
        names.push(format!("{}Higuchi_FD", prefix));
        names.push(format!("{}Petrosian_FD", prefix));
        names.extend((0..=self.wavelet.levels()).map(|j| format!("{}Wavelet_Energy_{}", prefix, j)));
        names
    }

    /// Extract all features of one channel
    ///
    /// Errors keep their kind and metric; only the channel index is added.
    pub fn extract(&self, signal: &[f64], channel: usize) -> FeatureResult<FeatureRecord> {
        self.extract_values(signal)
            .map(|values| FeatureRecord::from_parts(self.feature_names(channel), values))
            .map_err(|e| e.at_channel(channel))
    }

    fn extract_values(&self, signal: &[f64]) -> FeatureResult<Vec<f64>> {
        if let Some(position) = signal.iter().position(|v| !v.is_finite()) {
            return Err(FeatureError::degenerate(
                METRIC_INPUT,
                format!("sample {} is not finite ({})", position, signal[position]),
            ));
        }

        let hjorth = self.hjorth.compute(signal)?;
        let moments = self.moments.compute(signal)?;

        // One PSD feeds both the peak and every band ratio
        let spectrum = self.spectral.psd(signal)?;
        let peak = spectrum
            .peak()
            .ok_or_else(|| FeatureError::degenerate("Max_Power", "spectrum contains no finite values"))?;

        let higuchi = self.fractal.higuchi(signal)?;
        let petrosian = self.fractal.petrosian(signal)?;
        let energies = self.wavelet.energies(signal)?;

        let mut values = Vec::with_capacity(self.feature_count());
        values.extend_from_slice(&[
            hjorth.mobility,
            hjorth.complexity,
            moments.mean,
            moments.std,
            moments.kurtosis,
            moments.skewness,
            moments.first_diff_mean,
            moments.second_diff_mean,
            peak.power,
            peak.frequency,
        ]);
        values.extend(self.bands.iter().map(|band| spectrum.relative_band_power(band)));
        values.push(higuchi);
        values.push(petrosian);
        values.extend(energies);
        Ok(values)
    }

    pub fn spectral_estimator(&self) -> &SpectralEstimator {
        &self.spectral
    }

    pub fn moment_calculator(&self) -> &StatisticalMomentCalculator {
        &self.moments
    }

    pub fn hjorth_calculator(&self) -> &HjorthCalculator {
        &self.hjorth
    }

    pub fn bands(&self) -> &FrequencyBands {
        &self.bands
    }

    /// Number of features per channel
    pub fn feature_count(&self) -> usize {
        channel_feature_count(self.bands.len(), self.wavelet.levels())
    }
}
