//! Frequency domain features: Welch PSD, relative band power, spectral peak

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::config::constants::spectral::{WELCH_OVERLAP_FRACTION, WELCH_WINDOW_SECONDS};
use crate::config::FrequencyBand;
use crate::error::{FeatureError, FeatureResult};
use crate::utils::{argmax, is_flat, trapezoid};

const METRIC_WELCH: &str = "Welch_PSD";

/// One-sided power spectral density on a uniform frequency grid
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSpectrum {
    frequencies: Vec<f64>,
    density: Vec<f64>,
}

/// Largest PSD value and where it sits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    pub power: f64,
    pub frequency: f64,
}

impl PowerSpectrum {
    /// Build a spectrum from matching frequency and density grids
    pub fn new(frequencies: Vec<f64>, density: Vec<f64>) -> FeatureResult<Self> {
        if frequencies.len() != density.len() {
            return Err(FeatureError::configuration(
                "power_spectrum",
                format!("{} frequencies for {} density values", frequencies.len(), density.len()),
            ));
        }
        Ok(Self { frequencies, density })
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn density(&self) -> &[f64] {
        &self.density
    }

    /// Mean spacing of the frequency grid
    pub fn frequency_resolution(&self) -> f64 {
        match (self.frequencies.first(), self.frequencies.last()) {
            (Some(first), Some(last)) if self.frequencies.len() > 1 => {
                (last - first) / (self.frequencies.len() - 1) as f64
            }
            _ => 0.0,
        }
    }

    /// Trapezoidal integral over the whole spectrum
    pub fn total_power(&self) -> f64 {
        trapezoid(&self.density, self.frequency_resolution())
    }

    /// Trapezoidal integral over the bins inside `band`
    ///
    /// The selected bins are integrated as one contiguous run with the
    /// spectrum's mean bin spacing; a band covering fewer than two bins has
    /// zero power.
    pub fn band_power(&self, band: &FrequencyBand) -> f64 {
        let in_band: Vec<f64> = self
            .frequencies
            .iter()
            .zip(&self.density)
            .filter(|(&freq, _)| band.contains(freq))
            .map(|(_, &power)| power)
            .collect();
        trapezoid(&in_band, self.frequency_resolution())
    }

    /// Fraction of total power inside `band`, in [0, 1]
    ///
    /// A spectrum without positive finite total power (constant or all-zero
    /// input) has a relative band power of exactly 0.0.
    pub fn relative_band_power(&self, band: &FrequencyBand) -> f64 {
        let total = self.total_power();
        if !total.is_finite() || total <= 0.0 {
            return 0.0;
        }
        let ratio = self.band_power(band) / total;
        if ratio.is_finite() {
            ratio.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Maximum PSD value; ties go to the lowest frequency
    pub fn peak(&self) -> Option<SpectralPeak> {
        argmax(&self.density).map(|idx| SpectralPeak {
            power: self.density[idx],
            frequency: self.frequencies[idx],
        })
    }
}

/// Welch power spectral density estimator
///
/// Periodic Hann window of `2 x fs` samples, 50% overlap, mean removed from
/// each segment, one-sided density scaling, periodograms averaged with the
/// arithmetic mean. The FFT plan is built once and shared read-only, so one
/// estimator can serve every worker thread.
#[derive(Clone)]
pub struct SpectralEstimator {
    sampling_frequency: f64,
    window: Vec<f64>,
    window_power: f64, // sum of squared window coefficients
    step: usize,
    fft: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for SpectralEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralEstimator")
            .field("sampling_frequency", &self.sampling_frequency)
            .field("window_len", &self.window.len())
            .field("step", &self.step)
            .finish()
    }
}

impl SpectralEstimator {
    /// Estimator with the standard `2 x fs` sample window
    pub fn new(sampling_frequency: f64) -> FeatureResult<Self> {
        let window_len = (WELCH_WINDOW_SECONDS * sampling_frequency).round() as usize;
        Self::with_window(sampling_frequency, window_len)
    }

    /// Estimator with an explicit window length in samples
    pub fn with_window(sampling_frequency: f64, window_len: usize) -> FeatureResult<Self> {
        if !sampling_frequency.is_finite() || sampling_frequency <= 0.0 {
            return Err(FeatureError::configuration(
                "sampling_frequency",
                format!("must be a positive number, got {}", sampling_frequency),
            ));
        }
        if window_len < 2 {
            return Err(FeatureError::configuration(
                "welch_window",
                format!("window must span at least 2 samples, got {}", window_len),
            ));
        }

        let window = Self::create_hann_window(window_len);
        let window_power = window.iter().map(|w| w * w).sum();
        let overlap = (window_len as f64 * WELCH_OVERLAP_FRACTION) as usize;
        let fft = FftPlanner::new().plan_fft_forward(window_len);

        Ok(Self {
            sampling_frequency,
            window,
            window_power,
            step: window_len - overlap,
            fft,
        })
    }

    /// Window length in samples; also the minimum signal length
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn sampling_frequency(&self) -> f64 {
        self.sampling_frequency
    }

    /// Compute the Welch PSD of one channel
    pub fn psd(&self, signal: &[f64]) -> FeatureResult<PowerSpectrum> {
        let n = self.window.len();
        if signal.len() < n {
            return Err(FeatureError::insufficient_length(METRIC_WELCH, n, signal.len()));
        }

        let bins = n / 2 + 1;
        let overlap = n - self.step;
        let segment_count = (signal.len() - overlap) / self.step;

        let mut accumulated = vec![0.0; bins];
        let mut buffer: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); n];

        for seg in 0..segment_count {
            let start = seg * self.step;
            let segment = &signal[start..start + n];
            // Flat segments detrend to exact zeros
            let segment_mean = if is_flat(segment) {
                segment[0]
            } else {
                segment.iter().sum::<f64>() / n as f64
            };

            for ((slot, &x), &w) in buffer.iter_mut().zip(segment).zip(&self.window) {
                *slot = Complex::new((x - segment_mean) * w, 0.0);
            }
            self.fft.process(&mut buffer);

            for (acc, value) in accumulated.iter_mut().zip(&buffer[..bins]) {
                *acc += value.norm_sqr();
            }
        }

        let scale = 1.0 / (self.sampling_frequency * self.window_power * segment_count as f64);
        // One-sided: double everything except DC and, for even lengths, Nyquist
        let doubled_end = if n % 2 == 0 { bins - 1 } else { bins };
        let density: Vec<f64> = accumulated
            .iter()
            .enumerate()
            .map(|(k, &power)| {
                if k > 0 && k < doubled_end {
                    2.0 * power * scale
                } else {
                    power * scale
                }
            })
            .collect();

        let frequencies = (0..bins)
            .map(|k| k as f64 * self.sampling_frequency / n as f64)
            .collect();

        Ok(PowerSpectrum { frequencies, density })
    }

    /// Fraction of the signal's power inside `band`
    pub fn relative_band_power(&self, signal: &[f64], band: &FrequencyBand) -> FeatureResult<f64> {
        Ok(self.psd(signal)?.relative_band_power(band))
    }

    /// PSD maximum and its frequency
    pub fn peak_power(&self, signal: &[f64]) -> FeatureResult<SpectralPeak> {
        let spectrum = self.psd(signal)?;
        spectrum
            .peak()
            .ok_or_else(|| FeatureError::degenerate("Max_Power", "spectrum contains no finite values"))
    }

    // Periodic Hann window (the FFT-bin variant, no repeated end point)
    fn create_hann_window(size: usize) -> Vec<f64> {
        (0..size)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / size as f64).cos())
            .collect()
    }
}
