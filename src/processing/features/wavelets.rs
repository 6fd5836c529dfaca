//! Discrete wavelet decomposition and per-band energy
//!
//! Coefficient arrays follow the PyWavelets `wavedec` layout: approximation
//! first, then details from coarsest to finest,
//! `[cA_L, cD_L, cD_(L-1), ..., cD_1]`. The feature keys
//! `Wavelet_Energy_{j}` index into this order, so `j = 0` is always the
//! approximation band.

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};

const METRIC_WAVELET: &str = "Wavelet_Energy";

/// Orthogonal wavelet basis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveletBasis {
    /// Haar, 2 taps (`db1`)
    #[serde(alias = "db1")]
    Haar,
    /// Daubechies with 2 vanishing moments, 4 taps
    Db2,
    /// Daubechies with 4 vanishing moments, 8 taps
    #[default]
    Db4,
}

/// Signal extension at the boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionMode {
    /// Half-sample mirror; output length `floor((N + F - 1) / 2)`
    ///
    /// Mirrored boundary samples add coefficients, so the energies do not sum
    /// to the signal energy for filters longer than two taps. A
    /// constant 512-sample signal under db4 at depth 4 reports
    /// `38 * 16 / 512 = 1.1875` times its energy.
    #[default]
    Symmetric,
    /// Circular; output length `ceil(N / 2)`, energy preserving for even N
    Periodization,
}

impl std::str::FromStr for WaveletBasis {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "haar" | "db1" => Ok(WaveletBasis::Haar),
            "db2" => Ok(WaveletBasis::Db2),
            "db4" => Ok(WaveletBasis::Db4),
            other => Err(FeatureError::configuration(
                "wavelet_basis",
                format!("unsupported wavelet '{}', expected haar, db2 or db4", other),
            )),
        }
    }
}

// Scaling (reconstruction low-pass) coefficients
const HAAR_SCALING: [f64; 2] = [std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2];

const DB2_SCALING: [f64; 4] = [
    0.482_962_913_144_690_25,
    0.836_516_303_737_469,
    0.224_143_868_041_857_35,
    -0.129_409_522_550_921_45,
];

const DB4_SCALING: [f64; 8] = [
    0.230_377_813_308_855_23,
    0.714_846_570_552_541_5,
    0.630_880_767_929_590_4,
    -0.027_983_769_416_983_85,
    -0.187_034_811_718_881_14,
    0.030_841_381_835_986_965,
    0.032_883_011_666_982_945,
    -0.010_597_401_784_997_278,
];

impl WaveletBasis {
    fn scaling_coefficients(&self) -> &'static [f64] {
        match self {
            WaveletBasis::Haar => &HAAR_SCALING,
            WaveletBasis::Db2 => &DB2_SCALING,
            WaveletBasis::Db4 => &DB4_SCALING,
        }
    }

    /// Number of filter taps
    pub fn filter_len(&self) -> usize {
        self.scaling_coefficients().len()
    }
}

/// Analysis filter pair
#[derive(Debug, Clone)]
struct WaveletFilters {
    low_pass: Vec<f64>,
    high_pass: Vec<f64>,
}

impl WaveletFilters {
    fn for_basis(basis: WaveletBasis) -> Self {
        let scaling = basis.scaling_coefficients();
        // Decomposition low-pass is the time-reversed scaling filter,
        // the high-pass is its alternating-sign mirror.
        let low_pass = scaling.iter().rev().copied().collect();
        let high_pass = scaling
            .iter()
            .enumerate()
            .map(|(k, &c)| if k % 2 == 0 { -c } else { c })
            .collect();
        Self { low_pass, high_pass }
    }
}

/// Multilevel DWT energy extractor
#[derive(Debug, Clone)]
pub struct WaveletEnergyExtractor {
    basis: WaveletBasis,
    levels: usize,
    mode: ExtensionMode,
    filters: WaveletFilters,
}

impl WaveletEnergyExtractor {
    pub fn new(basis: WaveletBasis, levels: usize, mode: ExtensionMode) -> FeatureResult<Self> {
        if levels == 0 {
            return Err(FeatureError::configuration("wavelet_levels", "at least one level is required"));
        }
        Ok(Self {
            basis,
            levels,
            mode,
            filters: WaveletFilters::for_basis(basis),
        })
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn basis(&self) -> WaveletBasis {
        self.basis
    }

    /// Deepest useful level for a signal of `len` samples
    ///
    /// `floor(log2(len / (F - 1)))`, the same bound PyWavelets applies.
    pub fn max_level(&self, len: usize) -> usize {
        let span = self.basis.filter_len() - 1;
        if len < span {
            return 0;
        }
        let mut level = 0;
        while span << (level + 1) <= len {
            level += 1;
        }
        level
    }

    /// Shortest signal that supports the configured depth
    pub fn min_signal_len(&self) -> usize {
        (self.basis.filter_len() - 1) << self.levels
    }

    /// Decompose a signal into `levels + 1` coefficient arrays
    pub fn decompose(&self, signal: &[f64]) -> FeatureResult<Vec<Vec<f64>>> {
        if self.max_level(signal.len()) < self.levels {
            return Err(FeatureError::insufficient_length(
                METRIC_WAVELET,
                self.min_signal_len(),
                signal.len(),
            ));
        }

        let mut details = Vec::with_capacity(self.levels);
        let mut approximation = signal.to_vec();

        for _ in 0..self.levels {
            let (next_approximation, detail) = self.single_level_decomposition(&approximation);
            details.push(detail);
            approximation = next_approximation;
        }

        let mut coefficients = Vec::with_capacity(self.levels + 1);
        coefficients.push(approximation);
        coefficients.extend(details.into_iter().rev());
        Ok(coefficients)
    }

    /// Energy `sum(c^2)` of each coefficient array, approximation first
    pub fn energies(&self, signal: &[f64]) -> FeatureResult<Vec<f64>> {
        Ok(self
            .decompose(signal)?
            .iter()
            .map(|coeffs| energy(coeffs))
            .collect())
    }

    fn single_level_decomposition(&self, signal: &[f64]) -> (Vec<f64>, Vec<f64>) {
        match self.mode {
            ExtensionMode::Symmetric => self.decompose_symmetric(signal),
            ExtensionMode::Periodization => self.decompose_periodization(signal),
        }
    }

    // Full convolution with a mirrored signal, keeping odd output positions
    fn decompose_symmetric(&self, signal: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let n = signal.len() as isize;
        let filter_len = self.filters.low_pass.len();
        let out_len = (signal.len() + filter_len - 1) / 2;

        let mirrored = |idx: isize| -> f64 {
            let m = idx.rem_euclid(2 * n);
            if m < n {
                signal[m as usize]
            } else {
                signal[(2 * n - 1 - m) as usize]
            }
        };

        let mut approximation = Vec::with_capacity(out_len);
        let mut details = Vec::with_capacity(out_len);
        for k in 0..out_len {
            let centre = (2 * k + 1) as isize;
            let mut low_sum = 0.0;
            let mut high_sum = 0.0;
            for (j, (&low, &high)) in self.filters.low_pass.iter().zip(&self.filters.high_pass).enumerate() {
                let x = mirrored(centre - j as isize);
                low_sum += low * x;
                high_sum += high * x;
            }
            approximation.push(low_sum);
            details.push(high_sum);
        }
        (approximation, details)
    }

    // Circular convolution; odd lengths repeat the last sample first
    fn decompose_periodization(&self, signal: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let mut extended = signal.to_vec();
        if extended.len() % 2 == 1 {
            if let Some(&last) = extended.last() {
                extended.push(last);
            }
        }
        let n = extended.len() as isize;
        let filter_len = self.filters.low_pass.len();
        let out_len = extended.len() / 2;
        let phase = (filter_len / 2) as isize;

        let mut approximation = Vec::with_capacity(out_len);
        let mut details = Vec::with_capacity(out_len);
        for k in 0..out_len {
            let centre = 2 * k as isize + phase;
            let mut low_sum = 0.0;
            let mut high_sum = 0.0;
            for (j, (&low, &high)) in self.filters.low_pass.iter().zip(&self.filters.high_pass).enumerate() {
                let x = extended[(centre - j as isize).rem_euclid(n) as usize];
                low_sum += low * x;
                high_sum += high * x;
            }
            approximation.push(low_sum);
            details.push(high_sum);
        }
        (approximation, details)
    }
}

/// Sum of squared magnitudes
pub fn energy(coefficients: &[f64]) -> f64 {
    coefficients.iter().map(|&c| c * c).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noise(len: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..len).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }

    #[test]
    fn test_filters_are_orthonormal() {
        for basis in [WaveletBasis::Haar, WaveletBasis::Db2, WaveletBasis::Db4] {
            let filters = WaveletFilters::for_basis(basis);
            assert!((energy(&filters.low_pass) - 1.0).abs() < 1e-9, "{:?}", basis);
            assert!((energy(&filters.high_pass) - 1.0).abs() < 1e-9, "{:?}", basis);
            let dot: f64 = filters.low_pass.iter().zip(&filters.high_pass).map(|(a, b)| a * b).sum();
            assert!(dot.abs() < 1e-9, "{:?}", basis);
        }
    }

    #[test]
    fn test_symmetric_coefficient_lengths() {
        let extractor = WaveletEnergyExtractor::new(WaveletBasis::Db4, 4, ExtensionMode::Symmetric).unwrap();
        let coeffs = extractor.decompose(&noise(512, 1)).unwrap();

        let lengths: Vec<usize> = coeffs.iter().map(Vec::len).collect();
        assert_eq!(lengths, vec![38, 38, 70, 133, 259]);
    }

    #[test]
    fn test_periodization_preserves_energy() {
        let signal = noise(512, 7);
        let signal_energy = energy(&signal);

        for basis in [WaveletBasis::Haar, WaveletBasis::Db2, WaveletBasis::Db4] {
            let extractor = WaveletEnergyExtractor::new(basis, 4, ExtensionMode::Periodization).unwrap();
            let energies = extractor.energies(&signal).unwrap();
            assert_eq!(energies.len(), 5);

            let total: f64 = energies.iter().sum();
            assert!(
                ((total - signal_energy) / signal_energy).abs() < 1e-9,
                "{:?}: {} vs {}",
                basis,
                total,
                signal_energy
            );
        }
    }

    #[test]
    fn test_symmetric_energy_deviation() {
        // Haar on an even length never reads past the edge
        let signal = noise(512, 3);
        let haar = WaveletEnergyExtractor::new(WaveletBasis::Haar, 4, ExtensionMode::Symmetric).unwrap();
        let total: f64 = haar.energies(&signal).unwrap().iter().sum();
        assert!(((total - energy(&signal)) / energy(&signal)).abs() < 1e-9);

        // Longer filters pick up mirrored samples: a constant gains 38 x 16 / 512
        let db4 = WaveletEnergyExtractor::new(WaveletBasis::Db4, 4, ExtensionMode::Symmetric).unwrap();
        let constant = [2.0; 512];
        let energies = db4.energies(&constant).unwrap();
        let ratio = energies.iter().sum::<f64>() / energy(&constant);
        assert!((ratio - 1.1875).abs() < 1e-9, "ratio {}", ratio);
        assert!(energies[1..].iter().all(|&e| e < 1e-12), "{:?}", energies);
    }

    #[test]
    fn test_haar_constant_signal_lands_in_approximation() {
        let extractor = WaveletEnergyExtractor::new(WaveletBasis::Haar, 2, ExtensionMode::Periodization).unwrap();
        let energies = extractor.energies(&[1.0; 8]).unwrap();

        assert!((energies[0] - 8.0).abs() < 1e-12);
        assert!(energies[1].abs() < 1e-12);
        assert!(energies[2].abs() < 1e-12);
    }

    #[test]
    fn test_max_level() {
        let extractor = WaveletEnergyExtractor::new(WaveletBasis::Db4, 4, ExtensionMode::Symmetric).unwrap();
        assert_eq!(extractor.max_level(512), 6);
        assert_eq!(extractor.max_level(111), 3);
        assert_eq!(extractor.max_level(112), 4);
        assert_eq!(extractor.max_level(5), 0);
        assert_eq!(extractor.min_signal_len(), 112);
    }

    #[test]
    fn test_insufficient_length_for_depth() {
        let extractor = WaveletEnergyExtractor::new(WaveletBasis::Db4, 4, ExtensionMode::Symmetric).unwrap();
        match extractor.energies(&noise(64, 3)) {
            Err(FeatureError::InsufficientLength { metric, required, actual, .. }) => {
                assert_eq!(metric, "Wavelet_Energy");
                assert_eq!(required, 112);
                assert_eq!(actual, 64);
            }
            other => panic!("Expected InsufficientLength, got {:?}", other),
        }
    }

    #[test]
    fn test_basis_parsing() {
        assert_eq!("db1".parse::<WaveletBasis>().unwrap(), WaveletBasis::Haar);
        assert_eq!("DB4".parse::<WaveletBasis>().unwrap(), WaveletBasis::Db4);
        assert!("sym5".parse::<WaveletBasis>().is_err());
        assert!(WaveletEnergyExtractor::new(WaveletBasis::Db4, 0, ExtensionMode::Symmetric).is_err());
    }
}
