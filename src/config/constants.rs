// src/config/constants.rs
//! Named defaults and limits for the analysis configuration

/// Recording geometry
pub mod signal {
    pub const DEFAULT_SAMPLING_FREQUENCY_HZ: f64 = 256.0;
    pub const DEFAULT_CHANNEL_COUNT: usize = 19;
    pub const MIN_CHANNEL_COUNT: usize = 1;
}

/// Welch power spectral density
pub mod spectral {
    /// Periodogram window length in seconds (window = 2 x fs samples)
    pub const WELCH_WINDOW_SECONDS: f64 = 2.0;
    /// Fraction of the window shared by consecutive periodograms
    pub const WELCH_OVERLAP_FRACTION: f64 = 0.5;
}

/// Wavelet decomposition
pub mod wavelet {
    pub const DEFAULT_LEVELS: usize = 4;
    pub const MIN_LEVELS: usize = 1;
}

/// Fractal dimension estimators
pub mod fractal {
    pub const DEFAULT_HIGUCHI_KMAX: usize = 10;
    /// At least two scales are needed for the log-log regression
    pub const MIN_HIGUCHI_KMAX: usize = 2;
    /// Higuchi needs n_max >= 2 at k = kmax, i.e. N >= 3 * kmax
    pub const HIGUCHI_SAMPLES_PER_SCALE: usize = 3;
    /// Petrosian derivative sign-change weight
    pub const PETROSIAN_SIGN_CHANGE_WEIGHT: f64 = 0.4;
}

/// Minimum signal lengths for the time-domain calculators
pub mod time_domain {
    /// Two derivative orders need at least three samples
    pub const MIN_SAMPLES_SECOND_DIFFERENCE: usize = 3;
}

/// Canonical EEG frequency bands as (name, low Hz, high Hz)
pub const CANONICAL_BANDS: &[(&str, f64, f64)] = &[
    ("Delta", 0.5, 4.0),
    ("Theta", 4.0, 8.0),
    ("Alpha", 8.0, 12.0),
    ("Beta", 12.0, 30.0),
    ("Gamma", 30.0, 50.0),
];

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "EEG_FEATURES";
