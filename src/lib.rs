//! EEG-Features: per-segment feature extraction for multichannel EEG
//!
//! This library turns a table of flattened EEG segments into a table of
//! named scalar features. It features:
//!
//! - Welch PSD peak and relative band power per configured band
//! - Multilevel discrete wavelet energies (Haar, db2, db4)
//! - Hjorth mobility and complexity
//! - Statistical moments and difference means
//! - Higuchi and Petrosian fractal dimensions
//! - Parallel batch processing with a schema-checked output table
//!
//! Every failure is a typed [`FeatureError`]; no feature is ever silently
//! replaced by NaN.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use eeg_features::config::AnalysisConfig;
//! use eeg_features::processing::BatchFeatureProcessor;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnalysisConfig {
//!         num_channels: 2,
//!         ..AnalysisConfig::default()
//!     };
//!     let segments = eeg_features::io::read_segments("segments.csv", true)?;
//!
//!     let processor = BatchFeatureProcessor::new(config)?;
//!     let report = processor.process(&segments)?;
//!     eeg_features::io::write_csv("features.csv", &report.table)?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod error;
pub mod io;
pub mod processing;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{AnalysisConfig, ConfigLoader, FrequencyBand, FrequencyBands, RowErrorPolicy};
pub use error::{ErrorContext, ErrorKind, FeatureError, FeatureResult};
pub use processing::{
    BatchFeatureProcessor, BatchReport, ChannelFeatureAggregator, FeatureRecord, FeatureTable, RowError,
    SegmentFeatureExtractor,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Per-segment EEG feature extraction".to_string(),
        features: vec![
            "Welch band power".to_string(),
            "Wavelet energy".to_string(),
            "Hjorth parameters".to_string(),
            "Statistical moments".to_string(),
            "Fractal dimensions".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// List of feature families
    pub features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert_eq!(info.name, NAME);
        assert_eq!(info.version, VERSION);
        assert_eq!(info.features.len(), 5);
    }

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "eeg-features");
    }
}
