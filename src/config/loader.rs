// src/config/loader.rs
//! Configuration loader
//!
//! Layers, lowest priority first: built-in defaults, an optional TOML file,
//! and `EEG_FEATURES_*` environment variables (e.g.
//! `EEG_FEATURES_NUM_CHANNELS=8`). The environment layer only covers scalar
//! options; frequency bands come from the file. The merged result is
//! validated before it is handed out.

use std::path::{Path, PathBuf};

use config::{Config, Environment};
use serde::Deserialize;
use tracing::debug;

use crate::config::constants::ENV_PREFIX;
use crate::config::{AnalysisConfig, RowErrorPolicy};
use crate::error::{FeatureError, FeatureResult};
use crate::processing::features::wavelets::{ExtensionMode, WaveletBasis};

/// Scalar options that may be overridden from the environment
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    sampling_frequency: Option<f64>,
    num_channels: Option<usize>,
    samples_per_channel: Option<usize>,
    wavelet_basis: Option<WaveletBasis>,
    wavelet_levels: Option<usize>,
    wavelet_mode: Option<ExtensionMode>,
    higuchi_kmax: Option<usize>,
    on_schema_mismatch: Option<RowErrorPolicy>,
    workers: Option<usize>,
}

impl EnvOverrides {
    fn apply(self, config: &mut AnalysisConfig) {
        if let Some(value) = self.sampling_frequency {
            config.sampling_frequency = value;
        }
        if let Some(value) = self.num_channels {
            config.num_channels = value;
        }
        if self.samples_per_channel.is_some() {
            config.samples_per_channel = self.samples_per_channel;
        }
        if let Some(value) = self.wavelet_basis {
            config.wavelet_basis = value;
        }
        if let Some(value) = self.wavelet_levels {
            config.wavelet_levels = value;
        }
        if let Some(value) = self.wavelet_mode {
            config.wavelet_mode = value;
        }
        if let Some(value) = self.higuchi_kmax {
            config.higuchi_kmax = value;
        }
        if let Some(value) = self.on_schema_mismatch {
            config.on_schema_mismatch = value;
        }
        if self.workers.is_some() {
            config.workers = self.workers;
        }
    }
}

/// Configuration loader
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    use_environment: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader with defaults and environment overrides only
    pub fn new() -> Self {
        Self {
            path: None,
            use_environment: true,
        }
    }

    /// Add a TOML configuration file layer
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable the environment layer
    pub fn with_environment(mut self, enabled: bool) -> Self {
        self.use_environment = enabled;
        self
    }

    /// Load, merge and validate the configuration
    pub fn load(&self) -> FeatureResult<AnalysisConfig> {
        let mut config = match self.path {
            Some(ref path) => Self::load_file(path)?,
            None => AnalysisConfig::default(),
        };

        if self.use_environment {
            Self::load_environment()?.apply(&mut config);
        }

        config.validate()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Write a configuration to a TOML file
    pub fn export<P: AsRef<Path>>(config: &AnalysisConfig, path: P) -> FeatureResult<()> {
        let content = config.to_toml_string()?;
        std::fs::write(path.as_ref(), content).map_err(|source| FeatureError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    fn load_file(path: &Path) -> FeatureResult<AnalysisConfig> {
        debug!(path = %path.display(), "Loading configuration file");
        let content = std::fs::read_to_string(path).map_err(|source| FeatureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content)
            .map_err(|e| FeatureError::configuration(path.display().to_string(), e.to_string()))
    }

    fn load_environment() -> FeatureResult<EnvOverrides> {
        Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .build()
            .and_then(|merged| merged.try_deserialize::<EnvOverrides>())
            .map_err(|e| FeatureError::configuration("<environment>", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
sampling_frequency = 128.0
num_channels = 4
higuchi_kmax = 8
on_schema_mismatch = "skip-and-report"
"#
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_environment(false)
            .with_file(file.path())
            .load()
            .unwrap();

        assert_eq!(config.sampling_frequency, 128.0);
        assert_eq!(config.num_channels, 4);
        assert_eq!(config.higuchi_kmax, 8);
        assert_eq!(config.on_schema_mismatch, RowErrorPolicy::SkipAndReport);
        assert_eq!(config.wavelet_levels, 4);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ConfigLoader::new()
            .with_environment(false)
            .with_file("/definitely/not/here.toml")
            .load();

        assert!(matches!(result, Err(FeatureError::Io { .. })));
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "num_channels = 0").unwrap();

        let result = ConfigLoader::new().with_environment(false).with_file(file.path()).load();
        assert!(matches!(result, Err(FeatureError::Configuration { .. })));
    }

    #[test]
    fn test_overrides_apply_only_set_fields() {
        let mut config = AnalysisConfig::default();
        let overrides = EnvOverrides {
            num_channels: Some(8),
            wavelet_mode: Some(ExtensionMode::Periodization),
            ..Default::default()
        };
        overrides.apply(&mut config);

        assert_eq!(config.num_channels, 8);
        assert_eq!(config.wavelet_mode, ExtensionMode::Periodization);
        assert_eq!(config.sampling_frequency, 256.0);
        assert_eq!(config.frequency_bands.len(), 5);
    }

    #[test]
    fn test_export_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exported.toml");

        let mut config = AnalysisConfig::default();
        config.num_channels = 3;
        ConfigLoader::export(&config, &path).unwrap();

        let loaded = ConfigLoader::new().with_environment(false).with_file(&path).load().unwrap();
        assert_eq!(loaded, config);
    }
}
