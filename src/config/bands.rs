// src/config/bands.rs
//! Named frequency bands
//!
//! Bands are configured as a `name = [low, high]` table. Tables carry no
//! reliable ordering once they pass through a configuration layer, so the
//! band list is kept in a canonical order (ascending low edge, then name).
//! Output column order depends on it.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::config::constants::CANONICAL_BANDS;
use crate::error::{FeatureError, FeatureResult};

/// A named frequency range in Hz, inclusive on both edges
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyBand {
    pub name: String,
    pub low_hz: f64,
    pub high_hz: f64,
}

impl FrequencyBand {
    pub fn new(name: impl Into<String>, low_hz: f64, high_hz: f64) -> Self {
        Self { name: name.into(), low_hz, high_hz }
    }

    /// Whether `freq` lies inside the band (both edges included)
    pub fn contains(&self, freq: f64) -> bool {
        freq >= self.low_hz && freq <= self.high_hz
    }

    fn validate(&self) -> FeatureResult<()> {
        let field = format!("frequency_bands.{}", self.name);
        if self.name.is_empty() {
            return Err(FeatureError::configuration("frequency_bands", "band names must not be empty"));
        }
        if !self.low_hz.is_finite() || !self.high_hz.is_finite() {
            return Err(FeatureError::configuration(field, "band edges must be finite"));
        }
        if self.low_hz < 0.0 {
            return Err(FeatureError::configuration(field, "low edge must not be negative"));
        }
        if self.low_hz >= self.high_hz {
            return Err(FeatureError::configuration(field, "low edge must be below high edge"));
        }
        Ok(())
    }
}

/// Ordered set of frequency bands
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyBands(Vec<FrequencyBand>);

impl FrequencyBands {
    /// Build a band set, sorting into canonical order
    pub fn new(mut bands: Vec<FrequencyBand>) -> Self {
        bands.sort_by(|a, b| a.low_hz.total_cmp(&b.low_hz).then_with(|| a.name.cmp(&b.name)));
        Self(bands)
    }

    /// Delta, Theta, Alpha, Beta, Gamma
    pub fn canonical() -> Self {
        Self::new(
            CANONICAL_BANDS
                .iter()
                .map(|&(name, low, high)| FrequencyBand::new(name, low, high))
                .collect(),
        )
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FrequencyBand> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FrequencyBand> {
        self.0.iter().find(|band| band.name == name)
    }

    /// Check every band and reject duplicate names
    pub fn validate(&self) -> FeatureResult<()> {
        if self.0.is_empty() {
            return Err(FeatureError::configuration("frequency_bands", "at least one band is required"));
        }
        for (i, band) in self.0.iter().enumerate() {
            band.validate()?;
            if self.0[..i].iter().any(|other| other.name == band.name) {
                return Err(FeatureError::configuration(
                    format!("frequency_bands.{}", band.name),
                    "duplicate band name",
                ));
            }
        }
        Ok(())
    }
}

impl Default for FrequencyBands {
    fn default() -> Self {
        Self::canonical()
    }
}

impl<'a> IntoIterator for &'a FrequencyBands {
    type Item = &'a FrequencyBand;
    type IntoIter = std::slice::Iter<'a, FrequencyBand>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for FrequencyBands {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let table: BTreeMap<&str, [f64; 2]> = self
            .0
            .iter()
            .map(|band| (band.name.as_str(), [band.low_hz, band.high_hz]))
            .collect();
        table.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FrequencyBands {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let table = BTreeMap::<String, Vec<f64>>::deserialize(deserializer)?;
        let mut bands = Vec::with_capacity(table.len());
        for (name, edges) in table {
            match edges.as_slice() {
                [low, high] => bands.push(FrequencyBand::new(name, *low, *high)),
                _ => {
                    return Err(D::Error::custom(format!(
                        "band '{}' must be a [low, high] pair, got {} values",
                        name,
                        edges.len()
                    )))
                }
            }
        }
        Ok(FrequencyBands::new(bands))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    struct Wrapper {
        bands: FrequencyBands,
    }

    #[test]
    fn test_canonical_order() {
        let bands = FrequencyBands::canonical();
        let names: Vec<&str> = bands.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Delta", "Theta", "Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn test_band_edges_inclusive() {
        let alpha = FrequencyBand::new("Alpha", 8.0, 12.0);
        assert!(alpha.contains(8.0));
        assert!(alpha.contains(12.0));
        assert!(!alpha.contains(12.5));
    }

    #[test]
    fn test_deserialize_sorts_by_low_edge() {
        let parsed: Wrapper = toml::from_str(
            r#"
            [bands]
            Beta = [12.0, 30.0]
            Alpha = [8.0, 12.0]
            Mu = [8.0, 13.0]
            "#,
        )
        .unwrap();

        let names: Vec<&str> = parsed.bands.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Mu", "Beta"]);
    }

    #[test]
    fn test_deserialize_rejects_bad_pair() {
        let parsed: Result<Wrapper, _> = toml::from_str("[bands]\nAlpha = [8.0]\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_validation() {
        assert!(FrequencyBands::canonical().validate().is_ok());
        assert!(FrequencyBands::new(vec![]).validate().is_err());
        assert!(FrequencyBands::new(vec![FrequencyBand::new("Bad", 10.0, 5.0)]).validate().is_err());
        assert!(FrequencyBands::new(vec![FrequencyBand::new("Neg", -1.0, 5.0)]).validate().is_err());
    }
}
