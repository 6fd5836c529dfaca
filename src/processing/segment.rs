// src/processing/segment.rs
//! Segment reshaping and cross-channel aggregation

use std::borrow::Cow;

use ndarray::ArrayView2;
use tracing::trace;

use crate::config::AnalysisConfig;
use crate::error::{ErrorContext, FeatureError, FeatureResult};
use crate::processing::features::ChannelFeatureAggregator;
use crate::processing::record::FeatureRecord;

/// Extracts one record from a flattened multichannel segment
///
/// A segment of `num_channels * samples_per_channel` values is viewed as a
/// channel-major matrix: channel `c` occupies
/// `values[c * samples .. (c + 1) * samples]`.
#[derive(Debug, Clone)]
pub struct SegmentFeatureExtractor {
    aggregator: ChannelFeatureAggregator,
    num_channels: usize,
    samples_per_channel: Option<usize>,
}

impl SegmentFeatureExtractor {
    pub fn new(config: &AnalysisConfig) -> FeatureResult<Self> {
        Ok(Self {
            aggregator: ChannelFeatureAggregator::new(config)?,
            num_channels: config.num_channels,
            samples_per_channel: config.samples_per_channel,
        })
    }

    /// Same extractor with the per-channel length fixed
    pub fn with_samples_per_channel(mut self, samples: usize) -> Self {
        self.samples_per_channel = Some(samples);
        self
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn samples_per_channel(&self) -> Option<usize> {
        self.samples_per_channel
    }

    pub fn aggregator(&self) -> &ChannelFeatureAggregator {
        &self.aggregator
    }

    /// Check the reshape invariant and return the per-channel length
    pub fn validate_shape(&self, len: usize) -> FeatureResult<usize> {
        let reason = match self.samples_per_channel {
            Some(samples) if len == self.num_channels * samples => return Ok(samples),
            Some(samples) => format!(
                "expected {} x {} = {} values",
                self.num_channels,
                samples,
                self.num_channels * samples
            ),
            None if len > 0 && len % self.num_channels == 0 => return Ok(len / self.num_channels),
            None if len == 0 => "segment is empty".to_string(),
            None => format!("{} is not a multiple of {}", len, self.num_channels),
        };
        Err(FeatureError::ShapeMismatch {
            num_channels: self.num_channels,
            actual_len: len,
            reason,
            context: ErrorContext::new(),
        })
    }

    /// View a flat segment as `(channels, samples)` without copying
    pub fn reshape<'a>(&self, segment: &'a [f64]) -> FeatureResult<ArrayView2<'a, f64>> {
        let samples = self.validate_shape(segment.len())?;
        ArrayView2::from_shape((self.num_channels, samples), segment).map_err(|e| {
            FeatureError::ShapeMismatch {
                num_channels: self.num_channels,
                actual_len: segment.len(),
                reason: e.to_string(),
                context: ErrorContext::new(),
            }
        })
    }

    /// Extract the features of every channel, channel 0 first
    pub fn extract(&self, segment: &[f64]) -> FeatureResult<FeatureRecord> {
        let view = self.reshape(segment)?;
        let mut record = FeatureRecord::with_capacity(self.num_channels * self.aggregator.feature_count());

        for (channel, row) in view.outer_iter().enumerate() {
            let samples: Cow<'_, [f64]> = match row.as_slice() {
                Some(slice) => Cow::Borrowed(slice),
                None => Cow::Owned(row.to_vec()),
            };
            let channel_record = self.aggregator.extract(&samples, channel)?;
            trace!(channel, features = channel_record.len(), "Channel extracted");
            record.extend(channel_record);
        }

        Ok(record)
    }
}
