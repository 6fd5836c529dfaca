// src/processing/batch.rs
//! Batch feature extraction over a table of segments
//!
//! Segments are extracted in parallel on a bounded rayon pool, then walked
//! once in input order to build the schema-checked table and apply the row
//! error policy. Output order never depends on scheduling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, warn};

use crate::config::{AnalysisConfig, RowErrorPolicy};
use crate::error::{FeatureError, FeatureResult};
use crate::processing::record::{FeatureRecord, FeatureTable};
use crate::processing::segment::SegmentFeatureExtractor;

/// A segment that was left out of the table
#[derive(Debug)]
pub struct RowError {
    pub segment_index: usize,
    pub error: FeatureError,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub table: FeatureTable,
    /// Skipped segments in input order; always empty under `Abort`
    pub errors: Vec<RowError>,
    pub stats: BatchStats,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.table.len()
    }

    pub fn skipped(&self) -> usize {
        self.errors.len()
    }
}

/// Batch processing statistics
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub segments: usize,
    pub produced: usize,
    pub skipped: usize,
    pub elapsed_ms: f64,
}

/// Runs [`SegmentFeatureExtractor`] over every segment of a batch
pub struct BatchFeatureProcessor {
    config: AnalysisConfig,
    pool: ThreadPool,
}

impl std::fmt::Debug for BatchFeatureProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchFeatureProcessor")
            .field("config", &self.config)
            .field("workers", &self.pool.current_num_threads())
            .finish()
    }
}

impl BatchFeatureProcessor {
    pub fn new(config: AnalysisConfig) -> FeatureResult<Self> {
        config.validate()?;

        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("eeg-features-{}", i));
        if let Some(workers) = config.workers {
            builder = builder.num_threads(workers);
        }
        let pool = builder
            .build()
            .map_err(|e| FeatureError::configuration("workers", e.to_string()))?;

        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Extract features for every segment
    ///
    /// Under [`RowErrorPolicy::Abort`] the error of the lowest failing
    /// segment is returned and no table is produced. Under
    /// [`RowErrorPolicy::SkipAndReport`] failing segments are collected in
    /// [`BatchReport::errors`].
    pub fn process<S: AsRef<[f64]> + Sync>(&self, segments: &[S]) -> FeatureResult<BatchReport> {
        let start = Instant::now();
        let policy = self.config.on_schema_mismatch;

        info!(
            segments = segments.len(),
            workers = self.workers(),
            ?policy,
            "Starting batch feature extraction"
        );

        let extractor = SegmentFeatureExtractor::new(&self.config)?;
        let results = if extractor.samples_per_channel().is_some() {
            self.extract_all(&extractor, segments, 0, policy)
        } else {
            self.extract_with_pinned_geometry(extractor, segments, policy)
        };

        let mut report = BatchReport::default();
        for (segment_index, result) in results.into_iter().enumerate() {
            // Skipped past an earlier failure; only possible under Abort
            let Some(result) = result else { continue };

            let outcome = result.and_then(|record| report.table.push(segment_index, record));
            if let Err(error) = outcome {
                let error = error.at_segment(segment_index);
                match policy {
                    RowErrorPolicy::Abort => {
                        warn!(segment_index, %error, "Aborting batch");
                        return Err(error);
                    }
                    RowErrorPolicy::SkipAndReport => {
                        warn!(segment_index, kind = %error.kind(), %error, "Skipping segment");
                        report.errors.push(RowError { segment_index, error });
                    }
                }
            }
        }

        let stats = BatchStats {
            segments: segments.len(),
            produced: report.processed(),
            skipped: report.skipped(),
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        info!(
            segments = stats.segments,
            produced = stats.produced,
            skipped = stats.skipped,
            elapsed_ms = stats.elapsed_ms,
            "Batch feature extraction complete"
        );

        report.stats = stats;
        Ok(report)
    }

    /// Pin the per-channel length from the first segment that extracts
    ///
    /// Segments are tried in input order until one succeeds; its length fixes
    /// the geometry for the rest of the batch. Failing segments before it keep
    /// their own errors. Under `Abort` the first failure ends the scan.
    fn extract_with_pinned_geometry<S: AsRef<[f64]> + Sync>(
        &self,
        extractor: SegmentFeatureExtractor,
        segments: &[S],
        policy: RowErrorPolicy,
    ) -> Vec<Option<FeatureResult<FeatureRecord>>> {
        let mut results = Vec::with_capacity(segments.len());

        for (segment_index, segment) in segments.iter().enumerate() {
            let segment = segment.as_ref();
            let result = extractor.extract(segment);
            let failed = result.is_err();
            results.push(Some(result));

            if !failed {
                let samples = segment.len() / extractor.num_channels();
                debug!(segment_index, samples_per_channel = samples, "Pinned channel length");
                let pinned = extractor.clone().with_samples_per_channel(samples);
                let rest = self.extract_all(&pinned, &segments[segment_index + 1..], segment_index + 1, policy);
                results.extend(rest);
                return results;
            }
            if policy == RowErrorPolicy::Abort {
                break;
            }
        }

        results.resize_with(segments.len(), || None);
        results
    }

    fn extract_all<S: AsRef<[f64]> + Sync>(
        &self,
        extractor: &SegmentFeatureExtractor,
        segments: &[S],
        offset: usize,
        policy: RowErrorPolicy,
    ) -> Vec<Option<FeatureResult<FeatureRecord>>> {
        let first_failure = AtomicUsize::new(usize::MAX);

        self.pool.install(|| {
            segments
                .par_iter()
                .enumerate()
                .map(|(position, segment)| {
                    let segment_index = offset + position;
                    if policy == RowErrorPolicy::Abort
                        && segment_index > first_failure.load(Ordering::Relaxed)
                    {
                        return None;
                    }

                    let result = extractor.extract(segment.as_ref());
                    match result {
                        Ok(ref record) => {
                            debug!(segment_index, features = record.len(), "Segment extracted");
                        }
                        Err(_) => {
                            first_failure.fetch_min(segment_index, Ordering::Relaxed);
                        }
                    }
                    Some(result)
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn segment(num_channels: usize, samples: usize, freq: f64) -> Vec<f64> {
        (0..num_channels * samples)
            .map(|n| {
                let t = (n % samples) as f64 / 256.0;
                (2.0 * PI * freq * t).sin() + 0.1 * (2.0 * PI * 3.0 * (n / samples + 1) as f64 * t).cos()
            })
            .collect()
    }

    fn config(policy: RowErrorPolicy) -> AnalysisConfig {
        AnalysisConfig {
            num_channels: 2,
            on_schema_mismatch: policy,
            workers: Some(2),
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_preserves_input_order() {
        let processor = BatchFeatureProcessor::new(config(RowErrorPolicy::Abort)).unwrap();
        let segments: Vec<Vec<f64>> = (0..6).map(|i| segment(2, 512, 5.0 + i as f64)).collect();

        let report = processor.process(&segments).unwrap();
        assert_eq!(report.table.segment_indices(), vec![0, 1, 2, 3, 4, 5]);
        assert!(report.errors.is_empty());

        let peaks = report.table.column("Ch0_Max_Power_Freq").unwrap();
        assert_eq!(peaks, vec![5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
    }

    #[test]
    fn test_abort_returns_lowest_failing_segment() {
        let processor = BatchFeatureProcessor::new(config(RowErrorPolicy::Abort)).unwrap();
        let mut segments: Vec<Vec<f64>> = (0..5).map(|_| segment(2, 512, 10.0)).collect();
        segments[3] = vec![0.0; 1024];
        segments[1] = segment(2, 500, 10.0);

        let err = processor.process(&segments).unwrap_err();
        assert!(matches!(err, FeatureError::ShapeMismatch { .. }));
        assert_eq!(err.context().and_then(|c| c.segment), Some(1));
    }

    #[test]
    fn test_skip_and_report_keeps_going() {
        let processor = BatchFeatureProcessor::new(config(RowErrorPolicy::SkipAndReport)).unwrap();
        let mut segments: Vec<Vec<f64>> = (0..4).map(|_| segment(2, 512, 10.0)).collect();
        segments[2] = vec![0.0; 1024];

        let report = processor.process(&segments).unwrap();
        assert_eq!(report.table.segment_indices(), vec![0, 1, 3]);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.stats.segments, 4);
        assert_eq!(report.stats.produced, 3);
        assert_eq!(report.errors[0].segment_index, 2);
        assert_eq!(report.errors[0].error.metric(), Some("Hjorth_Mobility"));
        assert_eq!(
            report.errors[0].error.context().map(|c| (c.segment, c.channel)),
            Some((Some(2), Some(0)))
        );
    }

    #[test]
    fn test_geometry_pinned_from_first_extractable_segment() {
        let processor = BatchFeatureProcessor::new(config(RowErrorPolicy::SkipAndReport)).unwrap();

        // Odd-length first row cannot fix the geometry; the 2 x 512 row does
        let segments = vec![vec![0.5; 1001], segment(2, 512, 10.0), segment(2, 1024, 10.0)];
        let report = processor.process(&segments).unwrap();
        assert_eq!(report.table.segment_indices(), vec![1]);
        let skipped: Vec<usize> = report.errors.iter().map(|e| e.segment_index).collect();
        assert_eq!(skipped, vec![0, 2]);
        assert!(matches!(
            report.errors[1].error,
            FeatureError::ShapeMismatch { actual_len: 2048, .. }
        ));

        // A well-shaped but failing first row does not fix the geometry either
        let segments = vec![vec![0.0; 1200], segment(2, 512, 10.0), segment(2, 512, 11.0), segment(2, 512, 12.0)];
        let report = processor.process(&segments).unwrap();
        assert_eq!(report.table.segment_indices(), vec![1, 2, 3]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].segment_index, 0);
        assert_eq!(report.errors[0].error.metric(), Some("Hjorth_Mobility"));
    }

    #[test]
    fn test_abort_before_geometry_is_pinned() {
        let processor = BatchFeatureProcessor::new(config(RowErrorPolicy::Abort)).unwrap();
        let segments = vec![vec![0.5; 1001], segment(2, 512, 10.0), segment(2, 512, 10.0)];

        let err = processor.process(&segments).unwrap_err();
        assert!(matches!(err, FeatureError::ShapeMismatch { actual_len: 1001, .. }));
        assert_eq!(err.context().and_then(|c| c.segment), Some(0));
    }

    #[test]
    fn test_empty_batch() {
        let processor = BatchFeatureProcessor::new(config(RowErrorPolicy::Abort)).unwrap();
        let report = processor.process::<Vec<f64>>(&[]).unwrap();
        assert!(report.table.is_empty());
        assert!(report.table.columns().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = config(RowErrorPolicy::Abort);
        bad.workers = Some(0);
        assert!(matches!(
            BatchFeatureProcessor::new(bad),
            Err(FeatureError::Configuration { .. })
        ));
    }
}
