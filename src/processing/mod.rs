// src/processing/mod.rs
//! Feature extraction pipeline for segmented EEG data

pub mod batch;
pub mod features;
pub mod record;
pub mod segment;

pub use batch::{BatchFeatureProcessor, BatchReport, BatchStats, RowError};
pub use features::*;
pub use record::{FeatureRecord, FeatureRow, FeatureTable};
pub use segment::SegmentFeatureExtractor;
