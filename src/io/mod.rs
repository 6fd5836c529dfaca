// src/io/mod.rs
//! Table input and output
//!
//! Input is a CSV of flattened segments, one per row. Output is the feature
//! table as CSV or JSON, plus an optional CSV report of skipped segments.

pub mod table;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};
use crate::processing::FeatureTable;

pub use table::{
    read_segments,
    read_segments_from,
    write_csv,
    write_csv_to,
    write_error_report,
    write_error_report_to,
    write_json,
    write_json_to,
    ERROR_REPORT_HEADER,
};

/// Feature table serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(FeatureError::configuration(
                "format",
                format!("unknown output format '{}', expected csv or json", other),
            )),
        }
    }
}

/// Write `table` to `path` in the requested format
pub fn write_table<P: AsRef<Path>>(path: P, table: &FeatureTable, format: OutputFormat) -> FeatureResult<()> {
    match format {
        OutputFormat::Csv => write_csv(path, table),
        OutputFormat::Json => write_json(path, table),
    }
}
