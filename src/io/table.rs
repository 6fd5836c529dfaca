// src/io/table.rs
//! CSV and JSON readers and writers for segment and feature tables

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};
use tracing::debug;

use crate::error::{FeatureError, FeatureResult};
use crate::processing::{FeatureTable, RowError};

/// Column layout of the error report
pub const ERROR_REPORT_HEADER: [&str; 5] = ["segment_index", "kind", "channel", "metric", "message"];

fn csv_error(err: csv::Error) -> FeatureError {
    FeatureError::table(err.to_string())
}

fn open(path: &Path) -> FeatureResult<File> {
    File::open(path).map_err(|source| FeatureError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn create(path: &Path) -> FeatureResult<File> {
    File::create(path).map_err(|source| FeatureError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read segments, one per row, from CSV text
///
/// Rows may differ in length; the reshape check happens per segment during
/// extraction. Every cell must parse as a finite number.
pub fn read_segments_from<R: Read>(reader: R, has_headers: bool) -> FeatureResult<Vec<Vec<f64>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut segments = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let segment = record
            .iter()
            .enumerate()
            .map(|(column, cell)| match cell.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                Ok(_) => Err(FeatureError::table(format!(
                    "row {}, column {}: '{}' is not a finite number",
                    row, column, cell
                ))),
                Err(_) => Err(FeatureError::table(format!(
                    "row {}, column {}: cannot parse '{}' as a number",
                    row, column, cell
                ))),
            })
            .collect::<FeatureResult<Vec<f64>>>()?;
        segments.push(segment);
    }
    Ok(segments)
}

/// Read segments from a CSV file
pub fn read_segments<P: AsRef<Path>>(path: P, has_headers: bool) -> FeatureResult<Vec<Vec<f64>>> {
    let path = path.as_ref();
    let segments = read_segments_from(open(path)?, has_headers)?;
    debug!(path = %path.display(), segments = segments.len(), "Input table loaded");
    Ok(segments)
}

/// Write the feature table as CSV with a header row of feature names
pub fn write_csv_to<W: Write>(writer: W, table: &FeatureTable) -> FeatureResult<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    if !table.columns().is_empty() {
        writer.write_record(table.columns()).map_err(csv_error)?;
    }
    for row in table.rows() {
        writer
            .write_record(row.record.values().iter().map(|v| v.to_string()))
            .map_err(csv_error)?;
    }
    writer.flush().map_err(|e| FeatureError::table(e.to_string()))
}

pub fn write_csv<P: AsRef<Path>>(path: P, table: &FeatureTable) -> FeatureResult<()> {
    write_csv_to(create(path.as_ref())?, table)
}

/// Write the feature table as a JSON array of `{segment_index, features}`
pub fn write_json_to<W: Write>(writer: W, table: &FeatureTable) -> FeatureResult<()> {
    serde_json::to_writer_pretty(writer, table.rows()).map_err(|e| FeatureError::table(e.to_string()))
}

pub fn write_json<P: AsRef<Path>>(path: P, table: &FeatureTable) -> FeatureResult<()> {
    write_json_to(create(path.as_ref())?, table)
}

/// Write skipped segments as `segment_index,kind,channel,metric,message`
pub fn write_error_report_to<W: Write>(writer: W, errors: &[RowError]) -> FeatureResult<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(ERROR_REPORT_HEADER).map_err(csv_error)?;
    for row_error in errors {
        let error = &row_error.error;
        let channel = error
            .context()
            .and_then(|c| c.channel)
            .map(|c| c.to_string())
            .unwrap_or_default();
        writer
            .write_record([
                row_error.segment_index.to_string(),
                error.kind().to_string(),
                channel,
                error.metric().unwrap_or_default().to_string(),
                error.to_string(),
            ])
            .map_err(csv_error)?;
    }
    writer.flush().map_err(|e| FeatureError::table(e.to_string()))
}

pub fn write_error_report<P: AsRef<Path>>(path: P, errors: &[RowError]) -> FeatureResult<()> {
    write_error_report_to(create(path.as_ref())?, errors)
}
