// src/processing/record.rs
//! Feature records and the schema-checked output table

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::error::{ErrorContext, FeatureError, FeatureResult};

/// Ordered mapping from feature name to value
///
/// Insertion order is the column order; names are unique within a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            names: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Build from parallel name and value lists of equal length
    pub(crate) fn from_parts(names: Vec<String>, values: Vec<f64>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.names.push(name.into());
        self.values.push(value);
    }

    /// Append every entry of `other`, keeping its order
    pub fn extend(&mut self, other: FeatureRecord) {
        self.names.extend(other.names);
        self.values.extend(other.values);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names.iter().position(|n| n == name).map(|i| self.values[i])
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names.iter().map(String::as_str).zip(self.values.iter().copied())
    }
}

impl Serialize for FeatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// One output row
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Zero-based row of the input table this row came from
    pub segment_index: usize,
    pub record: FeatureRecord,
}

impl Serialize for FeatureRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_struct("FeatureRow", 2)?;
        row.serialize_field("segment_index", &self.segment_index)?;
        row.serialize_field("features", &self.record)?;
        row.end()
    }
}

/// Output table whose rows all share one key set
///
/// The first pushed record fixes the schema.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, rejecting any key set that differs from the schema
    pub fn push(&mut self, segment_index: usize, record: FeatureRecord) -> FeatureResult<()> {
        if self.rows.is_empty() && self.columns.is_empty() {
            self.columns = record.names().to_vec();
        } else if record.names() != self.columns.as_slice() {
            return Err(self.schema_error(segment_index, &record));
        }
        self.rows.push(FeatureRow { segment_index, record });
        Ok(())
    }

    fn schema_error(&self, segment_index: usize, record: &FeatureRecord) -> FeatureError {
        let detail = match record
            .names()
            .iter()
            .zip(&self.columns)
            .position(|(actual, expected)| actual != expected)
        {
            Some(i) => format!(
                "column {} is '{}', expected '{}'",
                i, record.names()[i], self.columns[i]
            ),
            None if record.len() > self.columns.len() => {
                format!("unexpected column '{}'", record.names()[self.columns.len()])
            }
            None => format!("missing column '{}'", self.columns[record.len()]),
        };
        FeatureError::SchemaMismatch {
            expected_columns: self.columns.len(),
            actual_columns: record.len(),
            detail,
            context: ErrorContext::for_segment(segment_index),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Segment indices of the emitted rows, in order
    pub fn segment_indices(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row.segment_index).collect()
    }

    /// All values of one column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row.record.values()[index]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(names: &[&str]) -> FeatureRecord {
        let mut record = FeatureRecord::new();
        for (i, name) in names.iter().enumerate() {
            record.push(*name, i as f64);
        }
        record
    }

    #[test]
    fn test_record_preserves_order() {
        let mut rec = record(&["b", "a"]);
        rec.extend(record(&["c"]));

        assert_eq!(rec.names(), &["b", "a", "c"]);
        assert_eq!(rec.get("a"), Some(1.0));
        assert_eq!(rec.get("c"), Some(0.0));
        assert_eq!(rec.get("missing"), None);
    }

    #[test]
    fn test_table_accepts_matching_schema() {
        let mut table = FeatureTable::new();
        table.push(0, record(&["x", "y"])).unwrap();
        table.push(2, record(&["x", "y"])).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns(), &["x", "y"]);
        assert_eq!(table.segment_indices(), vec![0, 2]);
        assert_eq!(table.column("y"), Some(vec![1.0, 1.0]));
    }

    #[test]
    fn test_table_rejects_divergent_schema() {
        let mut table = FeatureTable::new();
        table.push(0, record(&["x", "y"])).unwrap();

        let err = table.push(1, record(&["x", "z"])).unwrap_err();
        match err {
            FeatureError::SchemaMismatch { expected_columns, actual_columns, ref detail, context } => {
                assert_eq!(expected_columns, 2);
                assert_eq!(actual_columns, 2);
                assert!(detail.contains("'z'"));
                assert_eq!(context.segment, Some(1));
            }
            other => panic!("Expected SchemaMismatch, got {:?}", other),
        }

        assert!(matches!(
            table.push(1, record(&["x"])),
            Err(FeatureError::SchemaMismatch { actual_columns: 1, .. })
        ));
        assert!(matches!(
            table.push(1, record(&["x", "y", "w"])),
            Err(FeatureError::SchemaMismatch { actual_columns: 3, .. })
        ));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_row_serializes_with_ordered_features() {
        let row = FeatureRow {
            segment_index: 4,
            record: record(&["b", "a"]),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"segment_index":4,"features":{"b":0.0,"a":1.0}}"#);
    }
}
