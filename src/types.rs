//! Shared types for the cleaning pipeline.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical label for the experimental or control condition of a
/// measured object. Assigned once per source file, immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleType {
    Sis,
    Ubm,
    Cardiac,
    M0,
    M1,
    M2,
    /// No pattern matched the source file name.
    Unknown,
}

impl SampleType {
    /// The label string written into the sample-type column.
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleType::Sis => "SIS",
            SampleType::Ubm => "UBM",
            SampleType::Cardiac => "Cardiac",
            SampleType::M0 => "M0",
            SampleType::M1 => "M1",
            SampleType::M2 => "M2",
            SampleType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partition of a table's columns into metadata and feature columns.
///
/// Computed once per table by the classifier and passed explicitly to the
/// later stages; no stage re-derives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPartition {
    /// Identifier, plate/well/field coordinate, and sample-type columns.
    pub meta: Vec<String>,
    /// Everything else; numeric after cleaning.
    pub features: Vec<String>,
}

impl ColumnPartition {
    /// Whether a column was classified as metadata.
    pub fn is_meta(&self, name: &str) -> bool {
        self.meta.iter().any(|m| m == name)
    }
}

/// Per-table summary of what cleaning did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    /// Source file stem or caller-supplied table name.
    pub name: String,
    /// Label carried by this table's rows.
    pub sample_type: String,
    pub rows_before: usize,
    pub rows_after: usize,
    /// Feature columns log-transformed for heavy skew.
    pub log_transformed: Vec<String>,
    /// Feature columns square-root-transformed for moderate skew.
    pub sqrt_transformed: Vec<String>,
    /// Outlier values replaced in place with `ln(1 + v)`.
    pub values_clipped: usize,
    /// Rows dropped by outlier resolution.
    pub rows_dropped: usize,
}

impl TableReport {
    pub fn new(name: impl Into<String>, sample_type: impl Into<String>, rows: usize) -> Self {
        Self {
            name: name.into(),
            sample_type: sample_type.into(),
            rows_before: rows,
            rows_after: rows,
            log_transformed: Vec::new(),
            sqrt_transformed: Vec::new(),
            values_clipped: 0,
            rows_dropped: 0,
        }
    }
}

/// Terminal artifact of a pipeline run.
#[derive(Debug)]
pub struct PrepResult {
    /// Concatenation of all cleaned per-file tables, un-normalized.
    /// Consumed externally for feature-group extraction.
    pub merged: DataFrame,
    /// The merged dataset after z-score normalization.
    pub normalized: DataFrame,
    /// Columns excluded from normalization for having zero variance.
    pub constant_columns: Vec<String>,
    /// One report per input table, in processing order.
    pub reports: Vec<TableReport>,
    /// Human-readable log of what the pipeline did.
    pub processing_steps: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_type_display() {
        assert_eq!(SampleType::Sis.to_string(), "SIS");
        assert_eq!(SampleType::Cardiac.to_string(), "Cardiac");
        assert_eq!(SampleType::M0.to_string(), "M0");
        assert_eq!(SampleType::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_partition_is_meta() {
        let partition = ColumnPartition {
            meta: vec!["Well ID".to_string(), "Sample Type".to_string()],
            features: vec!["CellArea".to_string()],
        };
        assert!(partition.is_meta("Well ID"));
        assert!(!partition.is_meta("CellArea"));
    }
}
