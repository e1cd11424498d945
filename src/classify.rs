//! Column classification: metadata vs. feature columns.
//!
//! A column is metadata when its (trimmed) name matches any of the
//! configured identifier patterns, or when it is the sample-type label
//! column. Classification runs once per table; the resulting partition is
//! passed to every later stage instead of being re-derived.

use crate::config::PrepConfig;
use crate::error::{PrepError, Result};
use crate::types::ColumnPartition;
use polars::prelude::*;
use regex::RegexBuilder;
use tracing::debug;

/// Partitions a table's columns via declarative, case-insensitive patterns.
pub struct ColumnClassifier {
    patterns: Vec<regex::Regex>,
    label_columns: Vec<String>,
}

impl ColumnClassifier {
    /// Compile the metadata patterns from a configuration.
    pub fn from_config(config: &PrepConfig) -> Result<Self> {
        Self::new(&config.meta_patterns, &config.sample_type_aliases)
    }

    /// Compile the given metadata patterns. `label_columns` are treated as
    /// metadata regardless of the patterns.
    pub fn new(patterns: &[String], label_columns: &[String]) -> Result<Self> {
        let compiled = patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        PrepError::InvalidConfig(format!("bad metadata pattern '{p}': {e}"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns: compiled,
            label_columns: label_columns.to_vec(),
        })
    }

    /// Whether a single column name is metadata.
    pub fn is_meta(&self, name: &str) -> bool {
        self.label_columns.iter().any(|l| l == name)
            || self.patterns.iter().any(|p| p.is_match(name))
    }

    /// Partition the table's columns. Pure function of column names.
    pub fn classify(&self, df: &DataFrame) -> ColumnPartition {
        let mut meta = Vec::new();
        let mut features = Vec::new();

        for name in df.get_column_names() {
            if self.is_meta(name.as_str()) {
                meta.push(name.to_string());
            } else {
                features.push(name.to_string());
            }
        }

        debug!(
            "Classified {} metadata and {} feature columns",
            meta.len(),
            features.len()
        );
        ColumnPartition { meta, features }
    }
}

/// Trim whitespace from every column header in place.
pub fn clean_column_names(df: &mut DataFrame) -> Result<()> {
    let trimmed: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.trim().to_string())
        .collect();
    df.set_column_names(trimmed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrepConfig;

    fn classifier() -> ColumnClassifier {
        ColumnClassifier::from_config(&PrepConfig::default()).unwrap()
    }

    #[test]
    fn test_classify_partitions_columns() {
        let df = df![
            "Experiment" => ["e1", "e1"],
            "Well ID" => ["A1", "A2"],
            "Sample Type" => ["M0", "M0"],
            "CellArea" => [10.0, 12.0],
            "NucIntensityAct" => [0.5, 0.7],
        ]
        .unwrap();

        let partition = classifier().classify(&df);
        assert_eq!(partition.meta, vec!["Experiment", "Well ID", "Sample Type"]);
        assert_eq!(partition.features, vec!["CellArea", "NucIntensityAct"]);
    }

    #[test]
    fn test_numeric_metadata_stays_metadata() {
        // "Row" and "Column" are plate coordinates even though numeric.
        let df = df![
            "Row" => [1, 2],
            "Column" => [3, 4],
            "CellArea" => [10.0, 12.0],
        ]
        .unwrap();

        let partition = classifier().classify(&df);
        assert_eq!(partition.meta, vec!["Row", "Column"]);
        assert_eq!(partition.features, vec!["CellArea"]);
    }

    #[test]
    fn test_patterns_are_case_insensitive_substrings() {
        let c = classifier();
        assert!(c.is_meta("Object Number (per well)"));
        assert!(c.is_meta("PLATE id"));
        assert!(c.is_meta("unique ID"));
        assert!(!c.is_meta("CellArea"));
    }

    #[test]
    fn test_label_alias_is_meta() {
        let c = classifier();
        assert!(c.is_meta("Sample Type"));
        assert!(c.is_meta("sample_type"));
    }

    #[test]
    fn test_clean_column_names_trims() {
        let mut df = df![
            " CellArea " => [1.0],
            "Well ID" => ["A1"],
        ]
        .unwrap();
        clean_column_names(&mut df).unwrap();

        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["CellArea", "Well ID"]);
    }

    #[test]
    fn test_bad_pattern_is_config_error() {
        let result = ColumnClassifier::new(&["(".to_string()], &[]);
        assert!(matches!(result, Err(PrepError::InvalidConfig(_))));
    }
}
