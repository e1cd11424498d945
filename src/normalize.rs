//! Z-score normalization of the merged dataset.
//!
//! Each feature column is centered on its mean and scaled by its
//! population standard deviation, computed over the merged frame so every
//! sample type shares one scale. Metadata columns, the configured
//! exclusion list, and zero-variance columns are left untouched; constant
//! columns are additionally reported so a run summary can surface them.

use crate::classify::ColumnClassifier;
use crate::config::PrepConfig;
use crate::error::Result;
use crate::stats;
use crate::utils::{is_numeric_dtype, numeric_slots, numeric_values};
use polars::prelude::*;
use tracing::{debug, warn};

/// Z-scores the feature columns of a merged frame.
pub struct Normalizer {
    exclude: Vec<String>,
}

impl Normalizer {
    pub fn from_config(config: &PrepConfig) -> Self {
        Self {
            exclude: config.normalize_exclude.clone(),
        }
    }

    /// Normalize every eligible column of `df`.
    ///
    /// Skipped: non-numeric columns, metadata per the classifier, the
    /// exclusion list, and constant columns. Null slots stay null; the
    /// mean and standard deviation are computed over the non-null values.
    ///
    /// Returns the normalized frame and the names of the constant columns
    /// that were left out.
    pub fn normalize(
        &self,
        df: &DataFrame,
        classifier: &ColumnClassifier,
    ) -> Result<(DataFrame, Vec<String>)> {
        let mut out = df.clone();
        let mut constant_columns = Vec::new();
        let mut normalized = 0usize;

        for column in df.get_columns() {
            let name = column.name().to_string();
            if self.is_excluded(&name) || classifier.is_meta(&name) {
                continue;
            }
            if !is_numeric_dtype(column.dtype()) {
                continue;
            }

            let series = column.as_materialized_series();
            let values = numeric_values(series)?;
            let std = stats::population_std(&values);
            if std == 0.0 {
                warn!("Column '{name}' has zero variance; excluded from normalization");
                constant_columns.push(name);
                continue;
            }
            let mean = stats::mean(&values);

            let scaled: Vec<Option<f64>> = numeric_slots(series)?
                .into_iter()
                .map(|opt| opt.map(|v| (v - mean) / std))
                .collect();
            out.replace(&name, Series::new(name.as_str().into(), scaled))?;
            normalized += 1;
        }

        debug!(
            "Normalized {normalized} columns, {} constant columns excluded",
            constant_columns.len()
        );
        Ok((out, constant_columns))
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|e| e == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrepConfig;

    fn setup() -> (Normalizer, ColumnClassifier) {
        let config = PrepConfig::default();
        let classifier = ColumnClassifier::from_config(&config).unwrap();
        (Normalizer::from_config(&config), classifier)
    }

    fn column_values(df: &DataFrame, name: &str) -> Vec<f64> {
        numeric_values(df.column(name).unwrap().as_materialized_series()).unwrap()
    }

    #[test]
    fn test_zscores_feature_columns() {
        let (normalizer, classifier) = setup();
        let df = df![
            "Sample Type" => ["M0", "M0", "M0", "M0", "M0"],
            "CellArea" => [1.0, 2.0, 3.0, 4.0, 5.0],
        ]
        .unwrap();

        let (out, constants) = normalizer.normalize(&df, &classifier).unwrap();
        assert!(constants.is_empty());

        let values = column_values(&out, "CellArea");
        // Population std of 1..=5 is sqrt(2); first value (1-3)/sqrt(2).
        assert!((values[0] + 2.0 / 2.0f64.sqrt()).abs() < 1e-12);
        assert!(stats::mean(&values).abs() < 1e-12);
        assert!((stats::population_std(&values) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_metadata_and_excluded_columns_untouched() {
        let (normalizer, classifier) = setup();
        let df = df![
            "Row" => [1.0, 2.0, 3.0],
            "Sample Type" => ["SIS", "SIS", "SIS"],
            "CellArea" => [1.0, 2.0, 3.0],
        ]
        .unwrap();

        let (out, _) = normalizer.normalize(&df, &classifier).unwrap();
        // "Row" is a plate coordinate: numeric but never rescaled.
        assert_eq!(column_values(&out, "Row"), vec![1.0, 2.0, 3.0]);
        assert_ne!(column_values(&out, "CellArea"), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_constant_column_reported_and_untouched() {
        let (normalizer, classifier) = setup();
        let df = df![
            "CellArea" => [1.0, 2.0, 3.0],
            "Flatness" => [7.0, 7.0, 7.0],
        ]
        .unwrap();

        let (out, constants) = normalizer.normalize(&df, &classifier).unwrap();
        assert_eq!(constants, vec!["Flatness"]);
        assert_eq!(column_values(&out, "Flatness"), vec![7.0, 7.0, 7.0]);
    }

    #[test]
    fn test_null_slots_stay_null() {
        let (normalizer, classifier) = setup();
        let series = Series::new("CellArea".into(), &[Some(1.0), None, Some(3.0)]);
        let df = DataFrame::new(vec![series.into()]).unwrap();

        let (out, _) = normalizer.normalize(&df, &classifier).unwrap();
        let column = out.column("CellArea").unwrap();
        assert_eq!(column.null_count(), 1);
        let values = column_values(&out, "CellArea");
        // Mean 2, population std 1 over the two present values.
        assert_eq!(values, vec![-1.0, 1.0]);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let (normalizer, classifier) = setup();
        let df = df![
            "CellArea" => [1.0, 2.0, 3.0, 4.0, 10.0],
        ]
        .unwrap();

        let (once, _) = normalizer.normalize(&df, &classifier).unwrap();
        let (twice, _) = normalizer.normalize(&once, &classifier).unwrap();

        let a = column_values(&once, "CellArea");
        let b = column_values(&twice, "CellArea");
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-12);
        }
    }
}
