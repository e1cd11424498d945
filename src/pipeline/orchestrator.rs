//! End-to-end cleaning runs.
//!
//! A run takes named tables (or CSV paths), cleans each in isolation, then
//! merges and normalizes the union. Per-table order: header cleanup, label
//! guarantee, column classification, epsilon fill, skew correction,
//! outlier resolution. A table that fails a non-fatal step is skipped with
//! a warning; a fatal error (unresolvable label, empty input) aborts the
//! run so no partial dataset is ever produced.

use crate::classify::{ColumnClassifier, clean_column_names};
use crate::config::PrepConfig;
use crate::error::{PrepError, Result, ResultExt};
use crate::groups;
use crate::normalize::Normalizer;
use crate::outliers::OutlierResolver;
use crate::sample_type::ensure_sample_type;
use crate::skew::{SkewCorrector, SkewTransform};
use crate::types::{PrepResult, TableReport};
use crate::utils::fill_missing_and_zero;
use polars::functions::concat_df_diagonal;
use polars::prelude::*;
use std::path::PathBuf;
use tracing::{info, warn};

/// The cleaning pipeline, configured once and reusable across runs.
pub struct Pipeline {
    config: PrepConfig,
    classifier: ColumnClassifier,
    resolver: OutlierResolver,
    normalizer: Normalizer,
}

impl Pipeline {
    /// Validate the configuration and compile the column classifier.
    pub fn new(config: PrepConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| PrepError::InvalidConfig(e.to_string()))?;
        let classifier = ColumnClassifier::from_config(&config)?;
        let resolver = OutlierResolver::from_config(&config);
        let normalizer = Normalizer::from_config(&config);
        Ok(Self {
            config,
            classifier,
            resolver,
            normalizer,
        })
    }

    /// Run the pipeline over CSV files.
    ///
    /// Table names come from the file stems and drive label derivation for
    /// tables that lack a label column.
    pub fn process_files(&self, paths: &[PathBuf]) -> Result<PrepResult> {
        let mut tables = Vec::with_capacity(paths.len());
        for path in paths {
            let df =
                super::load_table(path).context(format!("reading '{}'", path.display()))?;
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            tables.push((name, df));
        }
        self.process_tables(tables)
    }

    /// Run the pipeline over in-memory tables.
    pub fn process_tables(&self, tables: Vec<(String, DataFrame)>) -> Result<PrepResult> {
        if tables.is_empty() {
            return Err(PrepError::EmptyInput);
        }

        let mut steps = vec![format!("Received {} input table(s)", tables.len())];
        let mut frames = Vec::with_capacity(tables.len());
        let mut reports = Vec::with_capacity(tables.len());

        for (name, df) in tables {
            match self.clean_table(&name, df) {
                Ok((cleaned, report)) => {
                    info!(
                        "Cleaned '{}' ({}): {} -> {} rows",
                        report.name, report.sample_type, report.rows_before, report.rows_after
                    );
                    steps.push(format!(
                        "Cleaned '{}' ({}): {} -> {} rows, {} value(s) clipped",
                        report.name,
                        report.sample_type,
                        report.rows_before,
                        report.rows_after,
                        report.values_clipped
                    ));
                    frames.push(cleaned);
                    reports.push(report);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Skipping table '{name}': {e}");
                    steps.push(format!("Skipped '{name}': {e}"));
                }
            }
        }

        if frames.is_empty() {
            return Err(PrepError::EmptyInput.with_context("every input table failed cleaning"));
        }

        // Column union; a column absent from a table yields nulls there.
        let merged = concat_df_diagonal(&frames)?;
        steps.push(format!(
            "Merged {} table(s): {} rows x {} columns",
            frames.len(),
            merged.height(),
            merged.width()
        ));

        let (normalized, constant_columns) = self.normalizer.normalize(&merged, &self.classifier)?;
        steps.push(format!(
            "Normalized dataset; {} constant column(s) excluded",
            constant_columns.len()
        ));

        if self.config.save_to_disk {
            self.persist(&merged, &normalized, &mut steps)?;
        }

        Ok(PrepResult {
            merged,
            normalized,
            constant_columns,
            reports,
            processing_steps: steps,
        })
    }

    /// Clean one table through the per-table stages.
    fn clean_table(&self, name: &str, mut df: DataFrame) -> Result<(DataFrame, TableReport)> {
        clean_column_names(&mut df)?;
        let label = ensure_sample_type(&mut df, Some(name), &self.config)?;

        let partition = self.classifier.classify(&df);
        if partition.features.is_empty() {
            return Err(PrepError::NoFeatureColumns(name.to_string()));
        }
        let features = self.ordered_features(&partition.features);

        for col in &features {
            let filled = fill_missing_and_zero(
                df.column(col)?.as_materialized_series(),
                self.config.epsilon,
            )?;
            df.replace(col, filled)?;
        }

        let mut report = TableReport::new(name, label, df.height());

        let applied = SkewCorrector::correct_columns(&mut df, &features)?;
        for (col, transform) in applied {
            match transform {
                SkewTransform::Log1p => report.log_transformed.push(col),
                SkewTransform::Sqrt => report.sqrt_transformed.push(col),
                SkewTransform::Identity => {}
            }
        }

        let (resolved, outcome) = self.resolver.resolve_table(&df, &features)?;
        report.rows_after = resolved.height();
        report.values_clipped = outcome.values_clipped;
        report.rows_dropped = outcome.rows_dropped;
        Ok((resolved, report))
    }

    /// Feature columns in processing order: group-defined columns first (in
    /// group order), then the rest in table order. Row counts depend on
    /// this order, so it must not come from map iteration.
    fn ordered_features(&self, features: &[String]) -> Vec<String> {
        let mut ordered: Vec<String> = Vec::with_capacity(features.len());
        for col in self.config.ordered_group_columns() {
            if features.iter().any(|f| f == col) {
                ordered.push(col.to_string());
            }
        }
        for f in features {
            if !ordered.iter().any(|o| o == f) {
                ordered.push(f.clone());
            }
        }
        ordered
    }

    fn persist(
        &self,
        merged: &DataFrame,
        normalized: &DataFrame,
        steps: &mut Vec<String>,
    ) -> Result<()> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        super::write_csv(
            merged,
            &self
                .config
                .output_dir
                .join("merged_dataset_with_sample_type.csv"),
        )?;
        super::write_csv(
            normalized,
            &self.config.output_dir.join("merged_dataset_normalized.csv"),
        )?;

        for group in &self.config.feature_groups {
            let subset = groups::extract(normalized, group)?;
            // Label-only subset means the dataset carries nothing from
            // this group.
            if subset.width() <= 1 {
                continue;
            }
            super::write_csv(
                &subset,
                &self.config.output_dir.join(format!("{}.csv", group.name)),
            )?;
        }

        info!("Wrote outputs to '{}'", self.config.output_dir.display());
        steps.push(format!(
            "Saved outputs to '{}'",
            self.config.output_dir.display()
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> Pipeline {
        let config = PrepConfig::builder()
            .save_to_disk(false)
            .build()
            .unwrap();
        Pipeline::new(config).unwrap()
    }

    #[test]
    fn test_empty_input_is_fatal() {
        let result = pipeline().process_tables(vec![]);
        assert!(matches!(result, Err(PrepError::EmptyInput)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = PrepConfig::default();
        config.epsilon = -1.0;
        assert!(matches!(
            Pipeline::new(config),
            Err(PrepError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_ordered_features_prefers_group_order() {
        let features = vec![
            "Zed".to_string(),
            "NucleusArea".to_string(),
            "CellArea".to_string(),
        ];
        let ordered = pipeline().ordered_features(&features);
        // CellArea precedes NucleusArea in the shape/size group; unknown
        // columns trail in table order.
        assert_eq!(ordered, vec!["CellArea", "NucleusArea", "Zed"]);
    }

    #[test]
    fn test_table_without_features_is_skipped_not_fatal() {
        let good = df![
            "Sample Type" => ["M0", "M0", "M0"],
            "CellArea" => [10.0, 12.0, 11.0],
        ]
        .unwrap();
        let meta_only = df![
            "Sample Type" => ["SIS"],
            "Well ID" => ["A1"],
        ]
        .unwrap();

        let result = pipeline()
            .process_tables(vec![
                ("m0_plate".to_string(), good),
                ("sis_plate".to_string(), meta_only),
            ])
            .unwrap();

        assert_eq!(result.reports.len(), 1);
        assert!(
            result
                .processing_steps
                .iter()
                .any(|s| s.starts_with("Skipped 'sis_plate'"))
        );
    }
}
