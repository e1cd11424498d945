//! Configuration for the cleaning pipeline.
//!
//! The metadata name patterns, the filename-to-label table, and the
//! normalization exclusion list are explicit, validated fields, accepted
//! by the orchestrator at call time rather than baked in as constants.

use crate::groups::{FeatureGroup, default_feature_groups};
use crate::types::SampleType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Canonical name of the sample-type label column.
pub const SAMPLE_TYPE_COLUMN: &str = "Sample Type";

/// Configuration for a pipeline run.
///
/// Use [`PrepConfig::builder()`] for a fluent setup; `PrepConfig::default()`
/// covers the supported screening datasets.
///
/// # Example
///
/// ```rust,ignore
/// use cyto_prep::PrepConfig;
///
/// let config = PrepConfig::builder()
///     .epsilon(1e-6)
///     .grubbs_alpha(0.01)
///     .save_to_disk(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepConfig {
    /// Case-insensitive regex patterns marking metadata columns
    /// (identifiers and plate/well/field coordinates).
    pub meta_patterns: Vec<String>,

    /// Ordered label -> filename-substring table for deriving the sample
    /// type when a table lacks the label column. First match wins.
    pub sample_type_patterns: Vec<(SampleType, Vec<String>)>,

    /// Accepted spellings of the label column on input. All are renamed to
    /// [`SAMPLE_TYPE_COLUMN`] so the merged dataset carries one spelling.
    pub sample_type_aliases: Vec<String>,

    /// Columns excluded from normalization in addition to the metadata set.
    pub normalize_exclude: Vec<String>,

    /// Named feature-column subsets for downstream analysis. Their
    /// concatenated column lists also fix the order in which feature
    /// columns are skew-corrected and outlier-resolved.
    pub feature_groups: Vec<FeatureGroup>,

    /// Replacement for missing and exact-zero feature values.
    /// Default: 1e-5
    pub epsilon: f64,

    /// Significance level for the Grubbs extreme-value test.
    /// Default: 0.05
    pub grubbs_alpha: f64,

    /// Fence width multiplier for the IQR range test.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Output directory for the merged and normalized datasets.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// Whether to write the merged, normalized, and feature-group CSVs.
    /// When false, results are kept in memory only.
    /// Default: true
    pub save_to_disk: bool,
}

/// The fixed label table for the supported screening experiments.
fn default_sample_type_patterns() -> Vec<(SampleType, Vec<String>)> {
    vec![
        (SampleType::Sis, vec!["sis".to_string()]),
        (SampleType::Ubm, vec!["ubm".to_string()]),
        (SampleType::Cardiac, vec!["cardiac".to_string()]),
        (SampleType::M0, vec!["m0".to_string()]),
        (SampleType::M1, vec!["m1".to_string()]),
        (SampleType::M2, vec!["m2".to_string()]),
    ]
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            meta_patterns: [
                "Experiment", "Well", "Unique", "Row", "Column", "Field", "Object", "Plate",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            sample_type_patterns: default_sample_type_patterns(),
            sample_type_aliases: vec![
                SAMPLE_TYPE_COLUMN.to_string(),
                "sample_type".to_string(),
            ],
            normalize_exclude: [
                "Well ID",
                "Unique ID",
                "Row",
                "Column",
                "Field",
                "Object Number (per well)",
                "Sample Type",
                "Experiment",
                "sample_type",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            feature_groups: default_feature_groups(),
            epsilon: 1e-5,
            grubbs_alpha: 0.05,
            iqr_multiplier: 1.5,
            output_dir: PathBuf::from("output"),
            save_to_disk: true,
        }
    }
}

impl PrepConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PrepConfigBuilder {
        PrepConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.meta_patterns.is_empty() {
            return Err(ConfigValidationError::NoMetaPatterns);
        }
        if !(self.grubbs_alpha > 0.0 && self.grubbs_alpha < 1.0) {
            return Err(ConfigValidationError::InvalidAlpha(self.grubbs_alpha));
        }
        if self.epsilon <= 0.0 {
            return Err(ConfigValidationError::InvalidEpsilon(self.epsilon));
        }
        if self.iqr_multiplier <= 0.0 {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }
        Ok(())
    }

    /// Flattened feature-group column list, preserving group order.
    /// Defines the feature-column processing order.
    pub fn ordered_group_columns(&self) -> Vec<&str> {
        self.feature_groups
            .iter()
            .flat_map(|g| g.columns.iter().map(String::as_str))
            .collect()
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("metadata pattern list must not be empty")]
    NoMetaPatterns,

    #[error("invalid Grubbs significance level: {0} (must be in (0, 1))")]
    InvalidAlpha(f64),

    #[error("invalid epsilon: {0} (must be positive)")]
    InvalidEpsilon(f64),

    #[error("invalid IQR multiplier: {0} (must be positive)")]
    InvalidIqrMultiplier(f64),
}

/// Builder for [`PrepConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PrepConfigBuilder {
    meta_patterns: Option<Vec<String>>,
    sample_type_patterns: Option<Vec<(SampleType, Vec<String>)>>,
    sample_type_aliases: Option<Vec<String>>,
    normalize_exclude: Option<Vec<String>>,
    feature_groups: Option<Vec<FeatureGroup>>,
    epsilon: Option<f64>,
    grubbs_alpha: Option<f64>,
    iqr_multiplier: Option<f64>,
    output_dir: Option<PathBuf>,
    save_to_disk: Option<bool>,
}

impl PrepConfigBuilder {
    /// Replace the metadata column name patterns.
    pub fn meta_patterns(mut self, patterns: Vec<String>) -> Self {
        self.meta_patterns = Some(patterns);
        self
    }

    /// Replace the filename-to-label pattern table.
    pub fn sample_type_patterns(mut self, patterns: Vec<(SampleType, Vec<String>)>) -> Self {
        self.sample_type_patterns = Some(patterns);
        self
    }

    /// Replace the accepted spellings of the label column.
    pub fn sample_type_aliases(mut self, aliases: Vec<String>) -> Self {
        self.sample_type_aliases = Some(aliases);
        self
    }

    /// Replace the normalization exclusion list.
    pub fn normalize_exclude(mut self, columns: Vec<String>) -> Self {
        self.normalize_exclude = Some(columns);
        self
    }

    /// Replace the feature-group definitions (and the column processing
    /// order they imply).
    pub fn feature_groups(mut self, groups: Vec<FeatureGroup>) -> Self {
        self.feature_groups = Some(groups);
        self
    }

    /// Set the replacement value for missing and zero feature values.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    /// Set the Grubbs test significance level.
    pub fn grubbs_alpha(mut self, alpha: f64) -> Self {
        self.grubbs_alpha = Some(alpha);
        self
    }

    /// Set the IQR fence multiplier.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the output directory for persisted datasets.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Enable or disable writing results to disk.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PrepConfig` or an error if validation fails.
    pub fn build(self) -> Result<PrepConfig, ConfigValidationError> {
        let defaults = PrepConfig::default();
        let config = PrepConfig {
            meta_patterns: self.meta_patterns.unwrap_or(defaults.meta_patterns),
            sample_type_patterns: self
                .sample_type_patterns
                .unwrap_or(defaults.sample_type_patterns),
            sample_type_aliases: self
                .sample_type_aliases
                .unwrap_or(defaults.sample_type_aliases),
            normalize_exclude: self.normalize_exclude.unwrap_or(defaults.normalize_exclude),
            feature_groups: self.feature_groups.unwrap_or(defaults.feature_groups),
            epsilon: self.epsilon.unwrap_or(defaults.epsilon),
            grubbs_alpha: self.grubbs_alpha.unwrap_or(defaults.grubbs_alpha),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            save_to_disk: self.save_to_disk.unwrap_or(defaults.save_to_disk),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PrepConfig::default();
        assert_eq!(config.epsilon, 1e-5);
        assert_eq!(config.grubbs_alpha, 0.05);
        assert_eq!(config.iqr_multiplier, 1.5);
        assert!(config.save_to_disk);
        assert_eq!(config.sample_type_patterns.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pattern_table_order() {
        // First-match-wins typing depends on this order.
        let config = PrepConfig::default();
        let labels: Vec<_> = config
            .sample_type_patterns
            .iter()
            .map(|(label, _)| *label)
            .collect();
        assert_eq!(
            labels,
            vec![
                SampleType::Sis,
                SampleType::Ubm,
                SampleType::Cardiac,
                SampleType::M0,
                SampleType::M1,
                SampleType::M2,
            ]
        );
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PrepConfig::builder()
            .epsilon(1e-6)
            .grubbs_alpha(0.01)
            .output_dir("out")
            .save_to_disk(false)
            .build()
            .unwrap();

        assert_eq!(config.epsilon, 1e-6);
        assert_eq!(config.grubbs_alpha, 0.01);
        assert_eq!(config.output_dir.to_str().unwrap(), "out");
        assert!(!config.save_to_disk);
    }

    #[test]
    fn test_validation_rejects_bad_alpha() {
        let result = PrepConfig::builder().grubbs_alpha(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidAlpha(_)
        ));
    }

    #[test]
    fn test_validation_rejects_empty_patterns() {
        let result = PrepConfig::builder().meta_patterns(vec![]).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::NoMetaPatterns
        ));
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = PrepConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PrepConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.meta_patterns, deserialized.meta_patterns);
        assert_eq!(config.epsilon, deserialized.epsilon);
    }

    #[test]
    fn test_ordered_group_columns_flattens_in_order() {
        let config = PrepConfig::default();
        let columns = config.ordered_group_columns();
        // Shape/size group leads in the default definitions.
        assert_eq!(columns[0], "body_roundness");
        assert!(columns.contains(&"SERBrightNuc"));
    }
}
