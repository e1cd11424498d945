//! Measurement Table Cleaning Pipeline
//!
//! A Polars-based cleaning and normalization pipeline for per-object
//! imaging measurement tables (one row per segmented cell, one column per
//! morphology or intensity feature).
//!
//! # Overview
//!
//! Each input table is cleaned in isolation, then the tables are merged
//! and normalized together:
//!
//! - **Sample typing**: every row gets a sample-type label, taken from an
//!   existing label column or derived from the source file name
//! - **Column classification**: metadata columns (identifiers, plate/well
//!   coordinates) are partitioned from feature columns by name patterns
//! - **Epsilon fill**: missing and exact-zero feature values become a
//!   small positive epsilon
//! - **Skew correction**: per-column log1p or square-root transform chosen
//!   by skewness magnitude
//! - **Outlier resolution**: IQR fence and Grubbs tests per column;
//!   flagged values are clipped in place or their rows dropped
//! - **Merge and z-score**: column-union concatenation, then per-column
//!   standardization over the merged frame
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cyto_prep::{Pipeline, PrepConfig};
//!
//! let config = PrepConfig::builder()
//!     .output_dir("output")
//!     .grubbs_alpha(0.05)
//!     .build()?;
//!
//! let result = Pipeline::new(config)?.process_files(&paths)?;
//!
//! println!("{} rows merged", result.merged.height());
//! for report in &result.reports {
//!     println!(
//!         "{} ({}): {} -> {} rows",
//!         report.name, report.sample_type, report.rows_before, report.rows_after
//!     );
//! }
//! ```
//!
//! # Configuration
//!
//! [`PrepConfig`] holds the metadata name patterns, the filename-to-label
//! table, the normalization exclusion list, and the feature-group
//! definitions; [`PrepConfig::default()`] covers the supported screening
//! datasets.

pub mod classify;
pub mod config;
pub mod error;
pub mod groups;
pub mod normalize;
pub mod outliers;
pub mod pipeline;
pub mod sample_type;
pub mod skew;
pub mod stats;
pub mod types;
pub mod utils;

pub use classify::ColumnClassifier;
pub use config::{PrepConfig, PrepConfigBuilder, SAMPLE_TYPE_COLUMN};
pub use error::{PrepError, Result};
pub use groups::FeatureGroup;
pub use normalize::Normalizer;
pub use outliers::OutlierResolver;
pub use pipeline::Pipeline;
pub use skew::{SkewCorrector, SkewTransform};
pub use types::{ColumnPartition, PrepResult, SampleType, TableReport};
