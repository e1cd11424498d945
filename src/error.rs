//! Error types for the cleaning pipeline.
//!
//! A single `thiserror` hierarchy covers every stage; small-sample
//! statistical edge cases (undefined skewness, Grubbs on n < 3) are not
//! errors, they are no-ops inside the components.

use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum PrepError {
    /// No sample-type column was present and no label could be derived.
    ///
    /// Fatal for the whole run: downstream grouping requires every row to
    /// carry a label.
    #[error("column '{column}' not found in '{source_name}' and no label scheme to derive it")]
    SampleTypeUnresolvable {
        column: String,
        source_name: String,
    },

    /// Column was not found in the dataset.
    #[error("column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Every column of a table was classified as metadata.
    #[error("table '{0}' has no feature columns")]
    NoFeatureColumns(String),

    /// The pipeline was invoked with no input tables.
    #[error("no input tables to process")]
    EmptyInput,

    /// Invalid configuration provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PrepError>,
    },
}

impl PrepError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PrepError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error aborts the whole run rather than a single table.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::SampleTypeUnresolvable { .. } | Self::EmptyInput | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PrepError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PrepError::Polars(e).with_context(context))
    }
}
