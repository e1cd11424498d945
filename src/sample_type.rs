//! Sample-type labeling.
//!
//! A table that already carries a label column (under any accepted
//! spelling) is trusted: its values are trimmed, stringified, and the
//! column is renamed to the canonical spelling. A table without one gets a
//! single label derived from its source file name. The core never touches
//! the source file itself.

use crate::config::{PrepConfig, SAMPLE_TYPE_COLUMN};
use crate::error::{PrepError, Result};
use crate::types::SampleType;
use polars::prelude::*;
use tracing::{debug, info};

impl SampleType {
    /// Derive a label from a file name via the ordered pattern table.
    /// Case-insensitive substring match, first hit wins.
    pub fn from_file_name(name: &str, patterns: &[(SampleType, Vec<String>)]) -> SampleType {
        let lowered = name.to_lowercase();
        for (label, substrings) in patterns {
            if substrings.iter().any(|p| lowered.contains(&p.to_lowercase())) {
                return *label;
            }
        }
        SampleType::Unknown
    }
}

/// Locate the label column under any accepted spelling.
pub fn find_label_column(df: &DataFrame, aliases: &[String]) -> Option<String> {
    let names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
    aliases
        .iter()
        .find(|alias| names.contains(&alias.as_str()))
        .cloned()
}

/// Guarantee the table carries a clean canonical label column.
///
/// Returns the label of the table's first row for reporting.
///
/// # Errors
///
/// `PrepError::SampleTypeUnresolvable` when the column is absent and no
/// source file name is available to derive a label from. This aborts the
/// whole run.
pub fn ensure_sample_type(
    df: &mut DataFrame,
    source_name: Option<&str>,
    config: &PrepConfig,
) -> Result<String> {
    if let Some(found) = find_label_column(df, &config.sample_type_aliases) {
        let cleaned = clean_label_values(df.column(&found)?.as_materialized_series())?;
        let first = cleaned
            .str()?
            .get(0)
            .unwrap_or(SampleType::Unknown.as_str())
            .to_string();
        df.replace(&found, cleaned)?;
        if found != SAMPLE_TYPE_COLUMN {
            df.rename(&found, SAMPLE_TYPE_COLUMN.into())?;
            debug!("Renamed label column '{}' to '{}'", found, SAMPLE_TYPE_COLUMN);
        }
        return Ok(first);
    }

    let Some(name) = source_name else {
        return Err(PrepError::SampleTypeUnresolvable {
            column: SAMPLE_TYPE_COLUMN.to_string(),
            source_name: "<memory>".to_string(),
        });
    };
    if config.sample_type_patterns.is_empty() {
        return Err(PrepError::SampleTypeUnresolvable {
            column: SAMPLE_TYPE_COLUMN.to_string(),
            source_name: name.to_string(),
        });
    }

    let label = SampleType::from_file_name(name, &config.sample_type_patterns);
    let labels = vec![label.as_str().to_string(); df.height()];
    df.with_column(Series::new(SAMPLE_TYPE_COLUMN.into(), labels))?;
    info!("Assigned sample type '{}' to '{}'", label, name);
    Ok(label.as_str().to_string())
}

/// Trim and stringify label values; nulls become "Unknown" so the label
/// column is never missing data downstream.
fn clean_label_values(series: &Series) -> Result<Series> {
    let as_string = series.cast(&DataType::String)?;
    let cleaned: Vec<String> = as_string
        .str()?
        .into_iter()
        .map(|opt| match opt {
            Some(v) => v.trim().to_string(),
            None => SampleType::Unknown.as_str().to_string(),
        })
        .collect();
    Ok(Series::new(series.name().clone(), cleaned))
}
