//! Outlier detection and resolution.
//!
//! Two independent tests run per feature column: a range test on the
//! interquartile fence and Grubbs' extreme-value test against a Student-t
//! critical value. Detection always reads the immutable post-skew snapshot
//! of the table; resolution mutates a working copy, so a row dropped for
//! one column can never be flagged again for a later column. Both tests
//! run exactly once per column.

use crate::config::PrepConfig;
use crate::error::Result;
use crate::stats;
use crate::utils::{numeric_slots, numeric_values};
use polars::prelude::*;
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::debug;

/// What resolution did to one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionOutcome {
    /// Outlier values replaced in place with `ln(1 + v)`.
    pub values_clipped: usize,
    /// Rows removed from the table.
    pub rows_dropped: usize,
}

/// Resolves outliers per feature column via clip-or-drop.
pub struct OutlierResolver {
    alpha: f64,
    iqr_multiplier: f64,
}

impl OutlierResolver {
    pub fn from_config(config: &PrepConfig) -> Self {
        Self {
            alpha: config.grubbs_alpha,
            iqr_multiplier: config.iqr_multiplier,
        }
    }

    /// Resolve outliers in every listed feature column, in order.
    ///
    /// `snapshot` is the skew-corrected table; the returned frame is the
    /// resolved copy. Column order is observable in the final row count and
    /// must come from the configuration, not map iteration.
    pub fn resolve_table(
        &self,
        snapshot: &DataFrame,
        feature_cols: &[String],
    ) -> Result<(DataFrame, ResolutionOutcome)> {
        let mut working = snapshot.clone();
        let mut outcome = ResolutionOutcome::default();

        for col in feature_cols {
            let series = snapshot.column(col)?.as_materialized_series();
            let values = numeric_values(series)?;
            if values.is_empty() {
                continue;
            }

            let flagged = self.flag_column(&values);
            if flagged.is_empty() {
                continue;
            }

            // Post-correction skew decides the policy for the whole column:
            // clip in place when still heavily skewed, drop the row otherwise.
            let clip = stats::skewness(&values)
                .map(|s| s.abs() > 1.0)
                .unwrap_or(false);

            debug!(
                "Column '{}': {} outlier value(s), policy {}",
                col,
                flagged.len(),
                if clip { "clip" } else { "drop" }
            );

            for val in flagged {
                let slots = numeric_slots(working.column(col)?.as_materialized_series())?;
                let Some(row) = slots.iter().position(|s| *s == Some(val)) else {
                    // Every row holding this value is already gone.
                    continue;
                };

                if clip {
                    let mut replaced = slots;
                    replaced[row] = Some(val.ln_1p());
                    working.replace(col, Series::new(col.into(), replaced))?;
                    outcome.values_clipped += 1;
                } else {
                    let mask_values: Vec<bool> =
                        (0..working.height()).map(|i| i != row).collect();
                    let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
                    working = working.filter(&mask)?;
                    outcome.rows_dropped += 1;
                }
            }
        }

        Ok((working, outcome))
    }

    /// Union of both tests' flags: IQR flags in row order, then the Grubbs
    /// value, deduplicated by exact equality.
    fn flag_column(&self, values: &[f64]) -> Vec<f64> {
        let mut flagged = self.iqr_outliers(values);
        if let Some(extreme) = grubbs_outlier(values, self.alpha) {
            flagged.push(extreme);
        }

        let mut unique: Vec<f64> = Vec::with_capacity(flagged.len());
        for v in flagged {
            if !unique.iter().any(|u| *u == v) {
                unique.push(v);
            }
        }
        unique
    }

    /// Values outside `[Q1 - k*IQR, Q3 + k*IQR]`, in row order.
    fn iqr_outliers(&self, values: &[f64]) -> Vec<f64> {
        let sorted = stats::sorted_copy(values);
        let q1 = stats::quantile(&sorted, 0.25);
        let q3 = stats::quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let lower = q1 - self.iqr_multiplier * iqr;
        let upper = q3 + self.iqr_multiplier * iqr;

        values
            .iter()
            .filter(|v| **v < lower || **v > upper)
            .cloned()
            .collect()
    }
}

/// Grubbs' two-sided extreme-value test.
///
/// Returns the single most deviant value when its statistic exceeds the
/// critical value, `None` otherwise. Requires at least 3 values and a
/// positive standard deviation.
///
/// The critical value omits the `1/sqrt(n)` factor of the textbook form
/// and therefore always exceeds the largest attainable statistic
/// `(n-1)/sqrt(n)`: the test is strictly conservative, and the range test
/// does the flagging in practice. Changing the formula changes which rows
/// survive; verify against known-good output before touching it.
pub fn grubbs_outlier(values: &[f64], alpha: f64) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }

    let mean = stats::mean(values);
    let std = stats::sample_std(values);
    if std <= 0.0 || !std.is_finite() {
        return None;
    }

    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let g_max = (max - mean).abs() / std;
    let g_min = (min - mean).abs() / std;
    let (g, candidate) = if g_max > g_min { (g_max, max) } else { (g_min, min) };

    (g > grubbs_critical(n, alpha)).then_some(candidate)
}

/// Critical value `(n-1) * t / sqrt(n - 2 + t^2)` with
/// `t = t_inv(1 - alpha/(2n), n-2)`.
fn grubbs_critical(n: usize, alpha: f64) -> f64 {
    let n_f = n as f64;
    let df = n_f - 2.0;
    if df <= 0.0 {
        return f64::MAX;
    }

    match StudentsT::new(0.0, 1.0, df) {
        Ok(t_dist) => {
            let t = t_dist.inverse_cdf(1.0 - alpha / (2.0 * n_f));
            if !t.is_finite() {
                return f64::MAX;
            }
            let g = ((n_f - 1.0) * t) / (n_f - 2.0 + t * t).sqrt();
            if g.is_finite() { g } else { f64::MAX }
        }
        Err(_) => f64::MAX,
    }
}
