//! Skew correction for feature columns.
//!
//! A monotonic variance-stabilizing transform is chosen per column by the
//! magnitude of its skewness: log1p above 1.0, square root in (0.5, 1.0],
//! identity otherwise. Applied once per column per table, never iterated
//! to convergence.

use crate::error::Result;
use crate::stats;
use crate::utils::{numeric_slots, numeric_values};
use polars::prelude::*;
use tracing::debug;

/// Transform applied to a feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkewTransform {
    /// `ln(1 + v + shift)` for |skew| > 1.0
    Log1p,
    /// `sqrt(v + shift)` for 0.5 < |skew| <= 1.0
    Sqrt,
    /// |skew| <= 0.5, or skewness undefined (fewer than 2 values)
    Identity,
}

/// Corrects skewed feature distributions in place.
pub struct SkewCorrector;

impl SkewCorrector {
    /// Correct every listed feature column of `df`, returning the transform
    /// chosen per column.
    ///
    /// Caller must already have replaced nulls and zeros with epsilon.
    pub fn correct_columns(
        df: &mut DataFrame,
        feature_cols: &[String],
    ) -> Result<Vec<(String, SkewTransform)>> {
        let mut applied = Vec::with_capacity(feature_cols.len());
        for col in feature_cols {
            let transform = Self::correct_column(df, col)?;
            applied.push((col.clone(), transform));
        }
        Ok(applied)
    }

    /// Correct one column; returns the transform that was applied.
    pub fn correct_column(df: &mut DataFrame, col: &str) -> Result<SkewTransform> {
        let series = df.column(col)?.as_materialized_series();
        let values = numeric_values(series)?;

        // Skewness is undefined below 2 values; leave the column alone.
        let Some(skew) = stats::skewness(&values) else {
            return Ok(SkewTransform::Identity);
        };

        let transform = if skew.abs() > 1.0 {
            SkewTransform::Log1p
        } else if skew.abs() > 0.5 {
            SkewTransform::Sqrt
        } else {
            SkewTransform::Identity
        };

        if transform == SkewTransform::Identity {
            return Ok(SkewTransform::Identity);
        }

        // Shift guarantees positivity for the log/sqrt transforms.
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let shift = if values.iter().any(|v| *v <= 0.0) {
            min.abs() + 1.0
        } else {
            0.0
        };

        let slots = numeric_slots(series)?;
        let transformed: Vec<Option<f64>> = slots
            .into_iter()
            .map(|opt| {
                opt.map(|v| match transform {
                    SkewTransform::Log1p => (v + shift).ln_1p(),
                    SkewTransform::Sqrt => (v + shift).sqrt(),
                    SkewTransform::Identity => v,
                })
            })
            .collect();

        debug!(
            "Skew {:.3} in '{}': applying {:?} (shift {})",
            skew, col, transform, shift
        );
        df.replace(col, Series::new(col.into(), transformed))?;
        Ok(transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats;

    fn column_values(df: &DataFrame, col: &str) -> Vec<f64> {
        numeric_values(df.column(col).unwrap().as_materialized_series()).unwrap()
    }

    #[test]
    fn test_heavy_skew_gets_log1p() {
        let original = vec![1.0, 1.0, 1.0, 1.0, 1.0, 100.0];
        assert!(stats::skewness(&original).unwrap().abs() > 1.0);

        let mut df = df!["v" => original.clone()].unwrap();
        let transform = SkewCorrector::correct_column(&mut df, "v").unwrap();
        assert_eq!(transform, SkewTransform::Log1p);

        // All values positive: no shift, elementwise ln(1 + v).
        let corrected = column_values(&df, "v");
        for (c, o) in corrected.iter().zip(&original) {
            assert!((c - o.ln_1p()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_moderate_skew_gets_sqrt() {
        // Skewness of this sample sits in (0.5, 1.0].
        let original = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 15.0];
        let skew = stats::skewness(&original).unwrap().abs();
        assert!(skew > 0.5 && skew <= 1.0, "fixture skew {skew}");

        let mut df = df!["v" => original.clone()].unwrap();
        let transform = SkewCorrector::correct_column(&mut df, "v").unwrap();
        assert_eq!(transform, SkewTransform::Sqrt);

        let corrected = column_values(&df, "v");
        for (c, o) in corrected.iter().zip(&original) {
            assert!((c - o.sqrt()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_low_skew_is_identity() {
        let original = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let mut df = df!["v" => original.clone()].unwrap();
        let transform = SkewCorrector::correct_column(&mut df, "v").unwrap();
        assert_eq!(transform, SkewTransform::Identity);
        assert_eq!(column_values(&df, "v"), original);
    }

    #[test]
    fn test_nonpositive_values_are_shifted() {
        let original = vec![-2.0, 1.0, 1.0, 1.0, 1.0, 50.0];
        let skew = stats::skewness(&original).unwrap();
        assert!(skew.abs() > 1.0);

        let mut df = df!["v" => original.clone()].unwrap();
        SkewCorrector::correct_column(&mut df, "v").unwrap();

        // shift = |min| + 1 = 3
        let corrected = column_values(&df, "v");
        for (c, o) in corrected.iter().zip(&original) {
            assert!((c - (o + 3.0).ln_1p()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_value_column_unchanged() {
        let mut df = df!["v" => [7.0]].unwrap();
        let transform = SkewCorrector::correct_column(&mut df, "v").unwrap();
        assert_eq!(transform, SkewTransform::Identity);
        assert_eq!(column_values(&df, "v"), vec![7.0]);
    }

    #[test]
    fn test_correct_columns_reports_per_column() {
        let mut df = df![
            "a" => [1.0, 1.0, 1.0, 1.0, 1.0, 100.0],
            "b" => [1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        ]
        .unwrap();
        let applied =
            SkewCorrector::correct_columns(&mut df, &["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(applied[0], ("a".to_string(), SkewTransform::Log1p));
        assert_eq!(applied[1], ("b".to_string(), SkewTransform::Identity));
    }
}
