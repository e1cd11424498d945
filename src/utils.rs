//! Polars helpers shared across the pipeline stages.

use polars::prelude::*;

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Extract the non-null values of a numeric Series as `f64`.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series.f64()?.into_iter().flatten().collect())
}

/// Extract every slot of a numeric Series as `Option<f64>`, preserving
/// positions. Needed when row indices matter.
pub fn numeric_slots(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series.f64()?.into_iter().collect())
}

/// Replace nulls and exact zeros with a small positive epsilon, casting the
/// column to `Float64`.
///
/// Guarantees the skew-correction invariant: no missing and no exact-zero
/// values in any feature column.
pub fn fill_missing_and_zero(series: &Series, epsilon: f64) -> PolarsResult<Series> {
    let float_series = series.cast(&DataType::Float64)?;
    let filled = float_series
        .f64()?
        .into_iter()
        .map(|opt| match opt {
            Some(v) if v != 0.0 => v,
            _ => epsilon,
        })
        .collect::<Vec<f64>>();
    Ok(Series::new(series.name().clone(), filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(is_numeric_dtype(&DataType::Int32));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_numeric_values_drops_nulls() {
        let series = Series::new("v".into(), &[Some(1.0), None, Some(3.0)]);
        let values = numeric_values(&series).unwrap();
        assert_eq!(values, vec![1.0, 3.0]);
    }

    #[test]
    fn test_numeric_slots_preserves_positions() {
        let series = Series::new("v".into(), &[Some(1.0), None, Some(3.0)]);
        let slots = numeric_slots(&series).unwrap();
        assert_eq!(slots, vec![Some(1.0), None, Some(3.0)]);
    }

    #[test]
    fn test_fill_missing_and_zero() {
        let series = Series::new("v".into(), &[Some(2.0), None, Some(0.0), Some(-1.0)]);
        let filled = fill_missing_and_zero(&series, 1e-5).unwrap();
        let values = numeric_values(&filled).unwrap();
        assert_eq!(values, vec![2.0, 1e-5, 1e-5, -1.0]);
        assert_eq!(filled.null_count(), 0);
    }

    #[test]
    fn test_fill_casts_integers() {
        let series = Series::new("v".into(), &[1i64, 0, 4]);
        let filled = fill_missing_and_zero(&series, 1e-5).unwrap();
        assert_eq!(filled.dtype(), &DataType::Float64);
        let values = numeric_values(&filled).unwrap();
        assert_eq!(values, vec![1.0, 1e-5, 4.0]);
    }
}
