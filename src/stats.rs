//! Column statistics for skew correction, outlier testing, and normalization.
//!
//! All functions operate on plain `f64` slices; callers extract non-null
//! values from a Series first (see [`crate::utils::numeric_values`]).
//!
//! Two standard-deviation conventions coexist on purpose: the Grubbs test
//! uses the sample (n-1) form, skewness and z-score normalization use the
//! population (n) form.

/// Arithmetic mean. Zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1 denominator). Zero for n <= 1.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if n <= 1.0 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Population standard deviation (n denominator). Zero for an empty slice.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Skewness: population third standardized moment.
///
/// `None` for fewer than 2 values (undefined; callers skip the transform).
/// Zero for a constant column.
pub fn skewness(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let std = population_std(values);
    if std == 0.0 {
        return Some(0.0);
    }
    let n = values.len() as f64;
    let skew_sum: f64 = values.iter().map(|v| ((v - m) / std).powi(3)).sum();
    Some(skew_sum / n)
}

/// Quantile with linear interpolation between order statistics.
///
/// `sorted` must be ascending and non-empty; `q` in [0, 1].
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Sort a copy of the values ascending, ignoring NaN ordering surprises.
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}
