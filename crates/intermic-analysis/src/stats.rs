//! Per-frame robust statistics used by the trajectory estimator.
//!
//! Sums are accumulated in `f64` so long frequency columns don't lose
//! precision before the result is narrowed back to `f32`.

use crate::error::{AnalysisError, Result};

/// Arithmetic mean.
pub fn mean(values: &[f32]) -> Result<f32> {
    if values.is_empty() {
        return Err(AnalysisError::EmptySlice);
    }
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    Ok((sum / values.len() as f64) as f32)
}

/// Symmetrically trimmed mean.
///
/// Sorts a copy of `values`, drops `floor(proportion * n)` elements from each
/// tail and averages what is left. With 100 values and `proportion = 0.05`
/// exactly the 5 lowest and 5 highest values are discarded.
///
/// # Arguments
/// * `values` - Samples to average
/// * `proportion` - Fraction cut from each tail, in `[0, 0.5)`
pub fn trimmed_mean(values: &[f32], proportion: f32) -> Result<f32> {
    if values.is_empty() {
        return Err(AnalysisError::EmptySlice);
    }
    if !(0.0..0.5).contains(&proportion) {
        return Err(AnalysisError::InvalidProportion(proportion));
    }

    let n = values.len();
    let cut = (proportion as f64 * n as f64) as usize;

    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);

    mean(&sorted[cut..n - cut])
}

/// Population standard deviation (divides by N).
///
/// A slice whose elements are all equal returns exactly `0.0`.
pub fn population_std(values: &[f32]) -> Result<f32> {
    let first = *values.first().ok_or(AnalysisError::EmptySlice)?;
    if values.iter().all(|&v| v == first) {
        return Ok(0.0);
    }

    let n = values.len() as f64;
    let mu = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mu;
            d * d
        })
        .sum::<f64>()
        / n;
    Ok(variance.sqrt() as f32)
}

/// Inverse-spread confidence score, `1 / population_std(values)`.
///
/// Zero spread maps to `f32::INFINITY`, so a perfectly flat frame outranks
/// every other frame.
pub fn confidence(values: &[f32]) -> Result<f32> {
    let spread = population_std(values)?;
    if spread == 0.0 {
        Ok(f32::INFINITY)
    } else {
        Ok(1.0 / spread)
    }
}

/// Index of the largest value; the first occurrence wins ties.
///
/// NaN never wins. Returns `None` when the slice is empty or all NaN.
pub fn argmax_first(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
