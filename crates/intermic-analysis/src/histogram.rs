//! Histogram-mode frame estimate.
//!
//! An alternative to the trimmed mean: values are binned with a fixed bin
//! width, the most populated bins are kept and their means are averaged,
//! weighted by population. This favours the dominant cluster of a frame and
//! ignores scattered bins entirely.

use crate::error::{AnalysisError, Result};

/// Default histogram bin width.
pub const DEFAULT_BIN_WIDTH: f32 = 0.05;

/// Default number of most populated bins kept.
pub const DEFAULT_TOP_BINS: usize = 10;

/// Largest number of bins a histogram may allocate.
pub const MAX_BINS: usize = 1 << 20;

/// One histogram bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    /// Bin position counted from the lowest edge.
    pub index: usize,
    /// Number of values that fell into the bin.
    pub count: usize,
    /// Mean of the values that fell into the bin.
    pub mean: f32,
}

/// Equal-width histogram over `[min, max]`.
///
/// The bin count is `ceil((max - min) / bin_width)`; the right edge belongs
/// to the last bin. Constant input yields a single bin. A range needing more
/// than [`MAX_BINS`] bins, or an infinite range, is rejected.
pub fn histogram(values: &[f32], bin_width: f32) -> Result<Vec<Bin>> {
    if values.is_empty() {
        return Err(AnalysisError::EmptySlice);
    }
    if !(bin_width.is_finite() && bin_width > 0.0) {
        return Err(AnalysisError::InvalidBinWidth(bin_width));
    }

    let (min, max) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = (max - min) as f64;
    let needed = (range / bin_width as f64).ceil();
    if !(needed <= MAX_BINS as f64) {
        return Err(AnalysisError::TooManyBins {
            range: max - min,
            bin_width,
            limit: MAX_BINS,
        });
    }
    let num_bins = (needed as usize).max(1);
    let width = if range > 0.0 { range / num_bins as f64 } else { 1.0 };

    let mut counts = vec![0usize; num_bins];
    let mut sums = vec![0.0f64; num_bins];
    for &v in values {
        let index = (((v - min) as f64 / width) as usize).min(num_bins - 1);
        counts[index] += 1;
        sums[index] += v as f64;
    }

    Ok(counts
        .iter()
        .zip(sums.iter())
        .enumerate()
        .map(|(index, (&count, &sum))| Bin {
            index,
            count,
            mean: if count > 0 { (sum / count as f64) as f32 } else { 0.0 },
        })
        .collect())
}

/// Population-weighted mean of the `top_bins` most populated bins.
///
/// Bins are ranked by count, largest first; equal counts keep the lower bin
/// first. Empty bins never contribute.
///
/// # Arguments
/// * `values` - Frame values
/// * `bin_width` - Histogram bin width (default [`DEFAULT_BIN_WIDTH`])
/// * `top_bins` - Number of bins kept (default [`DEFAULT_TOP_BINS`])
pub fn histogram_mode_estimate(values: &[f32], bin_width: f32, top_bins: usize) -> Result<f32> {
    if top_bins == 0 {
        return Err(AnalysisError::InvalidTopBins);
    }

    let mut bins = histogram(values, bin_width)?;
    bins.retain(|b| b.count > 0);
    // stable sort: ties stay in bin order
    bins.sort_by(|a, b| b.count.cmp(&a.count));

    let (weighted, total) = bins
        .iter()
        .take(top_bins)
        .fold((0.0f64, 0usize), |(acc, n), b| {
            (acc + b.mean as f64 * b.count as f64, n + b.count)
        });

    Ok((weighted / total as f64) as f32)
}
