//! Robust scalar estimation from a feature trajectory.
//!
//! A feature tensor (batch, frequency, pair, time) varies over time and is
//! noisy across frequency. [`TrajectoryEstimator`] samples one channel pair at
//! a fixed grid of time fractions (0.05, 0.10, …, 0.95 by default), reduces
//! each sampled frequency column to a frame estimate and a confidence score
//! `1 / std`, and reports the frame estimate with the highest confidence.
//!
//! ## Example
//!
//! ```rust
//! use intermic_analysis::{TrajectoryEstimator, FrameMethod};
//! use ndarray::Array4;
//!
//! // 16 bins, one pair, 40 frames; frame 10 is flat
//! let tensor = Array4::from_shape_fn((1, 16, 1, 40), |(_, f, _, t)| {
//!     if t == 10 { 0.25 } else { 0.25 + f as f32 * 0.01 * (t + 1) as f32 }
//! });
//!
//! let estimate = TrajectoryEstimator::new()
//!     .with_method(FrameMethod::TrimmedMean { proportion: 0.05 })
//!     .estimate(&tensor, 0)
//!     .unwrap();
//! assert_eq!(estimate.best_frame(), 10);
//! assert!((estimate.value - 0.25).abs() < 1e-6);
//! ```

use ndarray::{ArrayBase, Data, Ix4, s};
use serde::{Deserialize, Serialize};

use crate::config::EstimatorConfig;
use crate::error::{AnalysisError, Result};
use crate::histogram::histogram_mode_estimate;
use crate::stats::{argmax_first, confidence, mean, trimmed_mean};

/// Default number of grid divisions; fractions are `k / 20` for `k = 1..20`.
pub const DEFAULT_GRID_DIVISIONS: usize = 20;

/// Default proportion trimmed from each tail.
pub const DEFAULT_TRIM_PROPORTION: f32 = 0.05;

/// How one sampled frequency column is reduced to a frame estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameMethod {
    /// Symmetrically trimmed mean.
    TrimmedMean {
        /// Fraction cut from each tail.
        proportion: f32,
    },
    /// Plain arithmetic mean.
    Mean,
    /// Population-weighted mean of the most populated histogram bins.
    Histogram {
        /// Histogram bin width.
        bin_width: f32,
        /// Number of bins kept.
        top_bins: usize,
    },
}

impl Default for FrameMethod {
    fn default() -> Self {
        FrameMethod::TrimmedMean {
            proportion: DEFAULT_TRIM_PROPORTION,
        }
    }
}

impl FrameMethod {
    /// Short lowercase name, as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            FrameMethod::TrimmedMean { .. } => "trimmed",
            FrameMethod::Mean => "mean",
            FrameMethod::Histogram { .. } => "histogram",
        }
    }

    /// Reject parameters that could never produce an estimate.
    pub fn validate(&self) -> Result<()> {
        match *self {
            FrameMethod::TrimmedMean { proportion } if !(0.0..0.5).contains(&proportion) => {
                Err(AnalysisError::InvalidProportion(proportion))
            }
            FrameMethod::Histogram { bin_width, .. }
                if !(bin_width.is_finite() && bin_width > 0.0) =>
            {
                Err(AnalysisError::InvalidBinWidth(bin_width))
            }
            FrameMethod::Histogram { top_bins: 0, .. } => Err(AnalysisError::InvalidTopBins),
            _ => Ok(()),
        }
    }

    /// Reduce one frequency column to a frame estimate.
    pub fn apply(&self, values: &[f32]) -> Result<f32> {
        match *self {
            FrameMethod::TrimmedMean { proportion } => trimmed_mean(values, proportion),
            FrameMethod::Mean => mean(values),
            FrameMethod::Histogram {
                bin_width,
                top_bins,
            } => histogram_mode_estimate(values, bin_width, top_bins),
        }
    }
}

/// One sampling point of the time grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    /// Time fraction `k / divisions`.
    pub fraction: f32,
    /// Frame index `ceil(k * T / divisions)`, clamped to `T - 1`.
    pub frame: usize,
}

/// Result of one estimator call.
///
/// All series have one entry per grid point and line up index by index; they
/// are what a caller would plot against `fractions` for inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryEstimate {
    /// Channel pair that was examined.
    pub pair: usize,
    /// Selected estimate (frame estimate at maximum confidence).
    pub value: f32,
    /// Grid position of the selected frame.
    pub best_index: usize,
    /// Sampled time fractions.
    pub fractions: Vec<f32>,
    /// Sampled frame indices.
    pub frames: Vec<usize>,
    /// Frame estimate per grid point.
    pub estimates: Vec<f32>,
    /// Confidence (`1 / std`) per grid point; `inf` for a flat frame.
    pub confidences: Vec<f32>,
}

impl TrajectoryEstimate {
    /// Time fraction of the selected frame.
    pub fn best_fraction(&self) -> f32 {
        self.fractions[self.best_index]
    }

    /// Frame index of the selected frame.
    pub fn best_frame(&self) -> usize {
        self.frames[self.best_index]
    }

    /// Confidence of the selected frame.
    pub fn best_confidence(&self) -> f32 {
        self.confidences[self.best_index]
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    /// True when no grid point was sampled.
    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }
}

/// Samples a feature trajectory and picks the most confident frame estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryEstimator {
    grid_divisions: usize,
    method: FrameMethod,
}

impl Default for TrajectoryEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TrajectoryEstimator {
    /// Estimator with a 19-point grid and a 5% trimmed mean.
    pub fn new() -> Self {
        Self {
            grid_divisions: DEFAULT_GRID_DIVISIONS,
            method: FrameMethod::default(),
        }
    }

    /// Build from a validated [`EstimatorConfig`].
    pub fn from_config(config: &EstimatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            grid_divisions: config.grid_divisions,
            method: config.frame_method,
        })
    }

    /// Set the number of grid divisions (grid has `divisions - 1` points).
    pub fn with_grid_divisions(mut self, divisions: usize) -> Self {
        self.grid_divisions = divisions;
        self
    }

    /// Set the frame reduction method.
    pub fn with_method(mut self, method: FrameMethod) -> Self {
        self.method = method;
        self
    }

    /// Frame reduction method in use.
    pub fn method(&self) -> FrameMethod {
        self.method
    }

    /// Number of grid divisions in use.
    pub fn grid_divisions(&self) -> usize {
        self.grid_divisions
    }

    /// Sampling grid for a trajectory of `num_frames` frames.
    ///
    /// Frame indices use integer ceiling division so that fractions such as
    /// 0.15 don't pick up a floating-point off-by-one, and are clamped to the
    /// last frame when the ceiling lands on `num_frames`.
    pub fn grid(&self, num_frames: usize) -> Result<Vec<GridPoint>> {
        let divisions = self.grid_divisions;
        if divisions < 2 {
            return Err(AnalysisError::InvalidGrid(divisions));
        }
        if num_frames == 0 {
            return Err(AnalysisError::FrameOutOfRange {
                frame: 0,
                frames: 0,
            });
        }

        Ok((1..divisions)
            .map(|k| {
                let ceil = (k * num_frames).div_ceil(divisions);
                if ceil >= num_frames {
                    tracing::warn!(k, ceil, num_frames, "grid point clamped to last frame");
                }
                GridPoint {
                    fraction: k as f32 / divisions as f32,
                    frame: ceil.min(num_frames - 1),
                }
            })
            .collect())
    }

    /// Estimate a scalar for channel pair `pair_id` of `tensor`.
    ///
    /// Only batch 0 is examined. Ties in confidence go to the earliest grid
    /// point; a zero-spread frame has infinite confidence and always wins.
    ///
    /// # Errors
    /// [`AnalysisError::EmptyTensor`] if any axis read is empty,
    /// [`AnalysisError::PairOutOfRange`] for a bad pair index,
    /// [`AnalysisError::NoConfidentFrame`] if every confidence is NaN.
    pub fn estimate<S>(&self, tensor: &ArrayBase<S, Ix4>, pair_id: usize) -> Result<TrajectoryEstimate>
    where
        S: Data<Elem = f32>,
    {
        let (n, f, pairs, t) = tensor.dim();
        if n == 0 || f == 0 || t == 0 {
            return Err(AnalysisError::EmptyTensor {
                shape: [n, f, pairs, t],
            });
        }
        if pair_id >= pairs {
            return Err(AnalysisError::PairOutOfRange {
                pair: pair_id,
                pairs,
            });
        }
        self.method.validate()?;

        let grid = self.grid(t)?;
        let mut estimates = Vec::with_capacity(grid.len());
        let mut confidences = Vec::with_capacity(grid.len());

        for point in &grid {
            let column = tensor.slice(s![0, .., pair_id, point.frame]).to_vec();
            let estimate = self.method.apply(&column)?;
            let score = confidence(&column)?;
            tracing::debug!(
                fraction = point.fraction,
                frame = point.frame,
                estimate,
                confidence = score,
                "frame sampled"
            );
            estimates.push(estimate);
            confidences.push(score);
        }

        let best_index = argmax_first(&confidences).ok_or(AnalysisError::NoConfidentFrame)?;
        let value = estimates[best_index];

        tracing::info!(
            pair = pair_id,
            method = self.method.name(),
            frame = grid[best_index].frame,
            value,
            "trajectory estimate"
        );

        Ok(TrajectoryEstimate {
            pair: pair_id,
            value,
            best_index,
            fractions: grid.iter().map(|p| p.fraction).collect(),
            frames: grid.iter().map(|p| p.frame).collect(),
            estimates,
            confidences,
        })
    }
}

/// Estimate with the default 19-point grid and 5% trimmed mean.
pub fn estimate_value<S>(tensor: &ArrayBase<S, Ix4>, pair_id: usize) -> Result<f32>
where
    S: Data<Elem = f32>,
{
    TrajectoryEstimator::new()
        .estimate(tensor, pair_id)
        .map(|e| e.value)
}
