//! Intermic Analysis - inter-microphone difference features and estimation
//!
//! This crate turns multichannel short-time spectra into pairwise features
//! against a reference microphone and reduces a feature trajectory to a
//! single robust value:
//!
//! - [`features`] - log magnitude ratio, unwrapped phase difference, frequency gradient
//! - [`phase`] - floor-mod phase wrapping and column-wise unwrapping
//! - [`estimator`] - time-sampled trimmed mean with inverse-spread confidence
//! - [`stats`] - trimmed mean, population std, confidence, argmax
//! - [`histogram`] - histogram-mode frame estimate (alternative reducer)
//! - [`stft`] - multichannel STFT producing spectral tensors
//! - [`config`] - TOML estimator configuration
//! - [`export`] - CSV output of estimator series and feature slices
//!
//! ## Tensor Layout
//!
//! Spectral tensors are `ndarray::Array4<f32>` indexed
//! (batch, frequency, channel, time). Channel 0 is the reference microphone.
//! Feature tensors keep the layout with the channel axis replaced by channel
//! pairs: pair `i` compares channel `i + 1` against channel 0.
//!
//! ## Example Workflow
//!
//! ```rust,ignore
//! use intermic_analysis::{features, TrajectoryEstimator};
//!
//! // (1, F, C, T) magnitude and phase from the STFT stage
//! let pmd = features::magnitude_difference(&magnitude)?;
//! let ppd = features::phase_difference(&phase)?;
//!
//! // phase slope ~ time delay, log ratio ~ level difference
//! let slope = features::frequency_gradient(&ppd)?;
//! let estimator = TrajectoryEstimator::new();
//! let delay = estimator.estimate(&slope, 2)?;
//! let level = estimator.estimate(&pmd, 2)?;
//! println!("slope {:.4}, level {:.4}", delay.value, level.value);
//! ```

pub mod config;
pub mod error;
pub mod estimator;
pub mod export;
pub mod features;
pub mod histogram;
pub mod phase;
pub mod stats;
pub mod stft;

// Re-export main types
pub use config::EstimatorConfig;
pub use error::{AnalysisError, Result};
pub use estimator::{FrameMethod, GridPoint, TrajectoryEstimate, TrajectoryEstimator, estimate_value};
pub use features::{
    EPS, frequency_gradient, frequency_slice, magnitude_difference, phase_difference,
    to_spectral_tensor,
};
pub use histogram::histogram_mode_estimate;
pub use phase::{unwrap_axis, unwrap_phase, wrap_to_pi};
pub use stats::{confidence, population_std, trimmed_mean};
pub use stft::{MultiChannelStft, SpectralTensors, Window};
