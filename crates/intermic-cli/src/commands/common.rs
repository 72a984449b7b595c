//! Shared CLI helpers used across multiple commands.

use anyhow::{Context, bail};
use clap::{Args, ValueEnum};
use intermic_analysis::estimator::DEFAULT_TRIM_PROPORTION;
use intermic_analysis::export::export_trajectory_csv;
use intermic_analysis::histogram::{DEFAULT_BIN_WIDTH, DEFAULT_TOP_BINS};
use intermic_analysis::{
    EstimatorConfig, FrameMethod, TrajectoryEstimate, TrajectoryEstimator, features,
};
use intermic_io::read_matrix_json;
use ndarray::Array4;
use serde::Serialize;
use std::f32::consts::PI;
use std::path::PathBuf;

/// Magnitude and phase matrix files.
#[derive(Args)]
pub struct SpectraArgs {
    /// Magnitude matrix, JSON channel x bin x frame
    #[arg(long, value_name = "FILE")]
    pub mag: PathBuf,

    /// Phase matrix in radians (defaults to the magnitude file)
    #[arg(long, value_name = "FILE")]
    pub phs: Option<PathBuf>,

    /// Variable name holding the magnitudes
    #[arg(long, default_value = "mag")]
    pub mag_var: String,

    /// Variable name holding the phases
    #[arg(long, default_value = "phs")]
    pub phs_var: String,
}

impl SpectraArgs {
    /// Load both matrices as (1, F, C, T) spectral tensors.
    pub fn load(&self) -> anyhow::Result<(Array4<f32>, Array4<f32>)> {
        let mag = read_matrix_json(&self.mag, Some(&self.mag_var))
            .with_context(|| format!("loading magnitudes from {}", self.mag.display()))?;
        let phs_path = self.phs.as_ref().unwrap_or(&self.mag);
        let phs = read_matrix_json(phs_path, Some(&self.phs_var))
            .with_context(|| format!("loading phases from {}", phs_path.display()))?;

        if mag.dim() != phs.dim() {
            bail!(
                "magnitude shape {:?} does not match phase shape {:?}",
                mag.dim(),
                phs.dim()
            );
        }

        let (channels, bins, frames) = mag.dim();
        println!("Loaded {channels} channels, {bins} bins, {frames} frames");

        Ok((
            features::to_spectral_tensor(&mag),
            features::to_spectral_tensor(&phs),
        ))
    }
}

/// Frame reduction method names accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MethodArg {
    /// Symmetric trimmed mean
    Trimmed,
    /// Plain mean
    Mean,
    /// Histogram mode (experimental)
    Histogram,
}

/// Estimator settings: a TOML config plus command-line overrides.
#[derive(Args)]
pub struct EstimatorArgs {
    /// Estimator configuration (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Frame reduction method
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,

    /// Fraction trimmed from each tail by the trimmed mean
    #[arg(long)]
    pub trim: Option<f32>,

    /// Histogram bin width
    #[arg(long)]
    pub bin_width: Option<f32>,

    /// Number of histogram bins kept
    #[arg(long)]
    pub top_bins: Option<usize>,

    /// Time grid divisions (the grid has divisions - 1 points)
    #[arg(long)]
    pub divisions: Option<usize>,
}

impl EstimatorArgs {
    /// Resolve config file and flags into an estimator.
    pub fn build(&self) -> anyhow::Result<TrajectoryEstimator> {
        let mut config = match &self.config {
            Some(path) => EstimatorConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => EstimatorConfig::default(),
        };

        let base = match self.method {
            Some(MethodArg::Trimmed) => FrameMethod::TrimmedMean {
                proportion: DEFAULT_TRIM_PROPORTION,
            },
            Some(MethodArg::Mean) => FrameMethod::Mean,
            Some(MethodArg::Histogram) => FrameMethod::Histogram {
                bin_width: DEFAULT_BIN_WIDTH,
                top_bins: DEFAULT_TOP_BINS,
            },
            None => config.frame_method,
        };
        config.frame_method = match base {
            FrameMethod::TrimmedMean { proportion } => FrameMethod::TrimmedMean {
                proportion: self.trim.unwrap_or(proportion),
            },
            FrameMethod::Mean => FrameMethod::Mean,
            FrameMethod::Histogram {
                bin_width,
                top_bins,
            } => FrameMethod::Histogram {
                bin_width: self.bin_width.unwrap_or(bin_width),
                top_bins: self.top_bins.unwrap_or(top_bins),
            },
        };
        if let Some(divisions) = self.divisions {
            config.grid_divisions = divisions;
        }

        tracing::debug!(?config, "estimator settings");
        Ok(TrajectoryEstimator::from_config(&config)?)
    }
}

/// Optional report outputs.
#[derive(Args)]
pub struct ExportArgs {
    /// Write both trajectories as a JSON report
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Write per-grid-point CSV series into this directory
    #[arg(long, value_name = "DIR")]
    pub csv_dir: Option<PathBuf>,
}

/// FFT size and sample rate, when known, to turn the phase slope into a delay.
#[derive(Debug, Clone, Copy)]
pub struct DelayScale {
    /// FFT length the spectra were computed with.
    pub fft_size: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl DelayScale {
    /// Delay of the pair's microphone relative to the reference, in samples.
    ///
    /// A delay of `d` samples rotates bin `k` by `-2π k d / N`.
    pub fn samples(&self, slope: f32) -> f32 {
        -slope * self.fft_size as f32 / (2.0 * PI)
    }
}

#[derive(Serialize)]
struct Report<'a> {
    pair: usize,
    method: &'static str,
    phase_slope: &'a TrajectoryEstimate,
    level_difference: &'a TrajectoryEstimate,
    #[serde(skip_serializing_if = "Option::is_none")]
    delay_samples: Option<f32>,
}

/// Run both estimators for one channel pair, print the series and export.
pub fn run_estimates(
    magnitude: &Array4<f32>,
    phase: &Array4<f32>,
    pair: usize,
    estimator: &TrajectoryEstimator,
    export: &ExportArgs,
    scale: Option<DelayScale>,
) -> anyhow::Result<()> {
    let pmd = features::magnitude_difference(magnitude)?;
    let ppd = features::phase_difference(phase)?;
    let slope_tensor = features::frequency_gradient(&ppd)?;

    let pairs = pmd.dim().2;
    if pair >= pairs {
        bail!(
            "pair {} out of range: {} pair(s) available (0..{})",
            pair,
            pairs,
            pairs
        );
    }

    let slope = estimator.estimate(&slope_tensor, pair)?;
    let level = estimator.estimate(&pmd, pair)?;

    println!();
    println!(
        "Pair {} (channel {} vs reference), method {}",
        pair,
        pair + 1,
        estimator.method().name()
    );
    print_series(&slope, &level);
    println!();
    println!(
        "Phase slope:      {:>10.6} rad/bin  (t={:.2}, frame {}, confidence {:.2})",
        slope.value,
        slope.best_fraction(),
        slope.best_frame(),
        slope.best_confidence()
    );
    println!(
        "Level difference: {:>10.6} ln ratio ({:+.2} dB, t={:.2}, frame {}, confidence {:.2})",
        level.value,
        level.value * 20.0 / std::f32::consts::LN_10,
        level.best_fraction(),
        level.best_frame(),
        level.best_confidence()
    );

    let delay_samples = scale.map(|s| s.samples(slope.value));
    if let (Some(scale), Some(delay)) = (scale, delay_samples) {
        println!(
            "Delay:            {:>10.3} samples  ({:.3} ms)",
            delay,
            1000.0 * delay / scale.sample_rate as f32
        );
    }

    if let Some(path) = &export.json {
        let report = Report {
            pair,
            method: estimator.method().name(),
            phase_slope: &slope,
            level_difference: &level,
            delay_samples,
        };
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("\nReport saved to {}", path.display());
    }

    if let Some(dir) = &export.csv_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let slope_path = dir.join(format!("phase_slope_pair{pair}.csv"));
        let level_path = dir.join(format!("level_difference_pair{pair}.csv"));
        export_trajectory_csv(&slope, &slope_path)?;
        export_trajectory_csv(&level, &level_path)?;
        println!("Series saved to {}", dir.display());
    }

    Ok(())
}

fn print_series(slope: &TrajectoryEstimate, level: &TrajectoryEstimate) {
    println!(
        "{:>6} {:>6} {:>12} {:>10} {:>12} {:>10}",
        "t", "frame", "slope", "conf", "level", "conf"
    );
    for i in 0..slope.len() {
        let slope_mark = if i == slope.best_index { '*' } else { ' ' };
        let level_mark = if i == level.best_index { '*' } else { ' ' };
        println!(
            "{:>6.2} {:>6} {:>12.6} {:>10.2}{} {:>11.6} {:>10.2}{}",
            slope.fractions[i],
            slope.frames[i],
            slope.estimates[i],
            slope.confidences[i],
            slope_mark,
            level.estimates[i],
            level.confidences[i],
            level_mark
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_scale_inverts_slope() {
        let scale = DelayScale {
            fft_size: 512,
            sample_rate: 16000,
        };
        let slope = -2.0 * PI * 3.0 / 512.0;
        assert!((scale.samples(slope) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_trim_override_applies_to_config_method() {
        let args = EstimatorArgs {
            config: None,
            method: None,
            trim: Some(0.1),
            bin_width: None,
            top_bins: None,
            divisions: Some(10),
        };
        let estimator = args.build().unwrap();
        assert_eq!(
            estimator.method(),
            FrameMethod::TrimmedMean { proportion: 0.1 }
        );
        assert_eq!(estimator.grid_divisions(), 10);
    }

    #[test]
    fn test_histogram_method_defaults() {
        let args = EstimatorArgs {
            config: None,
            method: Some(MethodArg::Histogram),
            trim: Some(0.2),
            bin_width: None,
            top_bins: Some(3),
            divisions: None,
        };
        let estimator = args.build().unwrap();
        assert_eq!(
            estimator.method(),
            FrameMethod::Histogram {
                bin_width: DEFAULT_BIN_WIDTH,
                top_bins: 3
            }
        );
    }

    #[test]
    fn test_invalid_trim_rejected() {
        let args = EstimatorArgs {
            config: None,
            method: Some(MethodArg::Trimmed),
            trim: Some(0.7),
            bin_width: None,
            top_bins: None,
            divisions: None,
        };
        assert!(args.build().is_err());
    }
}
