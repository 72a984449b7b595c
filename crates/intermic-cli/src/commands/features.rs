//! Difference tensor inspection.

use anyhow::bail;
use clap::Args;
use intermic_analysis::export::export_slice_csv;
use intermic_analysis::features::{frequency_slice, magnitude_difference, phase_difference};
use std::path::PathBuf;

use super::common::SpectraArgs;

#[derive(Args)]
pub struct FeaturesArgs {
    #[command(flatten)]
    spectra: SpectraArgs,

    /// Channel pair; pair i compares channel i+1 with channel 0
    #[arg(long, default_value = "0")]
    pair: usize,

    /// Time fraction of the inspected slice
    #[arg(long, default_value = "0.35")]
    at: f32,

    /// Write pmd/ppd slice CSVs into this directory
    #[arg(long, value_name = "DIR")]
    csv_dir: Option<PathBuf>,
}

/// Frame at time fraction `at`, rounded up like the estimator grid.
fn frame_at(at: f32, frames: usize) -> usize {
    ((at * frames as f32).ceil() as usize).min(frames.saturating_sub(1))
}

pub fn run(args: FeaturesArgs) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&args.at) {
        bail!("--at must lie in [0, 1], got {}", args.at);
    }

    let (magnitude, phase) = args.spectra.load()?;
    let pmd = magnitude_difference(&magnitude)?;
    let ppd = phase_difference(&phase)?;

    println!("Spectral tensor:           {:?}", magnitude.shape());
    println!("Magnitude difference (pmd): {:?}", pmd.shape());
    println!("Phase difference (ppd):     {:?}", ppd.shape());

    let frame = frame_at(args.at, pmd.dim().3);
    let pmd_column = frequency_slice(&pmd, args.pair, frame)?;
    let ppd_column = frequency_slice(&ppd, args.pair, frame)?;

    println!();
    println!(
        "Pair {} at t={:.2} (frame {})",
        args.pair, args.at, frame
    );
    println!("{:>6} {:>12} {:>12}", "bin", "pmd", "ppd");
    for (bin, (m, p)) in pmd_column.iter().zip(ppd_column.iter()).enumerate() {
        println!("{:>6} {:>12.6} {:>12.6}", bin, m, p);
    }

    if let Some(dir) = &args.csv_dir {
        std::fs::create_dir_all(dir)?;
        export_slice_csv(&pmd, args.pair, frame, dir.join("pmd_slice.csv"))?;
        export_slice_csv(&ppd, args.pair, frame, dir.join("ppd_slice.csv"))?;
        println!("\nSlices saved to {}", dir.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_at() {
        assert_eq!(frame_at(0.35, 40), 14);
        assert_eq!(frame_at(0.0, 40), 0);
        assert_eq!(frame_at(1.0, 40), 39);
        assert_eq!(frame_at(0.5, 1), 0);
    }
}
