//! Estimation straight from a multichannel WAV recording.

use anyhow::{Context, bail};
use clap::Args;
use intermic_analysis::{MultiChannelStft, Window};
use intermic_io::{WavFormat, read_wav_channels, read_wav_info};
use std::path::PathBuf;

use super::common::{DelayScale, EstimatorArgs, ExportArgs, run_estimates};

#[derive(Args)]
pub struct StftArgs {
    /// Multichannel WAV file; channel 0 is the reference microphone
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// FFT size
    #[arg(long, default_value = "1024")]
    fft_size: usize,

    /// Hop size (default: half the FFT size)
    #[arg(long)]
    hop: Option<usize>,

    /// Window function (hann, hamming, rect)
    #[arg(long, default_value = "hann")]
    window: Window,

    /// Channel pair; pair i compares channel i+1 with channel 0
    #[arg(long, default_value = "0")]
    pair: usize,

    #[command(flatten)]
    estimator: EstimatorArgs,

    #[command(flatten)]
    export: ExportArgs,
}

pub fn run(args: StftArgs) -> anyhow::Result<()> {
    let estimator = args.estimator.build()?;

    let hop = args.hop.unwrap_or(args.fft_size / 2);
    let stft = MultiChannelStft::new(args.fft_size, hop, args.window)?;

    println!("Analyzing {}...", args.input.display());
    let info = read_wav_info(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let format = match info.format {
        WavFormat::Pcm => "PCM",
        WavFormat::IeeeFloat => "float",
    };
    println!(
        "  {} channels, {} samples, {} Hz, {}-bit {}, {:.2}s",
        info.channels,
        info.num_frames,
        info.sample_rate,
        info.bits_per_sample,
        format,
        info.duration_secs
    );

    if info.channels < 2 {
        bail!("need at least two channels, got {}", info.channels);
    }
    if info.num_frames < args.fft_size as u64 {
        bail!(
            "recording of {} samples is shorter than one {}-sample frame",
            info.num_frames,
            args.fft_size
        );
    }

    let (channels, spec) = read_wav_channels(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let spectra = stft.analyze(&channels)?;
    let frames = spectra.magnitude.dim().3;
    println!(
        "  {} bins x {} frames ({} window, hop {})",
        stft.num_bins(),
        frames,
        args.window,
        hop
    );

    run_estimates(
        &spectra.magnitude,
        &spectra.phase,
        args.pair,
        &estimator,
        &args.export,
        Some(DelayScale {
            fft_size: args.fft_size,
            sample_rate: spec.sample_rate,
        }),
    )
}
