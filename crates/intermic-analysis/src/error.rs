//! Error types for feature extraction and trajectory estimation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the analysis routines.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The spectral tensor has no non-reference channel.
    #[error("need at least 2 channels (reference + 1), got {channels}")]
    TooFewChannels {
        /// Number of channels found on the channel axis.
        channels: usize,
    },

    /// The frequency axis is too short for the requested operation.
    #[error("need at least {required} frequency bins, got {bins}")]
    TooFewBins {
        /// Number of bins found on the frequency axis.
        bins: usize,
        /// Minimum number of bins the operation requires.
        required: usize,
    },

    /// A tensor axis the estimator reads from is empty.
    #[error("tensor of shape {shape:?} has an empty axis")]
    EmptyTensor {
        /// Shape as (batch, frequency, pair, time).
        shape: [usize; 4],
    },

    /// Channel-pair index outside `[0, pairs - 1]`.
    #[error("pair index {pair} out of range (tensor holds {pairs} pairs)")]
    PairOutOfRange {
        /// Requested pair index.
        pair: usize,
        /// Number of pairs on the pair axis.
        pairs: usize,
    },

    /// Time-frame index outside `[0, frames - 1]`.
    #[error("frame index {frame} out of range (tensor holds {frames} frames)")]
    FrameOutOfRange {
        /// Requested frame index.
        frame: usize,
        /// Number of frames on the time axis.
        frames: usize,
    },

    /// Sampling grid needs at least two divisions to place a point.
    #[error("grid divisions must be at least 2, got {0}")]
    InvalidGrid(usize),

    /// A statistic was requested over an empty slice.
    #[error("cannot compute a statistic over an empty slice")]
    EmptySlice,

    /// Trim proportion outside `[0, 0.5)`.
    #[error("trim proportion must lie in [0, 0.5), got {0}")]
    InvalidProportion(f32),

    /// Histogram bin width is zero, negative or not finite.
    #[error("histogram bin width must be positive and finite, got {0}")]
    InvalidBinWidth(f32),

    /// Histogram estimator asked to keep zero bins.
    #[error("histogram estimator must keep at least one bin")]
    InvalidTopBins,

    /// Value range too wide (or non-finite) for the histogram bin width.
    #[error("value range {range} at bin width {bin_width} needs more than {limit} histogram bins")]
    TooManyBins {
        /// Spread between the smallest and largest value.
        range: f32,
        /// Requested bin width.
        bin_width: f32,
        /// Maximum number of bins allowed.
        limit: usize,
    },

    /// Every sampled frame produced a NaN confidence.
    #[error("no sampled frame produced a usable confidence score")]
    NoConfidentFrame,

    /// Channel signals passed to the STFT differ in length.
    #[error("channel {channel} has {actual} samples, expected {expected}")]
    ChannelLengthMismatch {
        /// Offending channel index.
        channel: usize,
        /// Length of channel 0.
        expected: usize,
        /// Length of the offending channel.
        actual: usize,
    },

    /// STFT frame or hop size is zero.
    #[error("invalid STFT framing: fft_size={fft_size}, hop_size={hop_size}")]
    InvalidFrameSize {
        /// FFT (frame) length in samples.
        fft_size: usize,
        /// Hop between frames in samples.
        hop_size: usize,
    },

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::WriteFile {
            path: path.into(),
            source,
        }
    }
}

/// Convenience result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    #[test]
    fn read_file_factory_produces_correct_variant() {
        let err = AnalysisError::read_file("/some/path", mock_io_err());
        assert!(
            matches!(err, AnalysisError::ReadFile { ref path, .. } if path == std::path::Path::new("/some/path"))
        );
        assert!(err.source().is_some(), "ReadFile must expose I/O source");
    }

    #[test]
    fn pair_out_of_range_display() {
        let err = AnalysisError::PairOutOfRange { pair: 3, pairs: 2 };
        assert_eq!(
            err.to_string(),
            "pair index 3 out of range (tensor holds 2 pairs)"
        );
    }

    #[test]
    fn too_few_channels_display() {
        let err = AnalysisError::TooFewChannels { channels: 1 };
        let msg = err.to_string();
        assert!(msg.contains("at least 2 channels"), "got: {msg}");
        assert!(err.source().is_none());
    }
}
