//! File I/O for inter-microphone analysis.
//!
//! This crate provides:
//!
//! - **Multichannel WAV I/O**: [`read_wav_channels`] and [`write_wav_channels`]
//!   keep every microphone as its own sample vector
//! - **Matrix files**: [`read_matrix_json`] and [`write_matrix_json`] load and
//!   save channel-major (C, F, T) spectra as nested JSON arrays
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use intermic_io::{read_matrix_json, read_wav_channels};
//!
//! // Precomputed magnitude spectra stored under the "mag" key
//! let mag = read_matrix_json("spectra.json", Some("mag"))?;
//! println!("{} channels, {} bins, {} frames", mag.dim().0, mag.dim().1, mag.dim().2);
//!
//! // Raw array recording
//! let (channels, spec) = read_wav_channels("array.wav")?;
//! println!("{} mics at {} Hz", channels.len(), spec.sample_rate);
//! ```

mod matrix;
mod wav;

pub use matrix::{read_matrix_json, write_matrix_json};
pub use wav::{WavFormat, WavInfo, WavSpec, read_wav_channels, read_wav_info, write_wav_channels};

/// Error types for file I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Malformed JSON document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The named variable is absent from a matrix document.
    #[error("Variable '{0}' not found in matrix file")]
    MissingVariable(String),

    /// Matrix data is not a rectangular 3-D array of numbers.
    #[error("Invalid matrix shape: {0}")]
    Shape(String),

    /// Channels passed to a writer do not share one length.
    #[error("Channel {channel} has {actual} samples, expected {expected}")]
    ChannelLengthMismatch {
        /// Offending channel index.
        channel: usize,
        /// Length of channel 0.
        expected: usize,
        /// Length of the offending channel.
        actual: usize,
    },

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for file I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
