//! CLI command implementations.

pub mod common;
pub mod estimate;
pub mod features;
pub mod stft;
