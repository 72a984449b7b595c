//! Multichannel STFT producing magnitude and phase spectral tensors.
//!
//! All channels share the same framing so that bin `k` of frame `t` lines up
//! across microphones, which is what the difference features rely on.

use ndarray::{Array4, s};
use rustfft::{Fft, FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{AnalysisError, Result};

/// Analysis window applied to each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    #[default]
    Hann,
    /// Hamming window
    Hamming,
}

impl Window {
    /// Periodic window coefficients of length `size`.
    pub fn coefficients(&self, size: usize) -> Vec<f32> {
        let n = size as f32;
        (0..size)
            .map(|i| {
                let x = 2.0 * PI * i as f32 / n;
                match self {
                    Window::Rectangular => 1.0,
                    Window::Hann => 0.5 * (1.0 - x.cos()),
                    Window::Hamming => 0.54 - 0.46 * x.cos(),
                }
            })
            .collect()
    }
}

impl FromStr for Window {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hann" => Ok(Window::Hann),
            "hamming" => Ok(Window::Hamming),
            "rectangular" | "rect" | "none" => Ok(Window::Rectangular),
            other => Err(format!("unknown window '{other}' (expected hann, hamming, rect)")),
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Window::Rectangular => "rect",
            Window::Hann => "hann",
            Window::Hamming => "hamming",
        };
        f.write_str(name)
    }
}

/// Magnitude and phase tensors of shape (1, F, C, T).
#[derive(Debug, Clone)]
pub struct SpectralTensors {
    /// `|X|` per (batch, bin, channel, frame).
    pub magnitude: Array4<f32>,
    /// `arg X` in radians, same layout as `magnitude`.
    pub phase: Array4<f32>,
}

/// STFT analyzer shared across channels.
pub struct MultiChannelStft {
    fft_size: usize,
    hop_size: usize,
    window: Window,
    window_coeffs: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl fmt::Debug for MultiChannelStft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiChannelStft")
            .field("fft_size", &self.fft_size)
            .field("hop_size", &self.hop_size)
            .field("window", &self.window)
            .finish()
    }
}

impl MultiChannelStft {
    /// Create an analyzer.
    ///
    /// # Arguments
    /// * `fft_size` - Frame length in samples; yields `fft_size / 2 + 1` bins
    /// * `hop_size` - Hop between frames in samples
    /// * `window` - Window function to use
    pub fn new(fft_size: usize, hop_size: usize, window: Window) -> Result<Self> {
        if fft_size == 0 || hop_size == 0 {
            return Err(AnalysisError::InvalidFrameSize { fft_size, hop_size });
        }
        let fft = FftPlanner::new().plan_fft_forward(fft_size);
        Ok(Self {
            fft_size,
            hop_size,
            window,
            window_coeffs: window.coefficients(fft_size),
            fft,
        })
    }

    /// Number of positive-frequency bins per frame.
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Number of complete frames in a signal of `len` samples.
    pub fn num_frames(&self, len: usize) -> usize {
        if len >= self.fft_size {
            (len - self.fft_size) / self.hop_size + 1
        } else {
            0
        }
    }

    /// Analyze equally long channel signals; channel 0 is the reference.
    pub fn analyze<C: AsRef<[f32]>>(&self, channels: &[C]) -> Result<SpectralTensors> {
        if channels.len() < 2 {
            return Err(AnalysisError::TooFewChannels {
                channels: channels.len(),
            });
        }
        let expected = channels[0].as_ref().len();
        for (channel, signal) in channels.iter().enumerate() {
            let actual = signal.as_ref().len();
            if actual != expected {
                return Err(AnalysisError::ChannelLengthMismatch {
                    channel,
                    expected,
                    actual,
                });
            }
        }

        let bins = self.num_bins();
        let frames = self.num_frames(expected);
        tracing::debug!(
            channels = channels.len(),
            bins,
            frames,
            fft_size = self.fft_size,
            hop_size = self.hop_size,
            window = %self.window,
            "multichannel stft"
        );

        let shape = (1, bins, channels.len(), frames);
        let mut magnitude = Array4::<f32>::zeros(shape);
        let mut phase = Array4::<f32>::zeros(shape);
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.fft_size];

        for (c, signal) in channels.iter().enumerate() {
            let signal = signal.as_ref();
            for t in 0..frames {
                let start = t * self.hop_size;
                for ((slot, &x), &w) in buffer
                    .iter_mut()
                    .zip(&signal[start..start + self.fft_size])
                    .zip(&self.window_coeffs)
                {
                    *slot = Complex::new(x * w, 0.0);
                }
                self.fft.process(&mut buffer);

                for (dst, z) in magnitude
                    .slice_mut(s![0, .., c, t])
                    .iter_mut()
                    .zip(&buffer[..bins])
                {
                    *dst = z.norm();
                }
                for (dst, z) in phase
                    .slice_mut(s![0, .., c, t])
                    .iter_mut()
                    .zip(&buffer[..bins])
                {
                    *dst = z.arg();
                }
            }
        }

        Ok(SpectralTensors { magnitude, phase })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_bin: f32, fft_size: usize, len: usize, amplitude: f32, delay: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let n = i as f32 - delay as f32;
                amplitude * (2.0 * PI * freq_bin * n / fft_size as f32).sin()
            })
            .collect()
    }

    #[test]
    fn test_shapes() {
        let stft = MultiChannelStft::new(64, 32, Window::Hann).unwrap();
        let ch = vec![vec![0.0f32; 320]; 3];
        let out = stft.analyze(&ch).unwrap();
        assert_eq!(out.magnitude.dim(), (1, 33, 3, 9));
        assert_eq!(out.phase.dim(), (1, 33, 3, 9));
    }

    #[test]
    fn test_short_signal_has_no_frames() {
        let stft = MultiChannelStft::new(64, 16, Window::Hann).unwrap();
        let out = stft.analyze(&[vec![0.0f32; 10], vec![0.0f32; 10]]).unwrap();
        assert_eq!(out.magnitude.dim(), (1, 33, 2, 0));
    }

    #[test]
    fn test_gain_shows_in_magnitude_ratio() {
        let fft_size = 128;
        let reference = sine(8.0, fft_size, 1024, 0.5, 0);
        let louder: Vec<f32> = reference.iter().map(|x| x * 2.0).collect();
        let stft = MultiChannelStft::new(fft_size, 64, Window::Hann).unwrap();
        let out = stft.analyze(&[reference, louder]).unwrap();
        let m0 = out.magnitude[[0, 8, 0, 3]];
        let m1 = out.magnitude[[0, 8, 1, 3]];
        assert!((m1 / m0 - 2.0).abs() < 1e-3, "ratio {}", m1 / m0);
    }

    #[test]
    fn test_rejects_mismatched_channels() {
        let stft = MultiChannelStft::new(32, 16, Window::Rectangular).unwrap();
        let result = stft.analyze(&[vec![0.0f32; 64], vec![0.0f32; 63]]);
        assert!(matches!(
            result,
            Err(AnalysisError::ChannelLengthMismatch {
                channel: 1,
                expected: 64,
                actual: 63
            })
        ));
        assert!(matches!(
            stft.analyze(&[vec![0.0f32; 64]]),
            Err(AnalysisError::TooFewChannels { channels: 1 })
        ));
    }

    #[test]
    fn test_invalid_framing() {
        assert!(MultiChannelStft::new(0, 16, Window::Hann).is_err());
        assert!(MultiChannelStft::new(16, 0, Window::Hann).is_err());
    }

    #[test]
    fn test_window_parse() {
        assert_eq!("HANN".parse::<Window>().unwrap(), Window::Hann);
        assert_eq!("rect".parse::<Window>().unwrap(), Window::Rectangular);
        assert!("kaiser".parse::<Window>().is_err());
        assert_eq!(Window::Hamming.to_string(), "hamming");
    }

    #[test]
    fn test_hann_edges() {
        let w = Window::Hann.coefficients(100);
        assert!(w[0] < 0.01);
        assert!((w[50] - 1.0).abs() < 0.01);
    }
}
