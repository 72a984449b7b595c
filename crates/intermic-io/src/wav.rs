//! Multichannel WAV reading and writing.
//!
//! Samples are deinterleaved on read so each microphone arrives as its own
//! vector, the layout the multichannel STFT consumes.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of microphones.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Samples per channel.
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let num_frames = u64::from(reader.len()) / u64::from(spec.channels.max(1));

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs: num_frames as f64 / f64::from(spec.sample_rate),
        format,
    })
}

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of channels. Writers override this with the channel count
    /// actually passed in.
    pub channels: u16,
    /// Sample rate in Hz (e.g., 16000, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample; 32 selects float, anything else integer PCM.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 16000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Read a WAV file as one `Vec<f32>` per channel.
///
/// Integer PCM is scaled to [-1, 1). A trailing partial frame is dropped.
///
/// # Example
/// ```ignore
/// let (channels, spec) = read_wav_channels("array.wav")?;
/// assert_eq!(channels.len(), spec.channels as usize);
/// ```
pub fn read_wav_channels<P: AsRef<Path>>(path: P) -> Result<(Vec<Vec<f32>>, WavSpec)> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let frames = interleaved.len() / channels;
    let mut out = vec![Vec::with_capacity(frames); channels];
    for chunk in interleaved.chunks_exact(channels) {
        for (channel, &sample) in out.iter_mut().zip(chunk) {
            channel.push(sample);
        }
    }

    tracing::debug!(
        path = %path.display(),
        channels,
        frames,
        sample_rate = spec.sample_rate,
        "read multichannel wav"
    );
    Ok((out, spec))
}

/// Write equal-length channels to an interleaved WAV file.
///
/// # Example
/// ```ignore
/// let mics = vec![vec![0.0f32; 16000]; 4];
/// write_wav_channels("silence.wav", &mics, WavSpec::default())?;
/// ```
pub fn write_wav_channels<P, C>(path: P, channels: &[C], spec: WavSpec) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[f32]>,
{
    let expected = channels.first().map_or(0, |c| c.as_ref().len());
    for (channel, samples) in channels.iter().enumerate() {
        let actual = samples.as_ref().len();
        if actual != expected {
            return Err(Error::ChannelLengthMismatch {
                channel,
                expected,
                actual,
            });
        }
    }

    let mut file_spec = spec;
    file_spec.channels = channels.len() as u16;
    let mut writer = WavWriter::create(path, hound::WavSpec::from(file_spec))?;

    if spec.bits_per_sample == 32 {
        for i in 0..expected {
            for samples in channels {
                writer.write_sample(samples.as_ref()[i])?;
            }
        }
    } else {
        let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
        for i in 0..expected {
            for samples in channels {
                let int_sample = (samples.as_ref()[i] * max_val).clamp(-max_val, max_val - 1.0) as i32;
                writer.write_sample(int_sample)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn ramp(len: usize, scale: f32) -> Vec<f32> {
        (0..len).map(|i| (i as f32 / len as f32 * scale).sin()).collect()
    }

    #[test]
    fn test_roundtrip_f32_three_channels() {
        let mics = vec![ramp(500, 1.0), ramp(500, 2.0), ramp(500, 3.0)];
        let spec = WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
        };

        let file = NamedTempFile::new().unwrap();
        write_wav_channels(file.path(), &mics, spec).unwrap();

        let (loaded, loaded_spec) = read_wav_channels(file.path()).unwrap();
        assert_eq!(loaded_spec.channels, 3);
        assert_eq!(loaded_spec.sample_rate, 16000);
        assert_eq!(loaded.len(), 3);
        for (a, b) in mics.iter().zip(loaded.iter()) {
            assert_eq!(a.len(), b.len());
            for (x, y) in a.iter().zip(b.iter()) {
                assert!((x - y).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_roundtrip_i16() {
        let mics = vec![ramp(300, 0.9), ramp(300, -0.9)];
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
        };

        let file = NamedTempFile::new().unwrap();
        write_wav_channels(file.path(), &mics, spec).unwrap();

        let (loaded, _) = read_wav_channels(file.path()).unwrap();
        // 16-bit has less precision
        for (a, b) in mics.iter().zip(loaded.iter()) {
            for (x, y) in a.iter().zip(b.iter()) {
                assert!((x - y).abs() < 0.001);
            }
        }
    }

    #[test]
    fn test_mismatched_channels_rejected() {
        let mics = vec![vec![0.0f32; 10], vec![0.0f32; 9]];
        let file = NamedTempFile::new().unwrap();
        let err = write_wav_channels(file.path(), &mics, WavSpec::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::ChannelLengthMismatch {
                channel: 1,
                expected: 10,
                actual: 9
            }
        ));
    }

    #[test]
    fn test_info_counts_frames_per_channel() {
        let mics = vec![vec![0.25f32; 1600]; 4];
        let file = NamedTempFile::new().unwrap();
        write_wav_channels(file.path(), &mics, WavSpec::default()).unwrap();

        let info = read_wav_info(file.path()).unwrap();
        assert_eq!(info.channels, 4);
        assert_eq!(info.num_frames, 1600);
        assert_eq!(info.format, WavFormat::IeeeFloat);
        assert!((info.duration_secs - 0.1).abs() < 1e-9);
    }
}
