//! Inter-microphone difference features.
//!
//! Every spectral tensor is laid out as (batch, frequency, channel, time) with
//! channel 0 the reference microphone. Each non-reference channel `c` yields
//! one channel pair `c - 1` in the output tensors:
//!
//! - [`magnitude_difference`]: clamped log magnitude ratio `ln(M_c / M_0)`
//! - [`phase_difference`]: wrapped then frequency-unwrapped `φ_c - φ_0`
//! - [`frequency_gradient`]: first difference along frequency (phase slope)

use ndarray::{Array4, ArrayBase, Axis, Data, Ix3, Ix4, Zip, s};
use std::f32::consts::PI;

use crate::error::{AnalysisError, Result};
use crate::phase::{unwrap_axis, wrap_to_pi};

/// Additive guard against division by zero and `ln(0)`.
pub const EPS: f32 = 1e-8;

/// Upper clamp of the log magnitude ratio.
pub const MAG_DIFF_MAX: f32 = 10000.0;

/// Axis holding frequency bins.
pub const FREQ_AXIS: Axis = Axis(1);

/// Axis holding channels (input) or channel pairs (output).
pub const CHANNEL_AXIS: Axis = Axis(2);

/// Lower clamp of the log magnitude ratio, `ln(EPS)`.
pub fn mag_diff_min() -> f32 {
    EPS.ln()
}

fn check_channels<S: Data<Elem = f32>>(input: &ArrayBase<S, Ix4>) -> Result<usize> {
    let channels = input.len_of(CHANNEL_AXIS);
    if channels < 2 {
        return Err(AnalysisError::TooFewChannels { channels });
    }
    Ok(channels)
}

/// Log magnitude ratio of every channel against the reference channel.
///
/// For each non-reference channel `c`:
///
/// ```text
/// ratio = M[:, :, c, :] / (M[:, :, 0, :] + EPS)
/// out   = clamp(ln(ratio + EPS), ln(EPS), 10000)
/// ```
///
/// Output is finite for any non-negative finite input.
///
/// # Arguments
/// * `magnitude` - STFT magnitudes, shape (N, F, C, T), C ≥ 2
///
/// # Returns
/// Magnitude difference tensor of shape (N, F, C - 1, T)
pub fn magnitude_difference<S>(magnitude: &ArrayBase<S, Ix4>) -> Result<Array4<f32>>
where
    S: Data<Elem = f32>,
{
    let channels = check_channels(magnitude)?;
    let (n, f, _, t) = magnitude.dim();
    let min = mag_diff_min();

    let mut output = Array4::<f32>::zeros((n, f, channels - 1, t));
    let reference = magnitude.slice(s![.., .., 0, ..]);

    for c in 1..channels {
        Zip::from(output.slice_mut(s![.., .., c - 1, ..]))
            .and(magnitude.slice(s![.., .., c, ..]))
            .and(&reference)
            .for_each(|out, &m, &m0| {
                let ratio = m / (m0 + EPS);
                *out = (ratio + EPS).ln().clamp(min, MAG_DIFF_MAX);
            });
    }

    Ok(output)
}

/// Unwrapped phase difference of every channel against the reference channel.
///
/// The raw difference `φ_c - φ_0` is wrapped into (-π, π] with a floor-mod and
/// then unwrapped along the frequency axis for every (batch, pair, time)
/// column. Jumps that genuinely exceed π between adjacent bins cannot be told
/// apart from wraps and are removed as well.
///
/// # Arguments
/// * `phase` - STFT phase in radians, shape (N, F, C, T), C ≥ 2
///
/// # Returns
/// Phase difference tensor of shape (N, F, C - 1, T)
pub fn phase_difference<S>(phase: &ArrayBase<S, Ix4>) -> Result<Array4<f32>>
where
    S: Data<Elem = f32>,
{
    let channels = check_channels(phase)?;
    let (n, f, _, t) = phase.dim();

    let mut output = Array4::<f32>::zeros((n, f, channels - 1, t));
    let reference = phase.slice(s![.., .., 0, ..]);

    for c in 1..channels {
        Zip::from(output.slice_mut(s![.., .., c - 1, ..]))
            .and(phase.slice(s![.., .., c, ..]))
            .and(&reference)
            .for_each(|out, &p, &p0| *out = wrap_to_pi(p - p0));
    }

    unwrap_axis(&mut output, FREQ_AXIS, PI);
    Ok(output)
}

/// First-order difference along the frequency axis.
///
/// `out[:, k, :, :] = in[:, k + 1, :, :] - in[:, k, :, :]`. Applied to a phase
/// difference tensor this gives the phase slope per bin, which is
/// proportional to the inter-microphone time delay.
///
/// # Returns
/// Tensor of shape (N, F - 1, P, T)
pub fn frequency_gradient<S>(tensor: &ArrayBase<S, Ix4>) -> Result<Array4<f32>>
where
    S: Data<Elem = f32>,
{
    let bins = tensor.len_of(FREQ_AXIS);
    if bins < 2 {
        return Err(AnalysisError::TooFewBins { bins, required: 2 });
    }

    let upper = tensor.slice(s![.., 1.., .., ..]);
    let lower = tensor.slice(s![.., ..-1, .., ..]);
    Ok(&upper - &lower)
}

/// Reshape a channel-major (C, F, T) matrix into a (1, F, C, T) spectral tensor.
pub fn to_spectral_tensor<S>(matrix: &ArrayBase<S, Ix3>) -> Array4<f32>
where
    S: Data<Elem = f32>,
{
    matrix
        .view()
        .permuted_axes([1, 0, 2])
        .insert_axis(Axis(0))
        .to_owned()
}

/// Extract one frequency column `tensor[0, :, pair, frame]` as a vector.
pub fn frequency_slice<S>(tensor: &ArrayBase<S, Ix4>, pair: usize, frame: usize) -> Result<Vec<f32>>
where
    S: Data<Elem = f32>,
{
    let (n, f, pairs, t) = tensor.dim();
    if n == 0 || f == 0 || t == 0 {
        return Err(AnalysisError::EmptyTensor {
            shape: [n, f, pairs, t],
        });
    }
    if pair >= pairs {
        return Err(AnalysisError::PairOutOfRange { pair, pairs });
    }
    if frame >= t {
        return Err(AnalysisError::FrameOutOfRange { frame, frames: t });
    }
    Ok(tensor.slice(s![0, .., pair, frame]).to_vec())
}
