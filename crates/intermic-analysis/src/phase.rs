//! Phase wrapping and unwrapping.
//!
//! Phase differences between two microphones are only known modulo 2π. These
//! helpers fold raw differences into a single period and reconstruct a
//! continuous curve along one axis by removing 2π discontinuities.
//!
//! - [`wrap_to_pi`]: floor-modulo wrap into (-π, π]
//! - [`unwrap_phase`]: forward unwrap of a slice with π tolerance
//! - [`unwrap_phase_tol`]: same with a configurable tolerance
//! - [`unwrap_axis`]: column-wise unwrap of an n-D array along one axis
//!
//! Reference: Ghiglia & Pritt, "Two-Dimensional Phase Unwrapping" (1998), ch. 3.

use ndarray::{ArrayBase, ArrayViewMut1, Axis, DataMut, Dimension};
use std::f32::consts::{PI, TAU};

/// Wrap a phase value into (-π, π].
///
/// Uses a floor-style remainder (`rem_euclid`) so negative inputs wrap the
/// same way as positive ones. `-π` itself maps to `+π`.
///
/// ```rust
/// # use intermic_analysis::phase::wrap_to_pi;
/// use std::f32::consts::PI;
/// assert!((wrap_to_pi(-1.5 * PI) - 0.5 * PI).abs() < 1e-6);
/// assert!((wrap_to_pi(-PI) - PI).abs() < 1e-6);
/// ```
pub fn wrap_to_pi(x: f32) -> f32 {
    let wrapped = (x + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Correction (a multiple of 2π) that removes the jump `delta` between two
/// consecutive samples, or zero when `|delta| < tolerance`.
fn jump_correction(delta: f32, tolerance: f32) -> f32 {
    if delta.abs() < tolerance {
        return 0.0;
    }
    let mut reduced = (delta + PI).rem_euclid(TAU) - PI;
    // a jump of exactly +π stays +π rather than flipping sign
    if reduced <= -PI && delta > 0.0 {
        reduced = PI;
    }
    reduced - delta
}

/// Standard phase unwrapping with π tolerance.
///
/// Walks forward through `phase`; whenever consecutive samples jump by π or
/// more, the nearest multiple of 2π is removed and the correction is carried
/// into every following sample.
pub fn unwrap_phase(phase: &[f32]) -> Vec<f32> {
    unwrap_phase_tol(phase, PI)
}

/// Phase unwrapping with configurable tolerance.
///
/// Same as [`unwrap_phase`] but only jumps whose magnitude reaches
/// `tolerance` are corrected. The size of a correction is always the
/// multiple of 2π that brings the jump back into [-π, π].
///
/// # Arguments
/// * `phase` - Phase values in radians
/// * `tolerance` - Jump detection threshold in radians (standard: π)
pub fn unwrap_phase_tol(phase: &[f32], tolerance: f32) -> Vec<f32> {
    let mut unwrapped = phase.to_vec();
    unwrap_lane(ArrayViewMut1::from(unwrapped.as_mut_slice()), tolerance);
    unwrapped
}

/// Unwrap a single 1-D lane in place.
pub fn unwrap_lane(mut lane: ArrayViewMut1<'_, f32>, tolerance: f32) {
    let Some(&first) = lane.get(0) else {
        return;
    };

    let mut previous = first;
    let mut correction = 0.0f32;

    for value in lane.iter_mut().skip(1) {
        let raw = *value;
        correction += jump_correction(raw - previous, tolerance);
        previous = raw;
        *value = raw + correction;
    }
}

/// Unwrap every 1-D lane of `array` along `axis`, in place.
///
/// For a (batch, frequency, pair, time) tensor and `Axis(1)` this visits every
/// (batch, pair, time) column and unwraps it across frequency.
pub fn unwrap_axis<S, D>(array: &mut ArrayBase<S, D>, axis: Axis, tolerance: f32)
where
    S: DataMut<Elem = f32>,
    D: Dimension,
{
    for lane in array.lanes_mut(axis) {
        unwrap_lane(lane, tolerance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// Wrapped linear phase ramp.
    fn linear_phase_ramp(n: usize, slope: f32) -> Vec<f32> {
        (0..n).map(|i| wrap_to_pi(i as f32 * slope)).collect()
    }

    #[test]
    fn test_wrap_range() {
        for i in -200..=200 {
            let x = i as f32 * 0.173;
            let w = wrap_to_pi(x);
            assert!(w > -PI && w <= PI, "wrap({x}) = {w} outside (-π, π]");
        }
    }

    #[test]
    fn test_wrap_negative_uses_floor_mod() {
        let w = wrap_to_pi(-0.75 * TAU);
        assert!((w - 0.5 * PI).abs() < 1e-5, "got {w}");
    }

    #[test]
    fn test_unwrap_recovers_ramp() {
        let slope = 0.4;
        let wrapped = linear_phase_ramp(64, slope);
        let unwrapped = unwrap_phase(&wrapped);
        for (i, v) in unwrapped.iter().enumerate() {
            let ideal = i as f32 * slope;
            assert!((v - ideal).abs() < 1e-3, "bin {i}: {v} vs {ideal}");
        }
    }

    #[test]
    fn test_unwrap_removes_multiple_periods() {
        // a 4π step is removed in one go
        let phase = vec![0.0f32, 0.1, 0.2 + 2.0 * TAU, 0.3 + 2.0 * TAU];
        let unwrapped = unwrap_phase(&phase);
        assert!((unwrapped[2] - 0.2).abs() < 1e-4);
        assert!((unwrapped[3] - 0.3).abs() < 1e-4);
    }

    #[test]
    fn test_custom_tolerance() {
        // a 2π-shifted sample under a 2.5π tolerance is left alone
        let phase = vec![0.0f32, TAU];
        assert_eq!(unwrap_phase_tol(&phase, 2.5 * PI), phase);
        assert!(unwrap_phase_tol(&phase, PI)[1].abs() < 1e-5);
    }

    #[test]
    fn test_unwrap_empty_and_single() {
        assert!(unwrap_phase(&[]).is_empty());
        assert_eq!(unwrap_phase(&[1.0]), vec![1.0]);
    }

    #[test]
    fn test_unwrap_axis_only_touches_requested_axis() {
        // shape (columns=2, bins=5, frames=1); unwrap along bins
        let ramp = linear_phase_ramp(5, 2.0);
        let mut arr = Array3::<f32>::zeros((2, 5, 1));
        for (k, &v) in ramp.iter().enumerate() {
            arr[[0, k, 0]] = v;
            arr[[1, k, 0]] = -v;
        }
        unwrap_axis(&mut arr, Axis(1), PI);
        for k in 0..5 {
            let ideal = k as f32 * 2.0;
            assert!((arr[[0, k, 0]] - ideal).abs() < 1e-4);
            assert!((arr[[1, k, 0]] + ideal).abs() < 1e-4);
        }
    }
}
