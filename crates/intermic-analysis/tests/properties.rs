//! Property-based tests for intermic-analysis.
//!
//! Covers the wrap range, unwrap continuity, finiteness of the log magnitude
//! ratio, trimmed-mean bounds and grid index bounds using proptest for
//! randomized input generation.

use std::f32::consts::PI;

use intermic_analysis::features::{magnitude_difference, phase_difference};
use intermic_analysis::{TrajectoryEstimator, trimmed_mean, unwrap_phase, wrap_to_pi};
use ndarray::Array4;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Every wrapped value lies in (-π, π] and differs from the input by a
    /// multiple of 2π.
    #[test]
    fn wrap_stays_in_half_open_interval(x in -1000.0f32..1000.0f32) {
        let w = wrap_to_pi(x);
        prop_assert!(w > -PI && w <= PI, "wrap({}) = {}", x, w);
        let turns = (x - w) / (2.0 * PI);
        prop_assert!((turns - turns.round()).abs() < 1e-3, "x={} w={} turns={}", x, w, turns);
    }

    /// Unwrapping a wrapped ramp with |slope| < π leaves no adjacent jump of
    /// π or more.
    #[test]
    fn unwrap_leaves_small_steps(
        slope in -3.0f32..3.0f32,
        offset in -PI..PI,
        n in 2usize..200,
    ) {
        let wrapped: Vec<f32> = (0..n).map(|i| wrap_to_pi(offset + slope * i as f32)).collect();
        let unwrapped = unwrap_phase(&wrapped);
        for pair in unwrapped.windows(2) {
            prop_assert!((pair[1] - pair[0]).abs() < PI, "step {} -> {}", pair[0], pair[1]);
        }
    }

    /// Log magnitude ratio is finite for any non-negative finite input.
    #[test]
    fn magnitude_difference_is_finite(
        values in prop::collection::vec(0.0f32..1.0e30, 2 * 3 * 4),
    ) {
        let mag = Array4::from_shape_vec((1, 3, 2, 4), values).unwrap();
        let out = magnitude_difference(&mag).unwrap();
        prop_assert!(out.iter().all(|v| v.is_finite()));
    }

    /// Phase difference of identical channels is zero everywhere.
    #[test]
    fn identical_phases_cancel(
        values in prop::collection::vec(-PI..PI, 5 * 3),
    ) {
        let mut phase = Array4::<f32>::zeros((1, 5, 2, 3));
        for f in 0..5 {
            for t in 0..3 {
                phase[[0, f, 0, t]] = values[f * 3 + t];
                phase[[0, f, 1, t]] = values[f * 3 + t];
            }
        }
        let out = phase_difference(&phase).unwrap();
        prop_assert!(out.iter().all(|v| v.abs() < 1e-6));
    }

    /// The trimmed mean never leaves the [min, max] range of its input.
    #[test]
    fn trimmed_mean_within_range(
        values in prop::collection::vec(-1.0e3f32..1.0e3, 1..300),
        proportion in 0.0f32..0.49,
    ) {
        let tm = trimmed_mean(&values, proportion).unwrap();
        let lo = values.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        prop_assert!(tm >= lo - 1e-3 && tm <= hi + 1e-3, "{} outside [{}, {}]", tm, lo, hi);
    }

    /// Grid frames are always valid indices and never decrease.
    #[test]
    fn grid_indices_in_bounds(frames in 1usize..5000, divisions in 2usize..64) {
        let grid = TrajectoryEstimator::new()
            .with_grid_divisions(divisions)
            .grid(frames)
            .unwrap();
        prop_assert_eq!(grid.len(), divisions - 1);
        prop_assert!(grid.iter().all(|p| p.frame < frames));
        prop_assert!(grid.windows(2).all(|w| w[0].frame <= w[1].frame));
    }
}
