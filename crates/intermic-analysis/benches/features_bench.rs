//! Criterion benchmarks for intermic-analysis
//!
//! Run with: cargo bench -p intermic-analysis

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use intermic_analysis::{
    TrajectoryEstimator, frequency_gradient, magnitude_difference, phase_difference, wrap_to_pi,
};
use ndarray::Array4;
use std::hint::black_box;

/// Pseudo-random tensor in [0, 1)
fn generate_tensor(bins: usize, channels: usize, frames: usize) -> Array4<f32> {
    let mut state = 0x12345678u32;
    Array4::from_shape_simple_fn((1, bins, channels, frames), || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state as f32 / u32::MAX as f32
    })
}

fn bench_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("Features");

    for &bins in &[129usize, 257, 513] {
        let magnitude = generate_tensor(bins, 4, 200);
        let phase = magnitude.mapv(|v| wrap_to_pi(v * 20.0));

        group.bench_with_input(BenchmarkId::new("magnitude_difference", bins), &bins, |b, _| {
            b.iter(|| magnitude_difference(black_box(&magnitude)))
        });
        group.bench_with_input(BenchmarkId::new("phase_difference", bins), &bins, |b, _| {
            b.iter(|| phase_difference(black_box(&phase)))
        });
    }

    group.finish();
}

fn bench_estimator(c: &mut Criterion) {
    let mut group = c.benchmark_group("Estimator");

    for &bins in &[129usize, 513] {
        let phase = generate_tensor(bins, 2, 400).mapv(|v| wrap_to_pi(v * 20.0));
        let slope = phase_difference(&phase)
            .and_then(|ppd| frequency_gradient(&ppd))
            .expect("benchmark tensor is well formed");
        let estimator = TrajectoryEstimator::new();

        group.bench_with_input(BenchmarkId::new("trimmed_mean", bins), &bins, |b, _| {
            b.iter(|| estimator.estimate(black_box(&slope), 0))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_features, bench_estimator);
criterion_main!(benches);
