//! Benchmarks for the mixer's per-block buffer arithmetic.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use hush_ambient::dsp::amplify;

use crate::BLOCK_SIZES;

pub fn bench_amplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/amplify");

    for &size in BLOCK_SIZES {
        let layer: Vec<f32> = (0..size).map(|i| ((i * 7919) % 200) as f32 / 100.0 - 1.0).collect();
        let gain: Vec<f32> = (0..size).map(|i| i as f32 / size as f32).collect();
        let mut bus = vec![0.0; size];

        group.bench_with_input(BenchmarkId::new("layer_into_bus", size), &size, |b, _| {
            let mut scratch = layer.clone();
            b.iter(|| {
                scratch.copy_from_slice(&layer);
                amplify::multiply_in_place(black_box(&mut scratch), black_box(&gain));
                amplify::sum_in_place(black_box(&mut bus), black_box(&scratch));
            })
        });

        // A bus driven well past full scale, as eight loud layers would be
        let hot: Vec<f32> = layer.iter().map(|s| s * 8.0).collect();
        group.bench_with_input(BenchmarkId::new("hard_clip", size), &size, |b, _| {
            let mut bus = hot.clone();
            b.iter(|| {
                bus.copy_from_slice(&hot);
                amplify::hard_clip(black_box(&mut bus), 1.0)
            })
        });

        group.bench_with_input(BenchmarkId::new("rms", size), &size, |b, _| {
            b.iter(|| amplify::rms(black_box(&layer)))
        });
    }

    group.finish();
}
