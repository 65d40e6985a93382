//! Benchmarks for noise buffer generation.
//!
//! Buffers are built on the control thread, once per bed and once per
//! noise one-shot, so the interesting sizes are the two-second bed loop and
//! a short burst.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use hush_ambient::dsp::noise::{NoiseGenerator, NoiseKind};
use rand::{rngs::SmallRng, SeedableRng};

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");
    let generator = NoiseGenerator::new(48_000.0);
    let mut rng = SmallRng::seed_from_u64(1);

    for (kind, name) in [
        (NoiseKind::White, "white"),
        (NoiseKind::Pink, "pink"),
        (NoiseKind::Brown, "brown"),
    ] {
        group.bench_with_input(BenchmarkId::new(name, "2s_loop"), &kind, |b, &kind| {
            b.iter(|| generator.create(black_box(kind), black_box(2.0), &mut rng))
        });
    }

    group.bench_function(BenchmarkId::new("white", "10ms_burst"), |b| {
        b.iter(|| generator.create(NoiseKind::White, black_box(0.01), &mut rng))
    });

    group.finish();
}
