//! Benchmarks for the state-variable filter at the settings the layers use.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use hush_ambient::{
    dsp::{
        filter::SVFilter,
        noise::{NoiseGenerator, NoiseKind},
    },
    graph::node::RenderCtx,
};
use rand::{rngs::SmallRng, SeedableRng};

use crate::BLOCK_SIZES;

fn voicings() -> Vec<(&'static str, SVFilter)> {
    let mut pop = SVFilter::bandpass(3_000.0);
    pop.set_q(5.0);
    let mut murmur = SVFilter::bandpass(600.0);
    murmur.set_q(0.7);

    vec![
        ("thunder_lp100", SVFilter::lowpass(100.0)),
        ("rain_lp400", SVFilter::lowpass(400.0)),
        ("espresso_hp2k", SVFilter::highpass(2_000.0)),
        ("murmur_bp600", murmur),
        ("crackle_bp3k", pop),
    ]
}

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = RenderCtx::new(48_000.0);
    let mut rng = SmallRng::seed_from_u64(11);

    for &size in BLOCK_SIZES {
        let input = NoiseGenerator::new(48_000.0)
            .create(NoiseKind::White, size as f32 / 48_000.0, &mut rng)
            .into_samples();
        let mut buffer = input.clone();

        for (name, mut filter) in voicings() {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }
    }

    group.finish();
}
