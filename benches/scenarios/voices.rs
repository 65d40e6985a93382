//! Benchmarks for complete layer chains.
//!
//! Beds loop forever; one-shots are benchmarked from a fresh node each
//! iteration so they never run out.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use hush_ambient::dsp::noise::{NoiseGenerator, NoiseKind};
use hush_ambient::graph::{gain::GainStage, GraphNode, RenderCtx};
use hush_ambient::voices;
use rand::{rngs::SmallRng, SeedableRng};

use crate::BLOCK_SIZES;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let ctx = RenderCtx::new(48_000.0);
    let generator = NoiseGenerator::new(48_000.0);
    let mut rng = SmallRng::seed_from_u64(3);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === RAIN BED ===
        // brown noise → lowpass 400 Hz, the simplest bed
        let mut rain = voices::rain_body(generator.create(NoiseKind::Brown, 2.0, &mut rng), false);
        group.bench_with_input(BenchmarkId::new("rain_body", size), &size, |b, _| {
            b.iter(|| rain.render_block(black_box(&mut buffer), black_box(&ctx)))
        });

        // === MURMUR ===
        // pink noise → bandpass
        let mut murmur = voices::murmur(generator.create(NoiseKind::Pink, 2.0, &mut rng));
        group.bench_with_input(BenchmarkId::new("murmur", size), &size, |b, _| {
            b.iter(|| murmur.render_block(black_box(&mut buffer), black_box(&ctx)))
        });

        // === SURF WITH SWELL ===
        // bed plus the LFO-modulated gain stage
        let mut surf = voices::surf(generator.create(NoiseKind::Brown, 2.0, &mut rng));
        let mut swell = voices::swell(0.6, 0.0);
        group.bench_with_input(BenchmarkId::new("waves", size), &size, |b, _| {
            b.iter(|| {
                surf.render_block(black_box(&mut buffer), black_box(&ctx));
                swell.apply(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // === THUNDER ===
        // swept sine → lowpass → envelope
        group.bench_with_input(BenchmarkId::new("thunder", size), &size, |b, _| {
            b.iter(|| {
                let mut thunder = voices::thunder(0.4);
                thunder.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // === BIRD ===
        group.bench_with_input(BenchmarkId::new("bird", size), &size, |b, _| {
            b.iter(|| {
                let mut bird = voices::bird(0.4, 2_000.0);
                bird.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // Unity gain stage, the cost every one-shot pays in the mixer
        let mut unity = GainStage::unity();
        group.bench_with_input(BenchmarkId::new("unity_gain", size), &size, |b, _| {
            b.iter(|| unity.apply(black_box(&mut buffer), black_box(&ctx)))
        });
    }

    group.finish();
}
