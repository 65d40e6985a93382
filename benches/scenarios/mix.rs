//! Benchmarks for whole atmospheres through the mixer.
//!
//! The engine plays each atmosphere into an offline output; the benchmark
//! then measures one mixer render of every layer plus the master gain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use hush_ambient::{io::offline::OfflineBackend, random::ScriptedRandom, AmbientEngine};

use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mix");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("failed to build runtime");

    for id in ["rainy-study", "cafe", "ocean", "night-rain"] {
        let backend = OfflineBackend::new(48_000.0);
        let tap = backend.tap();
        let mut engine = AmbientEngine::new(backend)
            .with_random(ScriptedRandom::new(vec![0.9, 0.1, 0.6, 0.3, 0.75]));
        runtime.block_on(engine.play(id));

        for &size in BLOCK_SIZES {
            let mut buffer = vec![0.0f32; size];
            group.bench_with_input(BenchmarkId::new(id, size), &size, |b, _| {
                b.iter(|| tap.render_into(black_box(&mut buffer)))
            });
        }

        runtime.block_on(engine.stop(false));
    }

    group.finish();
}
