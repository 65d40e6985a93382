//! Benchmarks for parameter automation.
//!
//! Settled timelines take a fill fast path; ramping ones evaluate per sample.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use hush_ambient::dsp::automation::Automation;

use crate::BLOCK_SIZES;

pub fn bench_automation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/automation");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut settled = Automation::new(0.5);
        group.bench_with_input(BenchmarkId::new("settled", size), &size, |b, _| {
            b.iter(|| settled.render(black_box(&mut buffer), black_box(48_000.0)))
        });

        // Re-armed every iteration so it never settles
        group.bench_with_input(BenchmarkId::new("linear", size), &size, |b, _| {
            b.iter(|| {
                let mut ramp = Automation::new(0.0);
                ramp.ramp_from_now(1.0, 10.0);
                ramp.render(black_box(&mut buffer), black_box(48_000.0));
            })
        });

        group.bench_with_input(BenchmarkId::new("exponential", size), &size, |b, _| {
            b.iter(|| {
                let mut sweep = Automation::new(50.0);
                sweep
                    .set_value_at(50.0, 0.0)
                    .exponential_ramp_to(30.0, 10.0);
                sweep.render(black_box(&mut buffer), black_box(48_000.0));
            })
        });
    }

    group.finish();
}
