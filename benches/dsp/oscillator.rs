//! Benchmarks for sine generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use hush_ambient::dsp::oscillator::Phasor;
use hush_ambient::graph::{lfo::LfoNode, oscillator::OscNode, GraphNode, RenderCtx};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let ctx = RenderCtx::new(48_000.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Raw phasor - uses sin() transcendental function
        let mut phasor = Phasor::new();
        group.bench_with_input(BenchmarkId::new("phasor_sine", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = phasor.next_sine(black_box(440.0), 48_000.0);
                }
            })
        });

        // Fixed-frequency LFO
        let mut lfo = LfoNode::sine(0.1);
        group.bench_with_input(BenchmarkId::new("lfo", size), &size, |b, _| {
            b.iter(|| lfo.render_block(black_box(&mut buffer), black_box(&ctx)))
        });

        // Oscillator node with a frequency timeline that never settles
        let mut osc = OscNode::sine(1_000.0).frequency(|f| {
            f.linear_ramp_to(2_000.0, 1.0e6);
        });
        group.bench_with_input(BenchmarkId::new("swept_sine", size), &size, |b, _| {
            b.iter(|| osc.render_block(black_box(&mut buffer), black_box(&ctx)))
        });
    }

    group.finish();
}
