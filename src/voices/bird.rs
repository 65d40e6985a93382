//! Bird chirp voice.
//!
//! # How It Works
//!
//! 1. Sine starting at a random base pitch between 1.5 and 2.5 kHz
//! 2. Up to 1.3× base at 0.1 s, then down to 0.9× base at 0.2 s
//! 3. Fast 20 ms attack, gone by 0.25 s
//!
//! The random base is what makes a flock: no two chirps in a row match.
//! Seven ticks in ten produce a chirp.

use crate::{
    catalog::LayerDescriptor,
    engine::{
        layers::{LayerBuilder, LayerContext, LayerHandles},
        scheduler::Cadence,
    },
    graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode, GraphNode},
};

pub const DEFAULT_INTERVAL_MS: u64 = 4_000;

/// Range of chirp base pitches in Hz.
pub const BASE_RANGE: (f32, f32) = (1_500.0, 2_500.0);

const LEVEL: f32 = 0.2;

pub fn bird(volume: f32, base: f32) -> impl GraphNode {
    OscNode::sine(base)
        .frequency(|f| {
            f.linear_ramp_to(base * 1.3, 0.1)
                .linear_ramp_to(base * 0.9, 0.2);
        })
        .stop_after(0.3)
        .amplify(EnvNode::new(|env| {
            env.set_value_at(0.0, 0.0)
                .linear_ramp_to(volume * LEVEL, 0.02)
                .linear_ramp_to(0.0, 0.25);
        }))
}

pub fn cadence(interval_ms: u64) -> Cadence {
    Cadence::every_ms(interval_ms).with_probability(0.7)
}

/// `birds` layer.
pub struct Birds;

impl LayerBuilder for Birds {
    fn build(&self, ctx: &LayerContext<'_>, layer: &LayerDescriptor) -> LayerHandles {
        let volume = layer.volume;
        let interval = layer.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS);
        LayerHandles::new().schedule(ctx.schedule("birds", cadence(interval), move |shot| {
            let base = shot.random.range(BASE_RANGE.0, BASE_RANGE.1);
            bird(volume, base).boxed()
        }))
    }
}
