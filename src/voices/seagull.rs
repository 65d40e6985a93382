//! Seagull voice.
//!
//! A sine glides 800 → 1200 Hz in 0.1 s, then falls to 600 Hz by 0.3 s. The
//! envelope peaks at 0.05 s and is gone by 0.4 s. Half of the ticks stay
//! quiet.

use crate::{
    catalog::LayerDescriptor,
    engine::{
        layers::{LayerBuilder, LayerContext, LayerHandles},
        scheduler::Cadence,
    },
    graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode, GraphNode},
};

pub const DEFAULT_INTERVAL_MS: u64 = 12_000;

const LEVEL: f32 = 0.3;

pub fn seagull(volume: f32) -> impl GraphNode {
    OscNode::sine(800.0)
        .frequency(|f| {
            f.linear_ramp_to(1_200.0, 0.1).linear_ramp_to(600.0, 0.3);
        })
        .stop_after(0.5)
        .amplify(EnvNode::new(|env| {
            env.set_value_at(0.0, 0.0)
                .linear_ramp_to(volume * LEVEL, 0.05)
                .linear_ramp_to(0.0, 0.4);
        }))
}

pub fn cadence(interval_ms: u64) -> Cadence {
    Cadence::every_ms(interval_ms).with_probability(0.5)
}

/// `seagulls` layer.
pub struct Seagulls;

impl LayerBuilder for Seagulls {
    fn build(&self, ctx: &LayerContext<'_>, layer: &LayerDescriptor) -> LayerHandles {
        let volume = layer.volume;
        let interval = layer.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS);
        LayerHandles::new().schedule(ctx.schedule("seagulls", cadence(interval), move |_| {
            seagull(volume).boxed()
        }))
    }
}
