//! Espresso machine voice.
//!
//! Steam hiss: a white noise burst through a 2 kHz highpass, with a quick
//! 0.1 s onset and a linear fade to nothing by 1.5 s.
//!
//! The machine is not a metronome, so the trigger period is stretched once,
//! by up to three seconds, when the layer starts.

use std::time::Duration;

use crate::{
    catalog::LayerDescriptor,
    dsp::noise::{NoiseBuffer, NoiseKind},
    engine::{
        layers::{LayerBuilder, LayerContext, LayerHandles},
        scheduler::Cadence,
    },
    graph::{
        envelope::EnvNode, extensions::NodeExt, filter::FilterNode, noise::NoiseNode, GraphNode,
    },
};

pub const DEFAULT_INTERVAL_MS: u64 = 8_000;

/// Length of one burst in seconds.
pub const LENGTH: f32 = 1.5;

pub fn espresso_hiss(noise: NoiseBuffer, volume: f32) -> impl GraphNode {
    NoiseNode::once(noise)
        .stop_after(LENGTH)
        .through(FilterNode::highpass(2_000.0))
        .amplify(EnvNode::new(|env| {
            env.set_value_at(0.0, 0.0)
                .linear_ramp_to(volume, 0.1)
                .linear_ramp_to(0.0, LENGTH as f64);
        }))
}

pub fn cadence(interval_ms: u64) -> Cadence {
    Cadence::every_ms(interval_ms).with_spread(Duration::from_millis(3_000))
}

/// `espresso` layer.
pub struct Espresso;

impl LayerBuilder for Espresso {
    fn build(&self, ctx: &LayerContext<'_>, layer: &LayerDescriptor) -> LayerHandles {
        let volume = layer.volume;
        let interval = layer.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS);
        LayerHandles::new().schedule(ctx.schedule("espresso", cadence(interval), move |shot| {
            espresso_hiss(shot.noise(NoiseKind::White, LENGTH), volume).boxed()
        }))
    }
}
