//! Ocean waves voice.
//!
//! # How It Works
//!
//! 1. Brown noise through a 300 Hz lowpass: distant surf
//! 2. A 0.1 Hz sine LFO swings the bed's gain, one swell every ten seconds
//!
//! The bed sits at 0.3× the layer volume and the LFO adds ±0.4×, so at the
//! bottom of a swell the surf almost disappears before the next wave rolls in.

use crate::{
    catalog::LayerDescriptor,
    dsp::noise::{NoiseBuffer, NoiseKind},
    engine::layers::{LayerBuilder, LayerContext, LayerHandles},
    graph::{
        extensions::NodeExt, filter::FilterNode, gain::GainStage, lfo::LfoNode, noise::NoiseNode,
        GraphNode,
    },
};

const CUTOFF_HZ: f32 = 300.0;
const BASE_LEVEL: f32 = 0.3;
const SWELL_DEPTH: f32 = 0.4;
const SWELL_HZ: f32 = 0.1;

pub fn surf(noise: NoiseBuffer) -> impl GraphNode {
    NoiseNode::looping(noise).through(FilterNode::lowpass(CUTOFF_HZ))
}

/// Gain stage for a surf bed at `volume`: fades in, then swells.
pub fn swell(volume: f32, fade_in: f32) -> GainStage {
    GainStage::fading_in(volume * BASE_LEVEL, fade_in)
        .with_lfo(LfoNode::sine(SWELL_HZ), volume * SWELL_DEPTH)
}

/// `waves` layer.
pub struct Waves;

impl LayerBuilder for Waves {
    fn build(&self, ctx: &LayerContext<'_>, layer: &LayerDescriptor) -> LayerHandles {
        let bed = surf(ctx.loop_noise(NoiseKind::Brown));
        let gain = swell(layer.volume, ctx.config().fade_in);
        LayerHandles::new().source(ctx.connect("waves", bed, gain))
    }
}
