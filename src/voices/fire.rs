//! Fireplace voice: a brown-noise bed under a 500 Hz lowpass for the low
//! rumble of the fire, with crackle pops layered on top (see `crackle`).

use crate::{
    catalog::LayerDescriptor,
    dsp::noise::{NoiseBuffer, NoiseKind},
    engine::layers::{LayerBuilder, LayerContext, LayerHandles},
    graph::{extensions::NodeExt, filter::FilterNode, noise::NoiseNode, GraphNode},
    voices::crackle,
};

const BED_LEVEL: f32 = 0.4;

pub fn fire_bed(noise: NoiseBuffer) -> impl GraphNode {
    NoiseNode::looping(noise).through(FilterNode::lowpass(500.0))
}

/// `fire-crackle` layer.
pub struct FireCrackle;

impl LayerBuilder for FireCrackle {
    fn build(&self, ctx: &LayerContext<'_>, layer: &LayerDescriptor) -> LayerHandles {
        let volume = layer.volume;
        let bed = fire_bed(ctx.loop_noise(NoiseKind::Brown));

        LayerHandles::new()
            .source(ctx.bed("fire", bed, volume * BED_LEVEL))
            .schedule(ctx.schedule("crackle", crackle::cadence(), move |shot| {
                crackle::random_pop(shot, volume)
            }))
    }
}
