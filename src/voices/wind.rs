//! Wind voice: pink noise under a 200 Hz lowpass. Only the low roar of air
//! moving through trees survives the filter.

use crate::{
    catalog::LayerDescriptor,
    dsp::noise::{NoiseBuffer, NoiseKind},
    engine::layers::{LayerBuilder, LayerContext, LayerHandles},
    graph::{extensions::NodeExt, filter::FilterNode, noise::NoiseNode, GraphNode},
};

pub fn wind(noise: NoiseBuffer) -> impl GraphNode {
    NoiseNode::looping(noise).through(FilterNode::lowpass(200.0))
}

/// `wind` layer.
pub struct Wind;

impl LayerBuilder for Wind {
    fn build(&self, ctx: &LayerContext<'_>, layer: &LayerDescriptor) -> LayerHandles {
        let bed = wind(ctx.loop_noise(NoiseKind::Pink));
        LayerHandles::new().source(ctx.bed("wind", bed, layer.volume))
    }
}
