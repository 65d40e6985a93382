//! Cafe murmur voice.
//!
//! Pink noise band-limited to the range where speech energy sits. With a low
//! Q the band is wide enough that no single voice stands out; what is left
//! reads as a room full of people talking.

use crate::{
    catalog::LayerDescriptor,
    dsp::noise::{NoiseBuffer, NoiseKind},
    engine::layers::{LayerBuilder, LayerContext, LayerHandles},
    graph::{extensions::NodeExt, filter::FilterNode, noise::NoiseNode, GraphNode},
};

/// Centre of the conversational band.
const CENTER_HZ: f32 = 600.0;
/// Wide band.
const Q: f32 = 0.7;

pub fn murmur(noise: NoiseBuffer) -> impl GraphNode {
    NoiseNode::looping(noise).through(FilterNode::bandpass(CENTER_HZ).with_q(Q))
}

/// `cafe-murmur` layer.
pub struct CafeMurmur;

impl LayerBuilder for CafeMurmur {
    fn build(&self, ctx: &LayerContext<'_>, layer: &LayerDescriptor) -> LayerHandles {
        let bed = murmur(ctx.loop_noise(NoiseKind::Pink));
        LayerHandles::new().source(ctx.bed("cafe-murmur", bed, layer.volume))
    }
}
