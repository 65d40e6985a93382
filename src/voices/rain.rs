//! Rain voice.
//!
//! Two looping noise beds stacked on top of each other:
//!
//! 1. Brown noise through a low lowpass: the body, a steady roar on the roof
//! 2. White noise through a higher lowpass, much quieter: the patter of
//!    individual drops on glass
//!
//! # Variations
//!
//! Heavy rain opens both filters up (800 Hz / 3 kHz instead of 400 Hz / 2 kHz)
//! so the storm sounds closer and harsher.

use crate::{
    catalog::LayerDescriptor,
    dsp::noise::{NoiseBuffer, NoiseKind},
    engine::layers::{LayerBuilder, LayerContext, LayerHandles},
    graph::{extensions::NodeExt, filter::FilterNode, noise::NoiseNode, GraphNode},
};

/// Body level relative to the layer volume.
const BODY_LEVEL: f32 = 0.8;
/// Patter level relative to the layer volume.
const PATTER_LEVEL: f32 = 0.2;

/// Looping brown-noise body.
pub fn rain_body(noise: NoiseBuffer, heavy: bool) -> impl GraphNode {
    let cutoff = if heavy { 800.0 } else { 400.0 };
    NoiseNode::looping(noise).through(FilterNode::lowpass(cutoff))
}

/// Looping white-noise patter.
pub fn rain_patter(noise: NoiseBuffer, heavy: bool) -> impl GraphNode {
    let cutoff = if heavy { 3_000.0 } else { 2_000.0 };
    NoiseNode::looping(noise).through(FilterNode::lowpass(cutoff))
}

/// `rain` and `heavy-rain` layers.
pub struct Rain {
    pub heavy: bool,
}

impl LayerBuilder for Rain {
    fn build(&self, ctx: &LayerContext<'_>, layer: &LayerDescriptor) -> LayerHandles {
        let (body_label, patter_label) = if self.heavy {
            ("heavy-rain", "heavy-rain-patter")
        } else {
            ("rain", "rain-patter")
        };

        let body = rain_body(ctx.loop_noise(NoiseKind::Brown), self.heavy);
        let patter = rain_patter(ctx.loop_noise(NoiseKind::White), self.heavy);

        LayerHandles::new()
            .source(ctx.bed(body_label, body, layer.volume * BODY_LEVEL))
            .source(ctx.bed(patter_label, patter, layer.volume * PATTER_LEVEL))
    }
}
