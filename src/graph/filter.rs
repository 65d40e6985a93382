use crate::{
    dsp::filter::{FilterType, SVFilter},
    graph::node::{GraphNode, RenderCtx},
};

/*
Filter Node
===========

Raw noise is a hiss. Every ambient texture in this crate is "carved" out of
noise by a single filter, and the cutoff is most of the character:

  Cutoff (Hz)   Heard as
  -----------   -----------------------------------------------
     100        thunder: only the sub rumble survives
     200        wind through trees, a far-off roar
     300-500    waves, rain on a roof, fire bed
     600 (BP)   murmur of voices in a cafe
    800         heavy rain, closer and harsher
   2000-3000    patter of drops on glass
   2000 (HP)    steam hiss of an espresso machine
   2-4k (BP)    crackle pops in a fireplace

Example usage:
  let rain = NoiseNode::looping(brown).through(FilterNode::lowpass(400.0));
  let pop  = NoiseNode::once(white).through(FilterNode::bandpass(3000.0).with_q(5.0));
*/

pub struct FilterNode {
    filter: SVFilter,
}

impl FilterNode {
    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self {
            filter: SVFilter::lowpass(cutoff_hz),
        }
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self {
            filter: SVFilter::highpass(cutoff_hz),
        }
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self {
            filter: SVFilter::bandpass(cutoff_hz),
        }
    }

    pub fn with_q(mut self, q: f32) -> Self {
        self.filter.set_q(q);
        self
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter.filter_type()
    }

    pub fn cutoff(&self) -> f32 {
        self.filter.cutoff_hz
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.filter.render(out, ctx);
    }
}
