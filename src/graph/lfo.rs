use crate::{
    dsp::oscillator::Phasor,
    graph::node::{GraphNode, RenderCtx},
};

/*
LFO (Low Frequency Oscillator)
==============================

An LFO is an oscillator that runs at sub-audio frequencies to modulate
parameters over time. Unlike audio oscillators (20 Hz - 20 kHz), LFOs
typically operate between 0.01 Hz - 20 Hz.

The waves bed is the one place this crate uses one:

  // 0.1 Hz = one swell every ten seconds
  let swell = LfoNode::sine(0.1);

The LFO's bipolar output (-1.0 to +1.0) is scaled by a depth and added to the
bed's gain (see `graph::gain::GainStage`), so the surf rises and falls instead
of hissing at a constant level.

    0.01 - 0.1 Hz   Very slow sweeps, tides, breathing textures
    0.1 - 0.5 Hz    Waves, gusts of wind
    0.5 - 2 Hz      Tremolo
*/

pub struct LfoNode {
    phasor: Phasor,
    frequency: f32, // Fixed frequency in Hz
}

impl LfoNode {
    pub fn sine(frequency: f32) -> Self {
        Self {
            phasor: Phasor::new(),
            frequency,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }
}

impl GraphNode for LfoNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            *sample = self.phasor.next_sine(self.frequency, ctx.sample_rate);
        }
    }
}
