use crate::{
    dsp::automation::Automation,
    graph::{
        lfo::LfoNode,
        node::{GraphNode, RenderCtx},
    },
    MAX_BLOCK_SIZE,
};

/*
Gain Stage
==========

Every layer the mixer holds gets its own gain stage between the layer's node
and the master bus. It is what fades a bed in, what fades it out on teardown,
and, for the waves bed, what the swell LFO pushes around.

  node ──→ × fader × (base + depth · lfo) ──→ master

  fader   0..1 automation. Fade-ins ramp it 0 → 1, teardown ramps it → 0.
  base    The layer's level (0.8 × volume for the rain bed, and so on).
  lfo     Optional. Its bipolar output scaled by `depth` is added to `base`,
          the same way an LFO patched into a gain parameter would sum with
          the parameter's own value.

One-shots carry their own envelope, so they use a unity stage and only ever
touch the fader when their atmosphere is torn down mid-flight.
*/

pub struct GainStage {
    fader: Automation,
    base: f32,
    modulation: Option<Modulation>,
}

struct Modulation {
    lfo: LfoNode,
    depth: f32,
    buffer: Vec<f32>,
}

impl GainStage {
    /// Constant gain of `base`.
    pub fn new(base: f32) -> Self {
        Self {
            fader: Automation::new(1.0),
            base,
            modulation: None,
        }
    }

    pub fn unity() -> Self {
        Self::new(1.0)
    }

    /// Start silent and ramp up to `base` over `seconds`.
    pub fn fading_in(base: f32, seconds: f32) -> Self {
        let mut stage = Self::new(base);
        stage.fader = Automation::new(0.0);
        stage.fader.ramp_from_now(1.0, seconds as f64);
        stage
    }

    /// Add `depth × lfo` to the base gain.
    pub fn with_lfo(mut self, lfo: LfoNode, depth: f32) -> Self {
        self.modulation = Some(Modulation {
            lfo,
            depth,
            buffer: vec![0.0; MAX_BLOCK_SIZE],
        });
        self
    }

    /// Ramp the fader from wherever it is now to `target`.
    pub fn fade_to(&mut self, target: f32, seconds: f32) {
        self.fader.ramp_from_now(target, seconds as f64);
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    pub fn is_modulated(&self) -> bool {
        self.modulation.is_some()
    }

    /// Current fader position.
    pub fn fader(&self) -> f32 {
        self.fader.value()
    }

    /// True once the fader has come to rest at zero.
    pub fn is_silent(&self) -> bool {
        self.fader.is_settled() && self.fader.value() == 0.0
    }

    /// Scale `signal` in place.
    pub fn apply(&mut self, signal: &mut [f32], ctx: &RenderCtx) {
        let Some(modulation) = self.modulation.as_mut() else {
            if self.base == 1.0 {
                self.fader.apply(signal, ctx.sample_rate);
            } else {
                let dt = ctx.dt();
                for sample in signal.iter_mut() {
                    *sample *= self.fader.next(dt) * self.base;
                }
            }
            return;
        };

        let dt = ctx.dt();
        let lfo = &mut modulation.buffer[..signal.len()];
        modulation.lfo.render_block(lfo, ctx);

        for (sample, swing) in signal.iter_mut().zip(lfo.iter()) {
            let gain = self.base + modulation.depth * swing;
            *sample *= self.fader.next(dt) * gain;
        }
    }
}
