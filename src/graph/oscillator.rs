use crate::{
    dsp::{automation::Automation, oscillator::Phasor},
    graph::node::{GraphNode, RenderCtx},
};

/*
Sine Oscillator
===============

The pitched one-shots in this crate are all sine tones whose frequency moves
while they sound:

  Thunder:  50 Hz → 30 Hz exponential over 2 s, under a 100 Hz lowpass.
            Too low to hear as a pitch; felt as a rolling rumble.

  Seagull:  800 → 1200 → 600 Hz over 0.3 s. The up-then-down glide is
            what makes a plain sine read as a gull cry.

  Bird:     base → 1.3×base → 0.9×base over 0.2 s, base drawn from
            1500–2500 Hz so consecutive chirps differ.

The frequency is an `Automation` timeline, so sweeps are scheduled up front
and the node needs no further control once it is connected:

  OscNode::sine(800.0)
      .frequency(|f| {
          f.linear_ramp_to(1200.0, 0.1).linear_ramp_to(600.0, 0.3);
      })
      .stop_after(0.5)
*/

pub struct OscNode {
    phasor: Phasor,
    frequency: Automation,
    stop_after: Option<f64>,
    elapsed: u64,
    finished: bool,
}

impl OscNode {
    pub fn sine(frequency: f32) -> Self {
        let mut automation = Automation::new(frequency);
        automation.set_value_at(frequency, 0.0);

        Self {
            phasor: Phasor::new(),
            frequency: automation,
            stop_after: None,
            elapsed: 0,
            finished: false,
        }
    }

    /// Schedule frequency breakpoints.
    pub fn frequency(mut self, schedule: impl FnOnce(&mut Automation)) -> Self {
        schedule(&mut self.frequency);
        self
    }

    /// Go silent and inactive after `seconds`.
    pub fn stop_after(mut self, seconds: f32) -> Self {
        self.stop_after = Some(seconds.max(0.0) as f64);
        self
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let dt = ctx.dt();
        let stop_frame = self
            .stop_after
            .map(|seconds| (seconds * ctx.sample_rate as f64).round() as u64);

        for sample in out.iter_mut() {
            if self.finished || stop_frame.is_some_and(|stop| self.elapsed >= stop) {
                self.finished = true;
                *sample = 0.0;
                continue;
            }

            let frequency = self.frequency.next(dt).clamp(0.0, ctx.sample_rate * 0.5);
            *sample = self.phasor.next_sine(frequency, ctx.sample_rate);
            self.elapsed += 1;
        }
    }

    fn is_active(&self) -> bool {
        !self.finished
    }
}
