use crate::{
    dsp::noise::NoiseBuffer,
    graph::node::{GraphNode, RenderCtx},
};

/*
Noise Player
============

Plays a pre-rendered noise buffer. Beds loop the buffer forever; bursts
(espresso hiss, crackle pops) play it once, or stop early at a fixed time.

  // Rain bed: loop two seconds of brown noise through a lowpass
  let bed = NoiseNode::looping(brown).through(FilterNode::lowpass(400.0));

  // Espresso hiss: one burst, cut after 1.5 s
  let hiss = NoiseNode::once(white).stop_after(1.5);

Wrap-around is seamless for noise: the loop point is just one more random
sample, so no crossfade is needed.
*/

pub struct NoiseNode {
    samples: Vec<f32>,
    position: usize,
    looping: bool,
    stop_after: Option<f64>,
    elapsed: u64,
    finished: bool,
}

impl NoiseNode {
    fn new(buffer: NoiseBuffer, looping: bool) -> Self {
        let samples = buffer.into_samples();
        let finished = samples.is_empty();
        Self {
            samples,
            position: 0,
            looping,
            stop_after: None,
            elapsed: 0,
            finished,
        }
    }

    pub fn looping(buffer: NoiseBuffer) -> Self {
        Self::new(buffer, true)
    }

    pub fn once(buffer: NoiseBuffer) -> Self {
        Self::new(buffer, false)
    }

    /// Stop producing sound after `seconds` of playback.
    pub fn stop_after(mut self, seconds: f32) -> Self {
        self.stop_after = Some(seconds.max(0.0) as f64);
        self
    }
}

impl GraphNode for NoiseNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let stop_frame = self
            .stop_after
            .map(|seconds| (seconds * ctx.sample_rate as f64).round() as u64);

        for sample in out.iter_mut() {
            if self.finished || stop_frame.is_some_and(|stop| self.elapsed >= stop) {
                self.finished = true;
                *sample = 0.0;
                continue;
            }

            *sample = self.samples[self.position];
            self.position += 1;
            self.elapsed += 1;

            if self.position == self.samples.len() {
                if self.looping {
                    self.position = 0;
                } else {
                    self.finished = true;
                }
            }
        }
    }

    fn is_active(&self) -> bool {
        !self.finished
    }
}
