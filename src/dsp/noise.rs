//! Noise buffer synthesis.

/*
Noise Colours
=============

Every ambient bed in this crate starts life as a short buffer of noise that
loops forever. The "colour" of the noise decides where its energy sits in the
spectrum, and therefore what it sounds like before any filtering.

Vocabulary
----------

  white     Every sample independent and uniform in [-1, 1]. Flat spectrum:
            equal energy per Hz. Sounds like hiss or steam.

  brown     Integrated white noise (a random walk). Energy falls off steeply
            with frequency. Sounds like a rumble, surf, or a distant waterfall.

  pink      Sits between the two. A true pink generator (-3 dB/octave) needs a
            filter bank; we use a scaled-down white signal instead, which keeps
            it softer than white and leaves the colouring to the layer filters.

  loop      Buffers are ~2 seconds long and played back with wrap-around, so a
            bed can run indefinitely without regenerating noise.


Brown Noise as a Leaky Integrator
---------------------------------

A pure integrator drifts off to infinity. Dividing by a factor slightly above
one each step "leaks" the accumulated value back towards zero:

    out[n] = (out[n-1] + 0.02 * white[n]) / 1.02

The leak also costs amplitude, so the result is scaled by 3.5 to bring it back
into a comparable range with the other colours.
*/

use crate::random::RandomSource;

/// Brown noise integration step.
const BROWN_STEP: f32 = 0.02;
/// Brown noise leak divisor.
const BROWN_LEAK: f32 = 1.02;
/// Compensates for the integrator's amplitude loss.
const BROWN_GAIN: f32 = 3.5;
/// Simplified pink noise is attenuated white noise.
const PINK_GAIN: f32 = 0.5;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoiseKind {
    White,
    Pink,
    Brown,
}

/// A mono buffer of noise at a fixed sample rate.
#[derive(Debug, Clone)]
pub struct NoiseBuffer {
    samples: Vec<f32>,
    sample_rate: f32,
}

impl NoiseBuffer {
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Always mono.
    pub fn channels(&self) -> usize {
        1
    }

    pub fn duration(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

/// Produces loopable noise buffers at the output device's sample rate.
#[derive(Debug, Clone, Copy)]
pub struct NoiseGenerator {
    sample_rate: f32,
}

impl NoiseGenerator {
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of samples a buffer of `duration` seconds holds.
    pub fn frames_for(&self, duration: f32) -> usize {
        (duration.max(0.0) * self.sample_rate).round() as usize
    }

    pub fn create(
        &self,
        kind: NoiseKind,
        duration: f32,
        random: &mut dyn RandomSource,
    ) -> NoiseBuffer {
        let mut samples = vec![0.0; self.frames_for(duration)];
        fill(kind, &mut samples, random);

        NoiseBuffer {
            samples,
            sample_rate: self.sample_rate,
        }
    }
}

/// Fill `buffer` with noise of the given colour.
pub fn fill(kind: NoiseKind, buffer: &mut [f32], random: &mut dyn RandomSource) {
    match kind {
        NoiseKind::White => {
            for sample in buffer.iter_mut() {
                *sample = random.bipolar();
            }
        }
        NoiseKind::Pink => {
            for sample in buffer.iter_mut() {
                *sample = random.bipolar() * PINK_GAIN;
            }
        }
        NoiseKind::Brown => {
            let mut last = 0.0;
            for sample in buffer.iter_mut() {
                last = (last + BROWN_STEP * random.bipolar()) / BROWN_LEAK;
                *sample = last * BROWN_GAIN;
            }
        }
    }
}
