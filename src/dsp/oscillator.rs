//! Phase-accumulator sine oscillator.
//!
//! The phase is kept in cycles (`0.0..1.0`) rather than radians so it can be
//! wrapped with a cheap subtraction, and the frequency may change on every
//! sample without discontinuities. That is what the chirps (seagulls, birds)
//! and the thunder sweep rely on.

use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, Default)]
pub struct Phasor {
    phase: f32,
}

impl Phasor {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Output `sin(2π·phase)` and advance by one sample at `frequency`.
    #[inline]
    pub fn next_sine(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let out = (TAU * self.phase).sin();
        self.phase += frequency / sample_rate;
        self.phase -= self.phase.floor();
        out
    }
}
