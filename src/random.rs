//! Injectable randomness.
//!
//! Everything that rolls dice (noise buffers, scheduler jitter, probability
//! gates, randomized one-shot parameters) pulls from a [`RandomSource`]. Any
//! `rand` generator works through the blanket impl; tests swap in
//! [`ScriptedRandom`] to get exact fire/no-fire outcomes.

use std::sync::{Arc, Mutex};

use rand::{rngs::SmallRng, Rng, RngCore, SeedableRng};

/// A source of uniform random numbers.
pub trait RandomSource: Send {
    /// Uniform sample in `[0.0, 1.0)`.
    fn next_unit(&mut self) -> f32;

    /// Uniform sample in `[low, high)`.
    fn range(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.next_unit()
    }

    /// Uniform sample in `[-1.0, 1.0)`.
    fn bipolar(&mut self) -> f32 {
        self.next_unit() * 2.0 - 1.0
    }

    /// Returns true with the given probability.
    fn chance(&mut self, probability: f32) -> bool {
        self.next_unit() < probability
    }
}

impl<R: RngCore + Send> RandomSource for R {
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Random source shared between the engine and its scheduler tasks.
pub type SharedRandom = Arc<Mutex<Box<dyn RandomSource>>>;

/// Wrap any source for sharing.
pub fn shared(source: impl RandomSource + 'static) -> SharedRandom {
    Arc::new(Mutex::new(Box::new(source)))
}

/// Fast non-cryptographic generator seeded from the OS.
pub fn from_entropy() -> SharedRandom {
    shared(SmallRng::from_os_rng())
}

/// Reproducible generator (offline renders, benchmarks).
pub fn seeded(seed: u64) -> SharedRandom {
    shared(SmallRng::seed_from_u64(seed))
}

/// Replays a fixed list of values in a loop.
///
/// Values are clamped into `[0.0, 1.0)`. An empty script behaves like a
/// constant `0.0`.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        let mut values: Vec<f32> = values
            .into()
            .into_iter()
            .map(|v| v.clamp(0.0, 0.999_999))
            .collect();
        if values.is_empty() {
            values.push(0.0);
        }
        Self { values, cursor: 0 }
    }

    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f32 {
        let value = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        value
    }
}
