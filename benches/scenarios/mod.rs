//! Real-world scenario benchmarks.
//!
//! These benchmarks model what the audio thread actually does: render layer
//! chains, and render whole atmospheres through the mixer.

mod mix;
mod voices;

pub use mix::bench_mix;
pub use voices::bench_voices;
