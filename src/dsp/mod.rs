//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components are allocation-free once constructed, making them safe to
//! embed directly inside nodes that render on the audio thread. They stay
//! focused on the signal-processing math so graph combinators can layer on
//! orchestration and modulation.

/// Gain, product and sum helpers.
pub mod amplify;
/// Breakpoint timelines for gains and frequencies.
pub mod automation;
/// State-variable filter implementation with multiple responses.
pub mod filter;
/// White, pink and brown noise buffers.
pub mod noise;
/// Phase-accumulator sine.
pub mod oscillator;

pub use automation::Automation;
pub use noise::{NoiseBuffer, NoiseGenerator, NoiseKind};
