//! Composable building blocks for constructing audio-processing graphs.
//!
//! Graph nodes wrap the low-level DSP primitives with what an ambient layer
//! needs: looping noise, pitch sweeps, breakpoint envelopes, and block-based
//! rendering. The `extensions` module adds fluent helpers so layer recipes
//! read as a chain: `noise.through(filter).amplify(envelope)`.

/// Multiply two signals together (signal × envelope).
pub mod amplify;
/// Breakpoint envelope node.
pub mod envelope;
/// Fluent combinators (`.amplify()`, `.through()`, `.boxed()`).
pub mod extensions;
/// Topology-preserving filter node with multiple responses.
pub mod filter;
/// Per-layer gain stage: fader, base level and optional LFO.
pub mod gain;
/// Low frequency oscillators for gain modulation.
pub mod lfo;
/// Core traits shared by all graph nodes.
pub mod node;
/// Looping and one-shot noise playback.
pub mod noise;
/// Sine oscillator with a frequency timeline.
pub mod oscillator;
/// Serial chaining of two nodes (source → effect).
pub mod through;

pub use extensions::NodeExt;
pub use node::{GraphNode, RenderCtx};
