//! Fire crackle voice.
//!
//! A pop is a few milliseconds of white noise through a narrow bandpass,
//! starting at full level and falling linearly to silence. Both the band
//! centre (2–4 kHz) and the length (5–15 ms) are drawn per pop, so the fire
//! never repeats itself.
//!
//! Pops come from their own fast tick (every 200 ms, 40% chance), whatever
//! interval the layer declares.

use crate::{
    dsp::noise::{NoiseBuffer, NoiseKind},
    engine::scheduler::{Cadence, Shot},
    graph::{
        envelope::EnvNode, extensions::NodeExt, filter::FilterNode, noise::NoiseNode, GraphNode,
    },
};

pub const TICK_MS: u64 = 200;
pub const PROBABILITY: f32 = 0.4;

/// Range of band centres in Hz.
pub const CENTER_RANGE: (f32, f32) = (2_000.0, 4_000.0);
/// Range of pop lengths in seconds.
pub const LENGTH_RANGE: (f32, f32) = (0.005, 0.015);

const LEVEL: f32 = 0.3;
const Q: f32 = 5.0;

pub fn crackle_pop(noise: NoiseBuffer, volume: f32, center: f32, length: f32) -> impl GraphNode {
    NoiseNode::once(noise)
        .stop_after(length)
        .through(FilterNode::bandpass(center).with_q(Q))
        .amplify(EnvNode::new(|env| {
            env.set_value_at(volume * LEVEL, 0.0)
                .linear_ramp_to(0.0, length as f64);
        }))
}

/// Draw a pop from `shot`.
pub fn random_pop(shot: &mut Shot<'_>, volume: f32) -> Box<dyn GraphNode> {
    let center = shot.random.range(CENTER_RANGE.0, CENTER_RANGE.1);
    let length = shot.random.range(LENGTH_RANGE.0, LENGTH_RANGE.1);
    crackle_pop(shot.noise(NoiseKind::White, length), volume, center, length).boxed()
}

pub fn cadence() -> Cadence {
    Cadence::every_ms(TICK_MS).with_probability(PROBABILITY)
}
