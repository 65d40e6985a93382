//! Thunder voice.
//!
//! A distant roll rather than a crack:
//!
//! 1. Sine sweeping 50 Hz → 30 Hz (exponential, 2 s), felt more than heard
//! 2. 100 Hz lowpass to keep the rumble dark
//! 3. Envelope: 0.3 s swell to full level, then an exponential tail down to
//!    1% by 3 s, where the oscillator stops
//!
//! # Timing
//!
//! The first roll comes 2–7 s after the atmosphere starts. After that each
//! interval gets one roll, delayed by up to half an interval so the storm
//! never sounds clockwork.

use std::time::Duration;

use crate::{
    catalog::LayerDescriptor,
    engine::{
        layers::{LayerBuilder, LayerContext, LayerHandles},
        scheduler::Cadence,
    },
    graph::{
        envelope::EnvNode, extensions::NodeExt, filter::FilterNode, oscillator::OscNode,
        GraphNode,
    },
};

/// Interval used when the descriptor has none.
pub const DEFAULT_INTERVAL_MS: u64 = 15_000;

const LENGTH: f32 = 3.0;

pub fn thunder(volume: f32) -> impl GraphNode {
    OscNode::sine(50.0)
        .frequency(|f| {
            f.exponential_ramp_to(30.0, 2.0);
        })
        .stop_after(LENGTH)
        .through(FilterNode::lowpass(100.0))
        .amplify(EnvNode::new(|env| {
            env.set_value_at(0.0, 0.0)
                .linear_ramp_to(volume, 0.3)
                .exponential_ramp_to(0.01, LENGTH as f64);
        }))
}

pub fn cadence(interval_ms: u64) -> Cadence {
    Cadence::every_ms(interval_ms)
        .with_first_delay(Duration::from_secs(2), Duration::from_secs(7))
        .with_jitter(0.5)
}

/// `thunder` layer.
pub struct Thunder;

impl LayerBuilder for Thunder {
    fn build(&self, ctx: &LayerContext<'_>, layer: &LayerDescriptor) -> LayerHandles {
        let volume = layer.volume;
        let interval = layer.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS);
        LayerHandles::new().schedule(ctx.schedule("thunder", cadence(interval), move |_| {
            thunder(volume).boxed()
        }))
    }
}
