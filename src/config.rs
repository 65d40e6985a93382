//! Engine tuning.
//!
//! Every field has a default matching the stock soundscapes; hosts override
//! the few they care about with the `with_*` builders.

use crate::synth::mixer::MixerSettings;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Teardown fade when stopping with a fade, in seconds.
    pub fade_out: f32,
    /// Fade-in of continuous beds, in seconds.
    pub fade_in: f32,
    /// Master volume ramp, in seconds.
    pub volume_ramp: f32,
    /// Length of looping noise buffers, in seconds.
    pub noise_loop: f32,
    /// Master volume applied when the output opens.
    pub initial_volume: f32,
    /// Maximum simultaneously connected nodes.
    pub mixer_slots: usize,
    /// Slots kept for continuous beds. One-shots never take these.
    pub bed_slots: usize,
    /// Depth of the control → render command ring.
    pub command_queue: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fade_out: 0.5,
            fade_in: 0.5,
            volume_ramp: 0.1,
            noise_loop: 2.0,
            initial_volume: 0.5,
            mixer_slots: 64,
            bed_slots: 16,
            command_queue: 256,
        }
    }
}

impl EngineConfig {
    pub fn with_fade_out(mut self, seconds: f32) -> Self {
        self.fade_out = seconds.max(0.0);
        self
    }

    pub fn with_fade_in(mut self, seconds: f32) -> Self {
        self.fade_in = seconds.max(0.0);
        self
    }

    pub fn with_volume_ramp(mut self, seconds: f32) -> Self {
        self.volume_ramp = seconds.max(0.0);
        self
    }

    pub fn with_noise_loop(mut self, seconds: f32) -> Self {
        self.noise_loop = seconds.max(0.0);
        self
    }

    pub fn with_initial_volume(mut self, volume: f32) -> Self {
        self.initial_volume = clamp_volume(volume);
        self
    }

    pub fn with_mixer_slots(mut self, slots: usize) -> Self {
        self.mixer_slots = slots.max(1);
        self
    }

    pub fn with_bed_slots(mut self, slots: usize) -> Self {
        self.bed_slots = slots;
        self
    }

    pub fn with_command_queue(mut self, depth: usize) -> Self {
        self.command_queue = depth.max(1);
        self
    }

    pub fn mixer_settings(&self) -> MixerSettings {
        MixerSettings {
            slots: self.mixer_slots,
            beds: self.bed_slots.min(self.mixer_slots),
            command_queue: self.command_queue,
        }
    }
}

/// Clamp a volume into `[0, 1]`. NaN counts as silence.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}
