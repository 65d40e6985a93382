use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use tracing::debug;

use crate::{
    error::{AmbientError, Result},
    graph::node::RenderCtx,
    io::{DeviceInfo, DeviceState, OutputBackend},
    lock,
    synth::{
        message::GraphCommand,
        mixer::{Mixer, MixerHandle, MixerSettings},
    },
};

/*
Offline Output
==============

Renders the mixer on demand instead of from a device callback. The backend is
handed to the engine; the `OfflineTap` stays with the caller and pulls frames:

  let backend = OfflineBackend::new(48_000.0);
  let tap = backend.tap();
  let mut engine = AmbientEngine::new(backend);

  engine.play("rainy-study").await;
  let frames = tap.render_seconds(1.0);

Used by tests, benchmarks and `hush-ambient render`.
*/

struct Shared {
    mixer: Option<Mixer>,
    state: DeviceState,
}

pub struct OfflineBackend {
    sample_rate: f32,
    shared: Arc<Mutex<Shared>>,
    handle: Option<MixerHandle>,
}

impl OfflineBackend {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            shared: Arc::new(Mutex::new(Shared {
                mixer: None,
                state: DeviceState::Closed,
            })),
            handle: None,
        }
    }

    /// Start the output suspended, the way a browser context starts before a
    /// user gesture. `resume()` gets it going.
    pub fn suspended(self) -> Self {
        lock(&self.shared).state = DeviceState::Suspended;
        self
    }

    /// Caller-side handle for pulling audio.
    pub fn tap(&self) -> OfflineTap {
        OfflineTap {
            sample_rate: self.sample_rate,
            shared: Arc::clone(&self.shared),
        }
    }
}

impl OutputBackend for OfflineBackend {
    fn open(&mut self, settings: MixerSettings) -> Result<DeviceInfo> {
        let (mixer, handle) = Mixer::new(settings, 0.0);
        let mut shared = lock(&self.shared);
        shared.mixer = Some(mixer);
        if shared.state == DeviceState::Closed {
            shared.state = DeviceState::Running;
        }
        self.handle = Some(handle);

        debug!(sample_rate = self.sample_rate, "offline output opened");
        Ok(DeviceInfo {
            name: "offline".into(),
            sample_rate: self.sample_rate,
            channels: 1,
        })
    }

    fn state(&self) -> DeviceState {
        lock(&self.shared).state
    }

    fn resume(&mut self) -> Result<()> {
        let mut shared = lock(&self.shared);
        if shared.state == DeviceState::Suspended {
            shared.state = DeviceState::Running;
        }
        Ok(())
    }

    fn submit(&mut self, command: GraphCommand) -> Result<()> {
        let handle = self.handle.as_mut().ok_or(AmbientError::NotOpen)?;
        handle
            .send(command)
            .map_err(|command| AmbientError::CommandQueueFull {
                command: command.name(),
            })
    }

    fn free_commands(&self) -> Option<usize> {
        self.handle.as_ref().map(MixerHandle::free)
    }
}

/// Pulls rendered audio out of an `OfflineBackend`.
#[derive(Clone)]
pub struct OfflineTap {
    sample_rate: f32,
    shared: Arc<Mutex<Shared>>,
}

impl OfflineTap {
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Fill `out` with the next frames. Silence while the output is closed
    /// or suspended.
    pub fn render_into(&self, out: &mut [f32]) {
        let mut shared = lock(&self.shared);
        let running = shared.state == DeviceState::Running;
        match shared.mixer.as_mut() {
            Some(mixer) if running => mixer.render(out, &RenderCtx::new(self.sample_rate)),
            _ => out.fill(0.0),
        }
    }

    pub fn render(&self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        self.render_into(&mut out);
        out
    }

    pub fn render_seconds(&self, seconds: f32) -> Vec<f32> {
        self.render((seconds.max(0.0) * self.sample_rate).round() as usize)
    }

    /// Number of nodes the mixer currently holds.
    pub fn live_nodes(&self) -> usize {
        let shared = lock(&self.shared);
        shared.mixer.as_ref().map_or(0, Mixer::len)
    }

    /// Labels of the nodes the mixer currently holds.
    pub fn live_labels(&self) -> Vec<&'static str> {
        let shared = lock(&self.shared);
        shared
            .mixer
            .as_ref()
            .map(|mixer| mixer.labels().to_vec())
            .unwrap_or_default()
    }

    /// Apply queued commands without rendering.
    pub fn sync(&self) {
        let mut shared = lock(&self.shared);
        if let Some(mixer) = shared.mixer.as_mut() {
            mixer.process_commands();
        }
    }
}

/// Write mono samples as a 32-bit float WAV file.
pub fn write_wav(path: impl AsRef<Path>, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
