use std::{
    sync::mpsc,
    thread::{self, JoinHandle},
};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    FromSample, Sample, SizedSample,
};
use tracing::{debug, error, info};

use crate::{
    error::{AmbientError, Result},
    graph::node::RenderCtx,
    io::{DeviceInfo, DeviceState, OutputBackend},
    synth::{
        message::GraphCommand,
        mixer::{Mixer, MixerHandle, MixerSettings},
    },
    MAX_BLOCK_SIZE,
};

/*
Device Output
=============

A cpal stream cannot leave the thread that built it, but the engine wants to
hold its backend from an async task. So the stream lives on a dedicated host
thread, and the backend talks to it over a channel:

  engine ──submit──→ MixerHandle ──[ring]──→ Mixer (inside the cpal callback)
  engine ──resume──→ HostControl::Play ──→ host thread ──→ stream.play()

The mixer renders mono; every output channel gets the same signal.
*/

enum HostControl {
    Play,
    Pause,
    Shutdown,
}

struct HostThread {
    control: mpsc::Sender<HostControl>,
    thread: Option<JoinHandle<()>>,
}

impl HostThread {
    fn send(&self, message: HostControl) -> Result<()> {
        self.control
            .send(message)
            .map_err(|_| AmbientError::HostThread {
                reason: "audio host thread has exited".into(),
            })
    }
}

impl Drop for HostThread {
    fn drop(&mut self) {
        let _ = self.control.send(HostControl::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("audio host thread panicked");
            }
        }
    }
}

/// Default output device via cpal.
#[derive(Default)]
pub struct CpalBackend {
    host: Option<HostThread>,
    handle: Option<MixerHandle>,
    state: DeviceState,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause the stream. `resume()` restarts it.
    pub fn suspend(&mut self) -> Result<()> {
        if self.state == DeviceState::Running {
            if let Some(host) = &self.host {
                host.send(HostControl::Pause)?;
                self.state = DeviceState::Suspended;
            }
        }
        Ok(())
    }
}

impl OutputBackend for CpalBackend {
    fn open(&mut self, settings: MixerSettings) -> Result<DeviceInfo> {
        // Reopening replaces the previous stream
        self.host = None;
        self.handle = None;

        let (mixer, handle) = Mixer::new(settings, 0.0);
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let (control_tx, control_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("hush-ambient-audio".into())
            .spawn(move || run_host(mixer, ready_tx, control_rx))
            .map_err(|e| AmbientError::HostThread {
                reason: e.to_string(),
            })?;

        let host = HostThread {
            control: control_tx,
            thread: Some(thread),
        };

        let info = ready_rx.recv().map_err(|_| AmbientError::HostThread {
            reason: "audio host thread exited during startup".into(),
        })??;

        info!(
            device = %info.name,
            sample_rate = info.sample_rate,
            channels = info.channels,
            "audio output opened"
        );

        self.host = Some(host);
        self.handle = Some(handle);
        self.state = DeviceState::Running;
        Ok(info)
    }

    fn state(&self) -> DeviceState {
        self.state
    }

    fn resume(&mut self) -> Result<()> {
        if self.state == DeviceState::Suspended {
            if let Some(host) = &self.host {
                host.send(HostControl::Play)?;
                self.state = DeviceState::Running;
                debug!("audio output resumed");
            }
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

fn run_host(
    mixer: Mixer,
    ready: mpsc::SyncSender<Result<DeviceInfo>>,
    control: mpsc::Receiver<HostControl>,
) {
    let stream = match start_stream(mixer) {
        Ok((stream, info)) => {
            let _ = ready.send(Ok(info));
            stream
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    while let Ok(message) = control.recv() {
        match message {
            HostControl::Play => {
                if let Err(e) = stream.play() {
                    error!(error = %e, "failed to resume audio stream");
                }
            }
            HostControl::Pause => {
                if let Err(e) = stream.pause() {
                    error!(error = %e, "failed to pause audio stream");
                }
            }
            HostControl::Shutdown => break,
        }
    }

    debug!("audio host thread stopping");
}

fn start_stream(mixer: Mixer) -> Result<(cpal::Stream, DeviceInfo)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(AmbientError::NoOutputDevice)?;
    let config = device
        .default_output_config()
        .map_err(|e| AmbientError::DeviceConfig {
            reason: e.to_string(),
        })?;

    let info = DeviceInfo {
        name: device.name().unwrap_or_else(|_| "default".into()),
        sample_rate: config.sample_rate().0 as f32,
        channels: config.channels(),
    };

    let sample_format = config.sample_format();
    let stream_config: cpal::StreamConfig = config.into();

    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, mixer)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, mixer)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, mixer)?,
        other => {
            return Err(AmbientError::UnsupportedSampleFormat {
                format: format!("{other:?}"),
            })
        }
    };

    stream.play().map_err(|e| AmbientError::StreamPlay {
        reason: e.to_string(),
    })?;

    Ok((stream, info))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut mixer: Mixer,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;
    let ctx = RenderCtx::new(config.sample_rate.0 as f32);
    let mut mono = vec![0.0f32; MAX_BLOCK_SIZE];

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                    let block = &mut mono[..chunk.len() / channels];
                    mixer.render(block, &ctx);

                    // Copy to output (mono to all channels)
                    for (frame, &sample) in chunk.chunks_mut(channels).zip(block.iter()) {
                        frame.fill(T::from_sample(sample));
                    }
                }
            },
            |err| error!(error = %err, "audio stream error"),
            None,
        )
        .map_err(|e| AmbientError::StreamBuild {
            reason: e.to_string(),
        })
}
