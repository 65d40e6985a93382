//! Output backends: where the mixer's audio ends up.
//!
//! `OutputBackend` is the seam between the engine and the platform sink. The
//! engine only ever opens a backend, asks whether it is suspended, and hands
//! it `GraphCommand`s; the backend owns the `Mixer` and drives it from
//! whatever clock it has (a device callback, or explicit offline renders).

#[cfg(feature = "cpal")]
pub mod cpal;
pub mod offline;

use crate::{
    error::Result,
    synth::{message::GraphCommand, mixer::MixerSettings},
};

/// Playback state of an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceState {
    /// Not opened yet.
    #[default]
    Closed,
    Running,
    /// Open but not pulling audio (paused stream, suspended context).
    Suspended,
}

/// What the opened output looks like.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub name: String,
    pub sample_rate: f32,
    pub channels: u16,
}

pub trait OutputBackend: Send {
    /// Open the output and start rendering a fresh mixer built from
    /// `settings`. The master gain starts silent.
    fn open(&mut self, settings: MixerSettings) -> Result<DeviceInfo>;

    fn state(&self) -> DeviceState;

    /// Resume a suspended output. No-op when already running.
    fn resume(&mut self) -> Result<()>;

    /// Forward a command to the render side.
    fn submit(&mut self, command: GraphCommand) -> Result<()>;

    /// Free space in the command queue, if the backend can tell.
    fn free_commands(&self) -> Option<usize> {
        None
    }
}

impl<B: OutputBackend + ?Sized> OutputBackend for Box<B> {
    fn open(&mut self, settings: MixerSettings) -> Result<DeviceInfo> {
        (**self).open(settings)
    }

    fn state(&self) -> DeviceState {
        (**self).state()
    }

    fn resume(&mut self) -> Result<()> {
        (**self).resume()
    }

    fn submit(&mut self, command: GraphCommand) -> Result<()> {
        (**self).submit(command)
    }

    fn free_commands(&self) -> Option<usize> {
        (**self).free_commands()
    }
}
