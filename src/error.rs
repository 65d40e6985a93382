//! Error handling for the engine and its output backends.
//!
//! The control surface (`AmbientEngine`) never returns these: it logs them and
//! degrades to an inert engine. Backends and the offline renderer do.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, AmbientError>;

#[derive(Error, Debug)]
pub enum AmbientError {
    // Device Errors
    #[error("No output device available")]
    NoOutputDevice,

    #[error("Output device configuration failed: {reason}")]
    DeviceConfig { reason: String },

    #[error("Unsupported sample format: {format}")]
    UnsupportedSampleFormat { format: String },

    // Stream Errors
    #[error("Failed to build output stream: {reason}")]
    StreamBuild { reason: String },

    #[error("Failed to start output stream: {reason}")]
    StreamPlay { reason: String },

    #[error("Audio host thread failed: {reason}")]
    HostThread { reason: String },

    // Graph Errors
    #[error("Output is not open")]
    NotOpen,

    #[error("Command queue full, dropped {command}")]
    CommandQueueFull { command: &'static str },

    // File Errors
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

impl AmbientError {
    /// Whether the failure leaves the output unusable for good.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AmbientError::CommandQueueFull { .. })
    }
}
