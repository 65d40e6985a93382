//! Procedural ambient soundscapes: rain, cafe, ocean, forest and fire,
//! synthesized from noise and oscillators with no audio assets.

pub mod catalog;
pub mod config;
pub mod dsp;
pub mod engine; // Atmosphere switching, layers and schedules
pub mod error;
pub mod graph; // Composable audio graph nodes
pub mod io;
pub mod random;
pub mod synth; // Render-side mixer and its commands
pub mod voices;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use catalog::{AtmosphereDefinition, Catalog, LayerDescriptor};
pub use config::EngineConfig;
pub use engine::AmbientEngine;
pub use error::{AmbientError, Result};

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Lock, recovering the data if another thread panicked while holding it.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
