//! Render-side bus and the commands that drive it.
//!
//! This layer sits between the graph nodes and the output backends: the
//! control plane sends `GraphCommand`s, the `Mixer` applies them on the audio
//! thread and sums every live node into the master gain.

pub mod message;
pub mod mixer;

pub use message::{GraphCommand, NodeId, OwnerId};
pub use mixer::{Mixer, MixerHandle, MixerSettings};
