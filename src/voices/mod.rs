//! Layer recipes for the stock soundscapes.
//!
//! Each file holds the node graph for one sound plus the `LayerBuilder` that
//! wires it into an atmosphere. Continuous beds are looping noise through one
//! filter; one-shots are short graphs fired from a schedule.
//!
//! # Example
//!
//! ```ignore
//! use hush_ambient::voices;
//!
//! // Beds
//! let rain = voices::rain_body(brown, false);
//! let wind = voices::wind(pink);
//!
//! // One-shots
//! let gull = voices::seagull(0.1);
//! let chirp = voices::bird(0.4, 2_000.0);
//! ```

mod bird;
pub mod crackle;
mod espresso;
mod fire;
mod murmur;
mod rain;
mod seagull;
mod thunder;
mod waves;
mod wind;

pub use bird::{bird, Birds};
pub use espresso::{espresso_hiss, Espresso};
pub use fire::{fire_bed, FireCrackle};
pub use murmur::{murmur, CafeMurmur};
pub use rain::{rain_body, rain_patter, Rain};
pub use seagull::{seagull, Seagulls};
pub use thunder::{thunder, Thunder};
pub use waves::{surf, swell, Waves};
pub use wind::{wind, Wind};

use crate::engine::layers::LayerRegistry;

/// Register every stock layer kind.
pub fn register_builtin(registry: &mut LayerRegistry) {
    registry
        .register("rain", Rain { heavy: false })
        .register("heavy-rain", Rain { heavy: true })
        .register("thunder", Thunder)
        .register("cafe-murmur", CafeMurmur)
        .register("espresso", Espresso)
        .register("waves", Waves)
        .register("seagulls", Seagulls)
        .register("wind", Wind)
        .register("birds", Birds)
        .register("fire-crackle", FireCrackle);
}
