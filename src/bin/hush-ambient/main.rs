//! hush-ambient: listen to or bounce the stock atmospheres.
//!
//! ```text
//! hush-ambient list
//! hush-ambient play rainy-study --volume 0.4
//! hush-ambient render fireplace --out fire.wav --seconds 30 --seed 7
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hush-ambient")]
#[command(version, about = "Procedural ambient soundscapes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available atmospheres
    List {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play an atmosphere on the default output device
    Play {
        /// Atmosphere id (see `list`)
        id: String,

        /// Master volume, 0 to 1
        #[arg(short, long, default_value_t = 0.5)]
        volume: f32,

        /// Stop after this many seconds (plays until interrupted otherwise)
        #[arg(short, long)]
        seconds: Option<f32>,
    },

    /// Render an atmosphere to a WAV file
    Render {
        /// Atmosphere id (see `list`)
        id: String,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,

        /// Length in seconds
        #[arg(short, long, default_value_t = 30.0)]
        seconds: f32,

        #[arg(long, default_value_t = 48_000)]
        sample_rate: u32,

        /// Seed for reproducible renders
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Master volume, 0 to 1
        #[arg(short, long, default_value_t = 0.5)]
        volume: f32,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::List { json } => commands::list(json),
        Command::Play {
            id,
            volume,
            seconds,
        } => commands::play(&id, volume, seconds),
        Command::Render {
            id,
            out,
            seconds,
            sample_rate,
            seed,
            volume,
        } => commands::render(&id, &out, seconds, sample_rate, seed, volume),
    }
}
