//! flac-hoard - keep a local FLAC library in sync with catalog track lists.
//!
//! For every track of an album, playlist or single track, looks for an
//! existing copy in the library (exact path first, then by ISRC in the
//! artist's folders) and downloads only what is missing, trying the
//! configured download services in order.

pub mod acquisition;
pub mod backends;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod matching;
pub mod metadata;
pub mod model;
pub mod organizer;
pub mod playlist;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("flac_hoard=info".parse()?))
        .init();

    cli::run_command(&args)
}
