//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `fetch`: acquisition runs (also `check`) and loop mode
//! - `inspect`: artist variations and duplicate lookups
//! - `settings`: config file display and initialisation

mod fetch;
mod inspect;
mod settings;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub use fetch::cmd_fetch;
pub use inspect::{cmd_locate, cmd_variations};
pub use settings::cmd_config;

/// flac-hoard CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Download every track of a track list that is not yet in the library
    Fetch(RunArgs),
    /// Report which tracks of a track list are missing, without downloading
    Check(RunArgs),
    /// Print the folder-name variations derived from an artist credit
    Variations {
        /// Artist credit, e.g. "Simon & Garfunkel"
        artist: String,
    },
    /// Search a library for a file carrying an ISRC
    Locate {
        /// Library root
        output_dir: PathBuf,
        /// Artist credit used to pick candidate folders
        #[arg(short, long)]
        artist: String,
        /// ISRC to look for
        #[arg(short, long)]
        isrc: String,
    },
    /// Show or initialise the configuration file
    Config {
        /// Write the default configuration if no file exists
        #[arg(long)]
        init: bool,
    },
}

/// Options shared by `fetch` and `check`.
///
/// Flags left unset fall back to the config file.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Track list JSON produced by the catalog resolver
    pub tracks: PathBuf,
    /// Library root (defaults to `placement.output_dir` from the config)
    #[arg(env = "FLAC_HOARD_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,
    /// Download service to try, in order (repeatable)
    #[arg(short, long = "service")]
    pub services: Vec<String>,
    /// Preset (title_artist, artist_title, title_only) or custom template
    #[arg(short, long)]
    pub filename_format: Option<String>,
    /// Put files in a folder per artist
    #[arg(long)]
    pub artist_subfolders: bool,
    /// Put files in a folder per album
    #[arg(long)]
    pub album_subfolders: bool,
    /// Write an M3U8 playlist for albums and playlists
    #[arg(long)]
    pub playlist: bool,
    /// Do not write tags into downloaded files
    #[arg(long)]
    pub no_tags: bool,
    /// Tracks processed at the same time
    #[arg(short, long)]
    pub concurrency: Option<usize>,
    /// Upper bound for one backend attempt, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Re-run every N minutes until interrupted
    #[arg(long = "loop", value_name = "MINUTES")]
    pub loop_minutes: Option<u64>,
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Fetch(args) => cmd_fetch(args, false),
        Commands::Check(args) => cmd_fetch(args, true),
        Commands::Variations { artist } => cmd_variations(artist),
        Commands::Locate {
            output_dir,
            artist,
            isrc,
        } => cmd_locate(output_dir, artist, isrc),
        Commands::Config { init } => cmd_config(*init),
    }
}
