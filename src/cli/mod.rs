//! Command-line interface for flac-hoard.
//!
//! Fetches the tracks of a catalog track list into a music folder, checks
//! which are missing, and exposes the duplicate-detection helpers for
//! debugging folder layouts.

mod commands;

pub use commands::{Cli, Commands, run_command};
