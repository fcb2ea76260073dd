//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while the
//! CLI layer uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level error enum; everything here aborts a batch
//! - [`BackendError`]: One backend failing for one track (recovered locally)
//! - [`crate::catalog::CatalogError`] and [`crate::config::ConfigError`] for
//!   their own subsystems
//!
//! # Example
//!
//! ```ignore
//! use flac_hoard::error::{Error, Result};
//!
//! fn prepare(dir: &Path) -> Result<()> {
//!     if !dir.is_dir() {
//!         return Err(Error::config(format!("not a directory: {}", dir.display())));
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
///
/// Only batch-level problems end up here. Per-track and per-backend
/// failures are recorded in the batch report instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Track list could not be loaded
    #[error("Catalog error: {0}")]
    Catalog(#[from] crate::catalog::CatalogError),

    /// Invalid run configuration (output dir, backend list, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// File not found
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Why a single backend could not deliver a file for a single track.
///
/// These never abort a batch: the orchestrator records them and moves on
/// to the next backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    #[error("No ISRC available")]
    MissingIsrc,

    #[error("No match found for ISRC {0}")]
    NoMatch(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Download stopped by user")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Downloaded file missing or invalid: {0}")]
    MissingFile(PathBuf),
}

impl From<std::io::Error> for BackendError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}
