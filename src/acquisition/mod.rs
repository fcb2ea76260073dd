//! Track acquisition: duplicate check, backend fallback, placement.
//!
//! # Architecture
//!
//! - [`AcquisitionConfig`] - everything one run needs, passed in explicitly
//! - [`Orchestrator`] - drives each track through the state machine
//! - [`BatchReport`] - aggregate counts and failures of a run
//!
//! A track ends in exactly one [`TrackState`](crate::model::TrackState):
//! already resolved, found on disk, missing (check-only), downloaded,
//! failed on every backend, or cancelled.

mod orchestrator;
pub mod report;

use std::path::PathBuf;
use std::time::Duration;

use crate::backends::{BackendId, BackendRegistry, DEFAULT_TIMEOUT_SECS};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::organizer::PlacementConfig;

pub use orchestrator::Orchestrator;
pub use report::{BatchReport, format_minutes, format_seconds};

/// Settings for one acquisition run.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionConfig {
    pub placement: PlacementConfig,
    /// Backends to try, in priority order
    pub services: Vec<BackendId>,
    /// Upper bound for a single backend attempt
    pub backend_timeout: Duration,
    pub check_only: bool,
    pub create_playlist: bool,
    /// Run the tag enricher on downloaded files
    pub embed_tags: bool,
    /// Tracks processed at the same time
    pub concurrency: usize,
}

impl AcquisitionConfig {
    /// Defaults for `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            placement: PlacementConfig::new(output_dir),
            services: vec![BackendId::from(crate::backends::deezer::BACKEND_ID)],
            backend_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            check_only: false,
            create_playlist: false,
            embed_tags: true,
            concurrency: 1,
        }
    }

    /// Build from the config file's settings for `output_dir`.
    pub fn from_config(config: &Config, output_dir: impl Into<PathBuf>) -> Self {
        let mut placement = PlacementConfig::new(output_dir);
        placement.filename_format = config.placement.filename_format.clone();
        placement.artist_subfolders = config.placement.artist_subfolders;
        placement.album_subfolders = config.placement.album_subfolders;

        Self {
            placement,
            services: config
                .backends
                .services
                .iter()
                .map(|s| BackendId::from(s.as_str()))
                .collect(),
            backend_timeout: Duration::from_secs(config.backends.timeout_secs),
            check_only: config.run.check_only,
            create_playlist: config.run.create_playlist,
            embed_tags: config.run.embed_tags,
            concurrency: config.run.concurrency,
        }
    }

    /// Reject settings that would make the whole batch fail.
    pub fn validate(&self, registry: &BackendRegistry) -> Result<()> {
        let output_dir = &self.placement.output_dir;
        if !output_dir.exists() {
            return Err(Error::not_found(output_dir).context("Output directory"));
        }
        if !output_dir.is_dir() {
            return Err(Error::config(format!(
                "Output path is not a directory: {}",
                output_dir.display()
            )));
        }

        if self.services.is_empty() {
            return Err(Error::config("No download services configured"));
        }
        if let Some(unknown) = self.services.iter().find(|id| !registry.contains(id)) {
            let known: Vec<&str> = registry.ids().map(BackendId::as_str).collect();
            return Err(Error::config(format!(
                "Unknown download service '{}' (available: {})",
                unknown,
                known.join(", ")
            )));
        }

        if self.concurrency == 0 {
            return Err(Error::config("Concurrency must be at least 1"));
        }
        if self.backend_timeout.is_zero() {
            return Err(Error::config("Backend timeout must be greater than zero"));
        }

        Ok(())
    }
}
