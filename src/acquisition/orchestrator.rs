//! Per-track acquisition state machine and backend fallback.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use super::{AcquisitionConfig, BatchReport};
use crate::backends::{AttemptRequest, BackendId, BackendRegistry, BackendSettings};
use crate::enrichment::{Enricher, TagEnricher};
use crate::error::{BackendError, Result};
use crate::matching::{DuplicateDetector, FsLibrary, LibraryScan};
use crate::model::{AcquisitionOutcome, MatchResult, Track, TrackList, TrackState};
use crate::organizer::{Placement, ensure_dir, move_into_place};
use crate::playlist::{PlaylistOutcome, write_m3u8};

/// Drives a batch of tracks through duplicate detection and the backends.
///
/// Tracks are processed up to `concurrency` at a time; backends for one
/// track are always tried one after another.
pub struct Orchestrator<S: LibraryScan = FsLibrary> {
    config: AcquisitionConfig,
    registry: BackendRegistry,
    detector: Arc<DuplicateDetector<S>>,
    enricher: Option<Arc<dyn Enricher>>,
    cancel: CancellationToken,
}

impl Orchestrator<FsLibrary> {
    /// Create an orchestrator scanning the real filesystem.
    ///
    /// Installs the [`TagEnricher`] when `config.embed_tags` is set.
    pub fn new(config: AcquisitionConfig, registry: BackendRegistry) -> Self {
        let enricher = config
            .embed_tags
            .then(|| Arc::new(TagEnricher::new()) as Arc<dyn Enricher>);

        Self {
            config,
            registry,
            detector: Arc::new(DuplicateDetector::new()),
            enricher,
            cancel: CancellationToken::new(),
        }
    }
}

impl<S: LibraryScan + 'static> Orchestrator<S> {
    /// Replace the duplicate detector.
    pub fn with_detector<T: LibraryScan + 'static>(
        self,
        detector: DuplicateDetector<T>,
    ) -> Orchestrator<T> {
        Orchestrator {
            config: self.config,
            registry: self.registry,
            detector: Arc::new(detector),
            enricher: self.enricher,
            cancel: self.cancel,
        }
    }

    /// Replace (or remove) the post-download enricher.
    pub fn with_enricher(mut self, enricher: Option<Arc<dyn Enricher>>) -> Self {
        self.enricher = enricher;
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops the run at the next track or backend boundary.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Process every track of `batch`.
    ///
    /// Only setup problems (invalid output directory, unknown backend) are
    /// returned as errors; per-track failures end up in the report.
    pub async fn run(&self, batch: &mut TrackList) -> Result<BatchReport> {
        self.config.validate(&self.registry)?;

        let started_at = Utc::now();
        let start = Instant::now();
        let placement = Placement::for_batch(&self.config.placement, batch);
        let total = batch.len();

        tracing::info!(
            "{} {} tracks into {:?}",
            if self.config.check_only { "Checking" } else { "Acquiring" },
            total,
            placement.root()
        );

        let this = self;
        let placement_ref = &placement;
        let outcomes: Vec<AcquisitionOutcome> = stream::iter(batch.tracks.iter_mut().enumerate())
            .map(move |(index, track)| this.process_track(track, index + 1, total, placement_ref))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        if self.config.create_playlist && !self.cancel.is_cancelled() {
            match write_m3u8(batch, &placement, self.config.check_only) {
                Ok(PlaylistOutcome::Incomplete { missing, total }) => {
                    tracing::warn!("Playlist not created: {} of {} tracks missing", missing, total)
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Failed to create playlist: {}", e),
            }
        }

        let report = BatchReport::from_outcomes(
            batch,
            outcomes,
            started_at,
            start.elapsed(),
            self.config.check_only,
        );
        tracing::info!(
            "Batch finished: {} downloaded, {} present, {} missing, {} failed",
            report.downloaded,
            report.found + report.skipped,
            report.missing,
            report.failed
        );
        Ok(report)
    }

    /// Run one track through the state machine.
    async fn process_track(
        &self,
        track: &mut Track,
        position: usize,
        total: usize,
        placement: &Placement,
    ) -> AcquisitionOutcome {
        if track.is_downloaded() {
            let mut outcome = AcquisitionOutcome::new(&track.id, TrackState::Resolved);
            outcome.path = track.resolved_path().cloned();
            return outcome;
        }

        if self.cancel.is_cancelled() {
            return AcquisitionOutcome::new(&track.id, TrackState::Cancelled);
        }

        tracing::info!("[{}/{}] {} - {}", position, total, track.title, track.artists);

        if let MatchResult::Found {
            path,
            location_label,
        } = self.find_existing(track, position, placement).await
        {
            tracing::info!("Already present ({}): {:?}", location_label, path);
            track.mark_resolved(&path);
            let mut outcome = AcquisitionOutcome::new(&track.id, TrackState::Found);
            outcome.path = Some(path);
            return outcome;
        }

        if self.config.check_only {
            tracing::info!("Missing: {}", track.display_name());
            return AcquisitionOutcome::new(&track.id, TrackState::Missing);
        }

        let expected = placement.canonical_path(track, position);
        let dir = expected
            .parent()
            .map_or_else(|| placement.root().to_path_buf(), Path::to_path_buf);

        let mut outcome = AcquisitionOutcome::new(&track.id, TrackState::ExhaustedFailed);

        if let Err(e) = ensure_dir(&dir) {
            let message = format!("Cannot create {:?}: {}", dir, e);
            tracing::error!("{}", message);
            outcome.errors = self
                .config
                .services
                .iter()
                .map(|id| (id.clone(), message.clone()))
                .collect();
            return outcome;
        }

        for id in &self.config.services {
            match self.attempt(track, id, &dir).await {
                Ok(path) => {
                    self.finish_download(track, id, path, &expected, &mut outcome)
                        .await;
                    return outcome;
                }
                Err(BackendError::Cancelled) => {
                    tracing::info!("Cancelled: {}", track.display_name());
                    outcome.state = TrackState::Cancelled;
                    return outcome;
                }
                Err(e) => {
                    tracing::warn!("{} failed for {}: {}", id, track.display_name(), e);
                    outcome.errors.push((id.clone(), e.to_string()));
                }
            }
        }

        tracing::error!(
            "All services failed for {}: {}",
            track.display_name(),
            outcome.last_error().unwrap_or("no services tried")
        );
        outcome
    }

    /// Duplicate detection on the blocking pool; the ISRC scan reads files.
    async fn find_existing(
        &self,
        track: &Track,
        position: usize,
        placement: &Placement,
    ) -> MatchResult {
        let detector = Arc::clone(&self.detector);
        let track = track.clone();
        let placement = placement.clone();

        tokio::task::spawn_blocking(move || detector.resolve_existing(&track, position, &placement))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Duplicate check failed: {}", e);
                MatchResult::NotFound
            })
    }

    /// One isolated, time-bounded attempt with one backend.
    async fn attempt(
        &self,
        track: &Track,
        id: &BackendId,
        dir: &Path,
    ) -> std::result::Result<PathBuf, BackendError> {
        if self.cancel.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        if !track.has_isrc() {
            return Err(BackendError::MissingIsrc);
        }

        let settings = BackendSettings {
            timeout: self.config.backend_timeout,
        };
        let backend = self
            .registry
            .create(id, &settings)
            .ok_or_else(|| BackendError::Api(format!("Unknown service {}", id)))??;

        let request = AttemptRequest {
            isrc: track.isrc.trim(),
            title: &track.title,
            artist: &track.artists,
            album: &track.album,
            track_id: &track.id,
            output_dir: dir,
            cancel: &self.cancel,
        };

        tracing::debug!("Trying {} for {}", id, track.display_name());
        let timeout = self.config.backend_timeout;
        // A finished attempt wins over a cancel arriving in the same poll
        let path = tokio::select! {
            biased;
            result = tokio::time::timeout(timeout, backend.attempt(&request)) => match result {
                Ok(result) => result?,
                Err(_) => return Err(BackendError::Timeout(timeout.as_secs())),
            },
            _ = self.cancel.cancelled() => return Err(BackendError::Cancelled),
        };

        if !path.is_file() {
            return Err(BackendError::MissingFile(path));
        }
        Ok(path)
    }

    /// Move a delivered file into place, mark the track and enrich it.
    async fn finish_download(
        &self,
        track: &mut Track,
        id: &BackendId,
        delivered: PathBuf,
        expected: &Path,
        outcome: &mut AcquisitionOutcome,
    ) {
        let final_path = if delivered.as_path() == expected {
            delivered
        } else {
            let (src, dest) = (delivered.clone(), expected.to_path_buf());
            match tokio::task::spawn_blocking(move || move_into_place(&src, &dest)).await {
                Ok(Ok(())) => expected.to_path_buf(),
                Ok(Err(e)) => {
                    tracing::warn!("Could not rename {:?} to {:?}: {}", delivered, expected, e);
                    delivered
                }
                Err(e) => {
                    tracing::warn!("Move task for {:?} failed: {}", delivered, e);
                    delivered
                }
            }
        };

        track.mark_resolved(&final_path);
        tracing::info!("Downloaded via {}: {:?}", id, final_path);

        if let Some(enricher) = &self.enricher {
            match enricher.enrich(track, &final_path).await {
                Ok(fields) => tracing::debug!("Enriched {:?} ({} fields)", final_path, fields),
                Err(e) => tracing::warn!("Enrichment failed for {:?}: {}", final_path, e),
            }
        }

        outcome.state = TrackState::Succeeded;
        outcome.path = Some(final_path);
        outcome.backend_used = Some(id.clone());
    }
}
