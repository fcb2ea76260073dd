//! Deezer download backend.
//!
//! Resolves the ISRC through the Deezer API, fetches a FLAC link from the
//! link resolver, streams the file and embeds Deezer's tags and cover.
//! The file only appears under its final name once it is fully tagged.

mod adapter;
mod client;
pub mod dto;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{AttemptRequest, BackendSettings, DownloadBackend, safe_file_name};
use crate::error::BackendError;
use crate::metadata::write_tags;

pub use client::DeezerClient;

/// Registry identifier.
pub const BACKEND_ID: &str = "deezer";

/// Deezer [`DownloadBackend`].
pub struct DeezerBackend {
    client: DeezerClient,
}

impl DeezerBackend {
    pub fn new(settings: &BackendSettings) -> Result<Self, BackendError> {
        Ok(Self {
            client: DeezerClient::new(settings.timeout)?,
        })
    }

    pub fn with_client(client: DeezerClient) -> Self {
        Self { client }
    }

    /// Embed Deezer's metadata and cover. Failures only cost the tags.
    async fn embed_metadata(&self, track: &dto::TrackResponse, path: &Path) {
        let mut tags = adapter::to_track_tags(track);

        if let Some(url) = adapter::cover_url(track) {
            match self.client.fetch_cover(url).await {
                Ok(cover) => tags.cover = Some(cover),
                Err(e) => tracing::warn!("Cover download failed for {:?}: {}", path, e),
            }
        }

        let target = path.to_path_buf();
        match tokio::task::spawn_blocking(move || write_tags(&target, &tags)).await {
            Ok(Ok(result)) => {
                tracing::debug!("Embedded {} tag fields in {:?}", result.fields_updated, path)
            }
            Ok(Err(e)) => tracing::warn!("Tagging failed for {:?}: {:#}", path, e),
            Err(e) => tracing::warn!("Tagging task failed for {:?}: {}", path, e),
        }
    }
}

#[async_trait]
impl DownloadBackend for DeezerBackend {
    async fn attempt(&self, request: &AttemptRequest<'_>) -> Result<PathBuf, BackendError> {
        let track = self.client.track_by_isrc(request.isrc).await?;
        let track_id = track
            .id
            .ok_or_else(|| BackendError::NoMatch(request.isrc.to_string()))?;

        let artists = adapter::main_artists(&track);
        let artist = if artists.is_empty() { request.artist } else { &artists };
        let title = if track.title.is_empty() { request.title } else { &track.title };
        tracing::info!("Deezer match: {} - {} (id {})", artist, title, track_id);

        let link = self.client.flac_link(track_id).await?;
        let destination = request
            .output_dir
            .join(safe_file_name(artist, title, request.track_id));
        let partial = self
            .client
            .download_partial(&link, &destination, request.cancel)
            .await?;

        // Tagged under the .part name: an abandoned attempt leaves nothing
        self.embed_metadata(&track, partial.path()).await;
        partial.persist().await
    }
}
