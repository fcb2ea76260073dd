//! Deezer HTTP client
//!
//! Two services are involved: the public Deezer API resolves an ISRC to a
//! Deezer track, and a link resolver turns the track ID into a FLAC URL.
//! See: https://developers.deezer.com/api

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use super::dto;
use crate::error::BackendError;
use crate::metadata::CoverImage;

pub const DEFAULT_API_BASE: &str = "https://api.deezer.com/2.0";
pub const DEFAULT_LINK_BASE: &str = "https://api.deezmate.com";

const USER_AGENT: &str = concat!(
    "flac-hoard/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/flac-hoard)"
);

/// Deezer API client
pub struct DeezerClient {
    http_client: reqwest::Client,
    api_base: String,
    link_base: String,
}

impl DeezerClient {
    /// Create a client against the public services.
    pub fn new(timeout: Duration) -> Result<Self, BackendError> {
        Self::with_base_urls(timeout, DEFAULT_API_BASE, DEFAULT_LINK_BASE)
    }

    /// Create a client with custom base URLs (mirrors, tests).
    pub fn with_base_urls(
        timeout: Duration,
        api_base: impl Into<String>,
        link_base: impl Into<String>,
    ) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            link_base: link_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Look up a Deezer track by ISRC.
    pub async fn track_by_isrc(&self, isrc: &str) -> Result<dto::TrackResponse, BackendError> {
        let url = format!("{}/track/isrc:{}", self.api_base, urlencoding::encode(isrc));

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NoMatch(isrc.to_string()));
        }
        if !status.is_success() {
            return Err(BackendError::Api(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let track = response
            .json::<dto::TrackResponse>()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        if let Some(error) = &track.error {
            tracing::debug!("Deezer has no track for {}: {}", isrc, error.message);
            return Err(BackendError::NoMatch(isrc.to_string()));
        }
        if track.id.is_none() {
            return Err(BackendError::NoMatch(isrc.to_string()));
        }

        Ok(track)
    }

    /// Resolve a Deezer track ID to a FLAC download URL.
    pub async fn flac_link(&self, track_id: u64) -> Result<String, BackendError> {
        let url = format!("{}/dl/{}", self.link_base, track_id);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| BackendError::Api(e.to_string()))?;

        let links = response
            .json::<dto::LinkResponse>()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        if !links.success {
            return Err(BackendError::Api("Link resolver reported failure".to_string()));
        }

        links
            .links
            .flac
            .filter(|url| !url.is_empty())
            .ok_or_else(|| BackendError::Api("No FLAC link in response".to_string()))
    }

    /// Stream `url` into a `.part` file next to `destination`.
    ///
    /// The returned [`PartialDownload`] deletes the file when dropped, so a
    /// failed, cancelled or abandoned attempt leaves nothing behind. Call
    /// [`PartialDownload::persist`] once the file is ready.
    pub async fn download_partial(
        &self,
        url: &str,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<PartialDownload, BackendError> {
        let mut response = self
            .http_client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| BackendError::Api(e.to_string()))?;

        let mut partial = PartialDownload::new(destination);
        let mut file = tokio::fs::File::create(partial.path()).await?;

        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(BackendError::Cancelled),
                chunk = response.chunk() => chunk?,
            };
            match chunk {
                Some(bytes) => {
                    file.write_all(&bytes).await?;
                    partial.bytes += bytes.len() as u64;
                }
                None => break,
            }
        }

        file.flush().await?;
        drop(file);

        if partial.bytes == 0 {
            return Err(BackendError::MissingFile(destination.to_path_buf()));
        }

        tracing::debug!("Downloaded {} bytes to {:?}", partial.bytes, partial.path());
        Ok(partial)
    }

    /// Fetch cover art bytes.
    pub async fn fetch_cover(&self, url: &str) -> Result<CoverImage, BackendError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| BackendError::Api(e.to_string()))?;

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or("image/jpeg")
            .to_string();

        let data = response.bytes().await?.to_vec();
        Ok(CoverImage { data, mime_type })
    }
}

/// A finished download still under its `.part` name.
///
/// Removed on drop unless persisted.
#[derive(Debug)]
pub struct PartialDownload {
    part: PathBuf,
    destination: PathBuf,
    bytes: u64,
    persisted: bool,
}

impl PartialDownload {
    fn new(destination: &Path) -> Self {
        Self {
            part: destination.with_extension("flac.part"),
            destination: destination.to_path_buf(),
            bytes: 0,
            persisted: false,
        }
    }

    /// Where the data currently lives.
    pub fn path(&self) -> &Path {
        &self.part
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Rename to the final name and return it.
    pub async fn persist(mut self) -> Result<PathBuf, BackendError> {
        tokio::fs::rename(&self.part, &self.destination).await?;
        self.persisted = true;
        Ok(std::mem::take(&mut self.destination))
    }
}

impl Drop for PartialDownload {
    fn drop(&mut self) {
        if !self.persisted
            && let Err(e) = std::fs::remove_file(&self.part)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!("Failed to remove partial download {:?}: {}", self.part, e);
        }
    }
}
