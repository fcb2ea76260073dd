//! Post-download enrichment: tags and lyrics.
//!
//! Runs after a backend delivered a file and it reached its canonical
//! path. Enrichment is best effort: the orchestrator logs failures as
//! warnings and the track stays successful, since the audio is on disk.
//!
//! # Architecture
//!
//! - [`Enricher`] - what the orchestrator calls, with the final path
//! - [`TagEnricher`] - writes catalog metadata via lofty
//! - [`LyricsSource`] - optional pluggable lyrics provider for [`TagEnricher`]
//!
//! Lyrics retrieval itself lives outside this crate. [`LyricsSource`] is the
//! boundary an embedding application implements; the bundled CLI installs
//! no provider, so files get catalog tags only.
//!
//! # Usage
//!
//! ```ignore
//! let enricher = TagEnricher::new().with_lyrics(Arc::new(my_lyrics_source));
//! enricher.enrich(&track, Path::new("Artist/Album/Song.flac")).await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::metadata::{TrackTags, write_tags};
use crate::model::Track;

/// Errors that can occur during enrichment
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Failed to write tags: {0}")]
    Tagging(String),

    #[error("Lyrics lookup failed: {0}")]
    Lyrics(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

/// Something that improves a freshly acquired file.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Enrich the file at `path` (the canonical path) for `track`.
    ///
    /// Returns the number of fields written.
    async fn enrich(&self, track: &Track, path: &Path) -> Result<usize, EnrichmentError>;
}

/// Lyrics provider, supplied by the embedding application.
///
/// Implement this trait to create mock implementations for testing.
#[async_trait]
pub trait LyricsSource: Send + Sync {
    /// Lyrics for a track, `None` when the provider has none.
    async fn lyrics(&self, track: &Track) -> Result<Option<String>, EnrichmentError>;
}

/// Writes the catalog's metadata (and optionally lyrics) into the file.
#[derive(Clone, Default)]
pub struct TagEnricher {
    lyrics: Option<Arc<dyn LyricsSource>>,
}

impl TagEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also embed lyrics from `source`.
    pub fn with_lyrics(mut self, source: Arc<dyn LyricsSource>) -> Self {
        self.lyrics = Some(source);
        self
    }
}

#[async_trait]
impl Enricher for TagEnricher {
    async fn enrich(&self, track: &Track, path: &Path) -> Result<usize, EnrichmentError> {
        let mut tags = TrackTags::from(track);

        if let Some(source) = &self.lyrics {
            match source.lyrics(track).await {
                Ok(Some(lyrics)) if !lyrics.trim().is_empty() => tags.lyrics = Some(lyrics),
                Ok(_) => tracing::debug!("No lyrics for {}", track.display_name()),
                // Missing lyrics never block the remaining tags
                Err(e) => tracing::warn!("Lyrics for {}: {}", track.display_name(), e),
            }
        }

        let target = path.to_path_buf();
        let result = tokio::task::spawn_blocking(move || write_tags(&target, &tags))
            .await
            .map_err(|e| EnrichmentError::Task(e.to_string()))?
            .map_err(|e| EnrichmentError::Tagging(format!("{:#}", e)))?;

        Ok(result.fields_updated)
    }
}

impl std::fmt::Debug for TagEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagEnricher")
            .field("lyrics", &self.lyrics.is_some())
            .finish()
    }
}
