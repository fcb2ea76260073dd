//! Core data models for track acquisition.
//!
//! Defines [`Track`] (one unit of acquisition), [`MatchResult`] (what the
//! duplicate detector found on disk) and [`AcquisitionOutcome`] (the
//! per-track terminal result of a run).

use std::path::PathBuf;

use crate::backends::BackendId;

/// One track to acquire, as resolved from the music catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Track {
    /// Catalog track ID (last segment of the external URL)
    pub id: String,
    /// Opaque catalog reference (URL)
    pub external_ref: String,
    pub title: String,
    /// Artist credit, possibly several artists in one string
    pub artists: String,
    pub album: String,
    /// Track number on the album, 0 when unknown
    pub track_number: u32,
    pub duration_ms: u64,
    /// International Standard Recording Code, empty when the catalog has none
    pub isrc: String,
    /// Release date as given by the catalog (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`)
    pub release_date: String,
    downloaded: bool,
    resolved_path: Option<PathBuf>,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>, artists: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artists: artists.into(),
            ..Default::default()
        }
    }

    /// Whether the audio file is known to exist on disk.
    pub fn is_downloaded(&self) -> bool {
        self.downloaded
    }

    /// Where the audio file actually lives, once found or placed.
    pub fn resolved_path(&self) -> Option<&PathBuf> {
        self.resolved_path.as_ref()
    }

    /// Record where the file for this track lives.
    ///
    /// Transitions at most once; later calls are ignored so a resolved
    /// track is never re-pointed.
    pub fn mark_resolved(&mut self, path: impl Into<PathBuf>) {
        if self.downloaded {
            tracing::debug!("Track {} already resolved, ignoring new path", self.id);
            return;
        }
        self.downloaded = true;
        self.resolved_path = Some(path.into());
    }

    pub fn has_isrc(&self) -> bool {
        !self.isrc.trim().is_empty()
    }

    /// `"title - artists"`, used in logs and playlist entries.
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.title, self.artists)
    }
}

/// What kind of catalog object a track list was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    #[default]
    Track,
    Album,
    Playlist,
}

/// The ordered set of tracks one acquisition run works through.
#[derive(Debug, Clone, Default)]
pub struct TrackList {
    pub kind: CollectionKind,
    /// Album or playlist name; `"title - artists"` for a single track
    pub name: String,
    pub tracks: Vec<Track>,
}

impl TrackList {
    /// Albums and playlists get their own folder and may get a playlist file.
    pub fn is_collection(&self) -> bool {
        self.kind != CollectionKind::Track
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Where an existing copy of a track was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    NotFound,
    Found {
        path: PathBuf,
        /// Human-readable origin: `"exact match"`, `"root"` or the
        /// containing folder's name
        location_label: String,
    },
}

impl MatchResult {
    pub fn found(path: impl Into<PathBuf>, location_label: impl Into<String>) -> Self {
        Self::Found {
            path: path.into(),
            location_label: location_label.into(),
        }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Found { path, .. } => Some(path),
            Self::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// How a track left the acquisition state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    /// Already marked downloaded before this run touched it
    Resolved,
    /// An existing copy was found on disk
    Found,
    /// Check-only run and no copy exists
    Missing,
    /// A backend delivered the file
    Succeeded,
    /// Every configured backend failed
    ExhaustedFailed,
    /// The run was cancelled before this track finished
    Cancelled,
}

/// Per-track terminal result.
#[derive(Debug, Clone)]
pub struct AcquisitionOutcome {
    pub track_id: String,
    pub state: TrackState,
    /// Final file location when the track is present on disk
    pub path: Option<PathBuf>,
    /// Backend that delivered the file, if it came from the network
    pub backend_used: Option<BackendId>,
    /// Every backend that was tried and failed, in order
    pub errors: Vec<(BackendId, String)>,
}

impl AcquisitionOutcome {
    pub fn new(track_id: impl Into<String>, state: TrackState) -> Self {
        Self {
            track_id: track_id.into(),
            state,
            path: None,
            backend_used: None,
            errors: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(
            self.state,
            TrackState::Resolved | TrackState::Found | TrackState::Succeeded
        )
    }

    /// The error to report for an exhausted track.
    pub fn last_error(&self) -> Option<&str> {
        self.errors.last().map(|(_, msg)| msg.as_str())
    }
}

/// A track that no backend could deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTrack {
    pub title: String,
    pub artists: String,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_resolved_transitions_once() {
        let mut track = Track::new("abc", "Title", "Artist");
        assert!(!track.is_downloaded());

        track.mark_resolved("/music/first.flac");
        track.mark_resolved("/music/second.flac");

        assert!(track.is_downloaded());
        assert_eq!(
            track.resolved_path(),
            Some(&PathBuf::from("/music/first.flac"))
        );
    }

    #[test]
    fn test_has_isrc_ignores_whitespace() {
        let mut track = Track::default();
        assert!(!track.has_isrc());
        track.isrc = "   ".to_string();
        assert!(!track.has_isrc());
        track.isrc = "USAT22409172".to_string();
        assert!(track.has_isrc());
    }

    #[test]
    fn test_outcome_success_states() {
        assert!(AcquisitionOutcome::new("a", TrackState::Found).succeeded());
        assert!(AcquisitionOutcome::new("a", TrackState::Succeeded).succeeded());
        assert!(!AcquisitionOutcome::new("a", TrackState::Missing).succeeded());
        assert!(!AcquisitionOutcome::new("a", TrackState::ExhaustedFailed).succeeded());
    }

    #[test]
    fn test_match_result_accessors() {
        let found = MatchResult::found("/music/a.flac", "root");
        assert!(found.is_found());
        assert_eq!(found.path(), Some(&PathBuf::from("/music/a.flac")));
        assert_eq!(MatchResult::NotFound.path(), None);
    }
}
