//! Track-list loading.
//!
//! The music catalog is resolved elsewhere; this module reads its output,
//! a JSON document describing one track, album or playlist:
//!
//! ```json
//! {
//!   "kind": "album",
//!   "name": "Discovery",
//!   "release_date": "2001-03-12",
//!   "tracks": [
//!     {
//!       "external_url": "https://open.spotify.com/track/2VEZx7NWsZ1D0eJ4uv5Fym",
//!       "title": "Harder, Better, Faster, Stronger",
//!       "artists": "Daft Punk",
//!       "track_number": 4,
//!       "duration_ms": 224000,
//!       "isrc": "GBDUW0000059"
//!     }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::model::{CollectionKind, Track, TrackList};

/// Errors while loading a track list. All of them abort the batch.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read track list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid track list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Cannot resolve catalog reference {0:?}")]
    InvalidReference(String),

    #[error("Track list contains no tracks")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct RawTrackList {
    #[serde(default)]
    kind: CollectionKind,
    #[serde(default)]
    name: String,
    #[serde(default)]
    release_date: String,
    #[serde(default)]
    tracks: Vec<RawTrack>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTrack {
    external_url: String,
    title: String,
    artists: String,
    album: String,
    track_number: u32,
    duration_ms: u64,
    isrc: String,
    release_date: String,
}

/// Load a track list from a JSON file.
pub fn load(path: &Path) -> Result<TrackList, CatalogError> {
    let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    from_json(&json)
}

/// Parse a track list document.
///
/// Tracks repeating an earlier track's ID are dropped so each track is
/// processed by exactly one worker.
pub fn from_json(json: &str) -> Result<TrackList, CatalogError> {
    let raw: RawTrackList = serde_json::from_str(json)?;

    let mut seen = HashSet::new();
    let mut tracks = Vec::with_capacity(raw.tracks.len());

    for entry in raw.tracks {
        let id = track_id(&entry.external_url)?;
        if !seen.insert(id.clone()) {
            tracing::debug!("Dropping duplicate track {} ({})", id, entry.title);
            continue;
        }

        let mut track = Track::new(id, entry.title.trim(), entry.artists.trim());
        track.external_ref = entry.external_url;
        track.album = if entry.album.trim().is_empty() && raw.kind == CollectionKind::Album {
            raw.name.trim().to_string()
        } else {
            entry.album.trim().to_string()
        };
        track.track_number = entry.track_number;
        track.duration_ms = entry.duration_ms;
        track.isrc = entry.isrc.trim().to_string();
        track.release_date = if entry.release_date.is_empty() {
            raw.release_date.clone()
        } else {
            entry.release_date
        };
        tracks.push(track);
    }

    if tracks.is_empty() {
        return Err(CatalogError::Empty);
    }

    let name = match (raw.kind, tracks.as_slice()) {
        (CollectionKind::Track, [only]) => format!("{} - {}", only.title, only.artists),
        _ if raw.name.trim().is_empty() => tracks[0].album.clone(),
        _ => raw.name.trim().to_string(),
    };

    Ok(TrackList {
        kind: raw.kind,
        name,
        tracks,
    })
}

/// Track ID from an external reference: the last URL path segment or the
/// last `:`-separated part of a URI.
pub fn track_id(reference: &str) -> Result<String, CatalogError> {
    let without_query = reference
        .trim()
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');

    let id = without_query
        .rsplit(['/', ':'])
        .next()
        .unwrap_or_default()
        .trim();

    if id.is_empty() {
        return Err(CatalogError::InvalidReference(reference.to_string()));
    }
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ALBUM: &str = r#"{
        "kind": "album",
        "name": "Discovery",
        "release_date": "2001-03-12",
        "tracks": [
            {
                "external_url": "https://open.spotify.com/track/aaa111?si=xyz",
                "title": "One More Time",
                "artists": "Daft Punk",
                "track_number": 1,
                "duration_ms": 320000,
                "isrc": "GBDUW0000053"
            },
            {
                "external_url": "https://open.spotify.com/track/bbb222",
                "title": "Aerodynamic",
                "artists": "Daft Punk",
                "track_number": 2,
                "duration_ms": 212000,
                "isrc": "GBDUW0000054",
                "release_date": "2001-03-13"
            },
            {
                "external_url": "https://open.spotify.com/track/aaa111",
                "title": "One More Time (again)",
                "artists": "Daft Punk"
            }
        ]
    }"#;

    #[test]
    fn test_album_document() {
        let list = from_json(ALBUM).unwrap();
        assert_eq!(list.kind, CollectionKind::Album);
        assert_eq!(list.name, "Discovery");
        assert_eq!(list.len(), 2, "duplicate id dropped");

        let first = &list.tracks[0];
        assert_eq!(first.id, "aaa111");
        assert_eq!(first.album, "Discovery");
        assert_eq!(first.release_date, "2001-03-12");
        assert_eq!(first.title, "One More Time");
        assert!(!first.is_downloaded());

        assert_eq!(list.tracks[1].release_date, "2001-03-13");
    }

    #[test]
    fn test_single_track_named_after_title_and_artist() {
        let json = r#"{
            "kind": "track",
            "tracks": [{"external_url": "spotify:track:ccc333", "title": "Da Funk", "artists": "Daft Punk"}]
        }"#;
        let list = from_json(json).unwrap();
        assert_eq!(list.name, "Da Funk - Daft Punk");
        assert_eq!(list.tracks[0].id, "ccc333");
        assert!(!list.is_collection());
    }

    #[test]
    fn test_playlist_keeps_track_albums() {
        let json = r#"{
            "kind": "playlist",
            "name": "Road Trip",
            "tracks": [{"external_url": "https://x/track/1", "title": "A", "artists": "B", "album": "C"}]
        }"#;
        let list = from_json(json).unwrap();
        assert_eq!(list.name, "Road Trip");
        assert_eq!(list.tracks[0].album, "C");
    }

    #[test]
    fn test_unresolvable_reference() {
        let json = r#"{"tracks": [{"external_url": "", "title": "A", "artists": "B"}]}"#;
        assert!(matches!(
            from_json(json),
            Err(CatalogError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_empty_and_malformed() {
        assert!(matches!(from_json(r#"{"tracks": []}"#), Err(CatalogError::Empty)));
        assert!(matches!(from_json("{not json"), Err(CatalogError::Parse(_))));
        assert!(matches!(
            from_json(r#"{"kind": "podcast", "tracks": []}"#),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_track_id_forms() {
        assert_eq!(track_id("https://open.spotify.com/track/abc?si=1").unwrap(), "abc");
        assert_eq!(track_id("https://open.spotify.com/track/abc/").unwrap(), "abc");
        assert_eq!(track_id("spotify:track:abc").unwrap(), "abc");
        assert_eq!(track_id("abc").unwrap(), "abc");
        assert!(track_id("   ").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("tracks.json");
        std::fs::write(&path, ALBUM).unwrap();
        assert_eq!(load(&path).unwrap().len(), 2);

        let missing = load(&temp.path().join("nope.json"));
        assert!(matches!(missing, Err(CatalogError::Read { .. })));
    }
}
