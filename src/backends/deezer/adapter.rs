//! Adapter layer: Convert Deezer DTOs to tag values
//!
//! This is the ONLY place where Deezer DTO types are converted to crate
//! types.

use super::dto;
use crate::metadata::TrackTags;

/// Credited artists: every `Main` contributor, else the primary artist.
pub fn main_artists(track: &dto::TrackResponse) -> String {
    let main: Vec<&str> = track
        .contributors
        .iter()
        .filter(|c| c.role == "Main" && !c.name.is_empty())
        .map(|c| c.name.as_str())
        .collect();

    if !main.is_empty() {
        return main.join(", ");
    }

    track
        .artist
        .as_ref()
        .map(|a| a.name.clone())
        .unwrap_or_default()
}

/// Largest available cover URL.
pub fn cover_url(track: &dto::TrackResponse) -> Option<&str> {
    let album = track.album.as_ref()?;
    album
        .cover_xl
        .as_deref()
        .or(album.cover_big.as_deref())
        .filter(|url| !url.is_empty())
}

/// Tags to embed into the downloaded file.
pub fn to_track_tags(track: &dto::TrackResponse) -> TrackTags {
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    let artists = main_artists(track);

    TrackTags {
        title: non_empty(&track.title),
        artist: non_empty(&artists),
        album: track.album.as_ref().and_then(|a| non_empty(&a.title)),
        date: non_empty(&track.release_date),
        track_number: track.track_position.filter(|n| *n > 0),
        disc_number: track.disk_number.filter(|n| *n > 0),
        isrc: non_empty(&track.isrc),
        lyrics: None,
        cover: None,
    }
}
