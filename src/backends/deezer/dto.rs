//! Deezer and link-resolver API Data Transfer Objects
//!
//! These types match what the two services return. Everything not needed
//! for a download is left out; serde ignores unknown fields.
//! DO NOT use these types outside the deezer module - convert them in
//! adapter.rs.
//!
//! API Reference: https://developers.deezer.com/api/track

use serde::Deserialize;

/// `GET /2.0/track/isrc:{isrc}` response.
///
/// Deezer answers HTTP 200 with an `error` object when nothing matches,
/// so every field has a default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackResponse {
    pub id: Option<u64>,
    pub title: String,
    /// Duration in seconds
    pub duration: u64,
    pub track_position: Option<u32>,
    pub disk_number: Option<u32>,
    pub isrc: String,
    pub release_date: String,
    pub artist: Option<Artist>,
    pub contributors: Vec<Contributor>,
    pub album: Option<Album>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Artist {
    pub id: Option<u64>,
    pub name: String,
}

/// One credited artist with their role (`"Main"`, `"Featured"`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Contributor {
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Album {
    pub id: Option<u64>,
    pub title: String,
    pub cover_xl: Option<String>,
    pub cover_big: Option<String>,
}

/// Error payload embedded in an otherwise successful response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiError {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub code: Option<u32>,
}

/// `GET /dl/{track_id}` response from the link resolver
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinkResponse {
    pub success: bool,
    pub links: Links,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Links {
    pub flac: Option<String>,
}
