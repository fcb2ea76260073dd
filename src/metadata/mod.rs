//! Audio file tag reading and writing.
//!
//! Uses the lofty crate for format-independent metadata access. The only
//! tag the acquisition engine depends on is the ISRC, which is how files
//! that were downloaded earlier are recognized regardless of their name.
//!
//! # Features
//! - Read the embedded ISRC of a file
//! - Write catalog metadata (title, artists, album, date, numbering, ISRC)
//! - Embed lyrics and a front cover

use anyhow::{Context, Result};
use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag, TagExt};
use std::path::Path;

use crate::model::Track;

/// Read the first ISRC value embedded in a file, if any, exactly as stored.
///
/// The format is detected from the content, so partial downloads without
/// an audio extension can be read too.
pub fn read_isrc(path: &Path) -> Result<Option<String>> {
    let tagged_file = Probe::open(path)
        .context("Failed to open file for probing")?
        .guess_file_type()
        .context("Failed to detect file type")?
        .read()
        .context("Failed to read file metadata")?;

    let isrc = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
        .and_then(|tag| tag.get_string(&ItemKey::Isrc))
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(isrc)
}

/// Cover image to embed as the front cover.
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Tag values to write into a file. `None`/empty fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Full release date, written as the recording date
    pub date: Option<String>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub isrc: Option<String>,
    pub lyrics: Option<String>,
    pub cover: Option<CoverImage>,
}

impl From<&Track> for TrackTags {
    fn from(track: &Track) -> Self {
        let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
        Self {
            title: non_empty(&track.title),
            artist: non_empty(&track.artists),
            album: non_empty(&track.album),
            date: non_empty(&track.release_date),
            track_number: (track.track_number > 0).then_some(track.track_number),
            disc_number: None,
            isrc: non_empty(&track.isrc),
            lyrics: None,
            cover: None,
        }
    }
}

/// Result of a write operation
#[derive(Debug, Clone)]
pub struct WriteResult {
    /// Number of fields that were updated
    pub fields_updated: usize,
}

/// Write tags into an audio file, creating the format's primary tag if needed.
pub fn write_tags(path: &Path, tags: &TrackTags) -> Result<WriteResult> {
    let mut tagged_file = Probe::open(path)
        .context("Failed to open file for writing")?
        .guess_file_type()
        .context("Failed to detect file type")?
        .read()
        .context("Failed to read file for tag writing")?;

    let tag_type = tagged_file.primary_tag_type();
    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }
    let tag = tagged_file
        .tag_mut(tag_type)
        .context("Primary tag missing after insert")?;

    let mut fields_updated = 0;

    if let Some(ref title) = tags.title {
        tag.set_title(title.clone());
        fields_updated += 1;
    }
    if let Some(ref artist) = tags.artist {
        tag.set_artist(artist.clone());
        fields_updated += 1;
    }
    if let Some(ref album) = tags.album {
        tag.set_album(album.clone());
        fields_updated += 1;
    }
    if let Some(track_number) = tags.track_number {
        tag.set_track(track_number);
        fields_updated += 1;
    }
    if let Some(disc_number) = tags.disc_number {
        tag.set_disk(disc_number);
        fields_updated += 1;
    }
    if let Some(ref date) = tags.date {
        tag.insert_text(ItemKey::RecordingDate, date.clone());
        fields_updated += 1;
    }
    if let Some(ref isrc) = tags.isrc {
        tag.insert_text(ItemKey::Isrc, isrc.clone());
        fields_updated += 1;
    }
    if let Some(ref lyrics) = tags.lyrics {
        tag.insert_text(ItemKey::Lyrics, lyrics.clone());
        fields_updated += 1;
    }
    if let Some(ref cover) = tags.cover {
        tag.remove_picture_type(PictureType::CoverFront);
        tag.push_picture(Picture::new_unchecked(
            PictureType::CoverFront,
            Some(MimeType::from_str(&cover.mime_type)),
            Some("Cover".to_string()),
            cover.data.clone(),
        ));
        fields_updated += 1;
    }

    tag.save_to_path(path, WriteOptions::default())
        .context("Failed to write tags to file")?;

    Ok(WriteResult { fields_updated })
}
