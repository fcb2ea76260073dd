//! Canonical file placement.
//!
//! Computes where a track's file belongs under the output root based on
//! the placement settings: `{output}/{Artist}/{Album}/{filename}.flac`
//! with either subfolder optional, plus moving downloaded files there.
//!
//! # Features
//! - Artist folder picked from the most specific single-artist name
//! - Albums with several distinct artists go under `Various Artists`
//! - Album/playlist batches without subfolders get their own folder
//! - Cross-device safe moves

pub mod template;

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::matching::variations::extract_variations;
use crate::model::{Track, TrackList};

pub use template::{DEFAULT_TEMPLATE, render_filename, sanitize_component};

/// Folder used for multi-artist albums when both subfolders are enabled.
pub const VARIOUS_ARTISTS: &str = "Various Artists";

const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// How files are laid out under the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementConfig {
    pub output_dir: PathBuf,
    /// Filename template or preset name (see [`template`])
    pub filename_format: String,
    pub artist_subfolders: bool,
    pub album_subfolders: bool,
}

impl PlacementConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            filename_format: DEFAULT_TEMPLATE.to_string(),
            artist_subfolders: false,
            album_subfolders: false,
        }
    }

    pub fn uses_subfolders(&self) -> bool {
        self.artist_subfolders || self.album_subfolders
    }
}

/// Placement rules bound to one batch of tracks.
///
/// The batch matters because the root folder depends on whether it is an
/// album/playlist, and the various-artists decision looks at every track
/// sharing an album.
#[derive(Debug, Clone)]
pub struct Placement {
    config: PlacementConfig,
    root: PathBuf,
    various_artist_albums: HashSet<String>,
}

impl Placement {
    /// Bind placement rules to a batch. Does not touch the filesystem.
    pub fn for_batch(config: &PlacementConfig, batch: &TrackList) -> Self {
        let root = if batch.is_collection() && !config.uses_subfolders() {
            config
                .output_dir
                .join(sanitize_component(batch.name.trim()))
        } else {
            config.output_dir.clone()
        };

        let various_artist_albums = if config.artist_subfolders && config.album_subfolders {
            batch
                .tracks
                .iter()
                .map(|t| t.album.as_str())
                .filter(|album| !album.is_empty())
                .collect::<HashSet<_>>()
                .into_iter()
                .filter(|album| is_various_artists_album(&batch.tracks, album))
                .map(str::to_string)
                .collect()
        } else {
            HashSet::new()
        };

        Self {
            config: config.clone(),
            root,
            various_artist_albums,
        }
    }

    /// Folder the batch is placed in (and where playlists are written).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configured output directory, above any batch folder.
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    pub fn uses_subfolders(&self) -> bool {
        self.config.uses_subfolders()
    }

    /// Directory a track's file belongs in.
    pub fn track_dir(&self, track: &Track) -> PathBuf {
        let mut dir = self.root.clone();

        if self.config.artist_subfolders {
            if self.various_artist_albums.contains(&track.album) {
                dir.push(VARIOUS_ARTISTS);
            } else {
                dir.push(artist_folder(&track.artists));
            }
        }

        if self.config.album_subfolders {
            let album = sanitize_component(&track.album);
            if !album.is_empty() {
                dir.push(album);
            }
        }

        dir
    }

    /// Rendered file name for a track at 1-based `position`.
    pub fn file_name(&self, track: &Track, position: usize) -> String {
        render_filename(&self.config.filename_format, track, position)
    }

    /// The canonical path: where this track's file is expected to live.
    pub fn canonical_path(&self, track: &Track, position: usize) -> PathBuf {
        self.track_dir(track).join(self.file_name(track, position))
    }
}

/// Pick the folder name for an artist credit.
///
/// Prefers the second variation (parenthetical alias or first credited
/// artist) over the full credit string.
pub fn artist_folder(artists: &str) -> String {
    let variations = extract_variations(artists);
    let name = variations
        .get(1)
        .or_else(|| variations.first())
        .map(|s| sanitize_component(s))
        .unwrap_or_default();

    if name.is_empty() {
        UNKNOWN_ARTIST.to_string()
    } else {
        name
    }
}

/// Whether an album in this batch is credited to more than one artist.
pub fn is_various_artists_album(tracks: &[Track], album: &str) -> bool {
    if album.is_empty() {
        return false;
    }

    let album_tracks: Vec<&Track> = tracks.iter().filter(|t| t.album == album).collect();
    if album_tracks.len() <= 1 {
        return false;
    }

    let unique_artists: HashSet<&str> = album_tracks
        .iter()
        .map(|t| t.artists.trim())
        .filter(|a| !a.is_empty())
        .collect();

    unique_artists.len() > 1
}

/// Create a directory and its parents; succeeds if another worker got there first.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Move a file to `destination`, falling back to copy + delete across devices.
pub fn move_into_place(source: &Path, destination: &Path) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        ensure_dir(parent)?;
    }

    if fs::rename(source, destination).is_err() {
        fs::copy(source, destination)?;
        fs::remove_file(source)?;
    }

    Ok(())
}
