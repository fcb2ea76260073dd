//! M3U8 playlist emission for album and playlist batches.
//!
//! The playlist is written next to the batch's files and references them
//! with relative paths. Tracks found somewhere other than their canonical
//! path (ISRC scan, failed rename) are referenced where they actually are.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::TrackList;
use crate::organizer::{Placement, sanitize_component};

/// What happened when a playlist was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistOutcome {
    Written(PathBuf),
    /// Check-only run with tracks missing; nothing was written
    Incomplete { missing: usize, total: usize },
    /// Single tracks get no playlist
    NotApplicable,
}

/// One playlist line pair.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    duration_secs: u64,
    label: String,
    location: String,
}

/// Write `{batch name}.m3u8` into the batch folder.
///
/// In check-only mode the file is only written when every track exists.
pub fn write_m3u8(
    batch: &TrackList,
    placement: &Placement,
    check_only: bool,
) -> io::Result<PlaylistOutcome> {
    if !batch.is_collection() {
        return Ok(PlaylistOutcome::NotApplicable);
    }

    let root = placement.root();
    let mut entries = Vec::with_capacity(batch.len());
    let mut missing = 0;

    for (index, track) in batch.tracks.iter().enumerate() {
        let path = match track.resolved_path() {
            Some(path) if path.exists() => path.clone(),
            _ => placement.canonical_path(track, index + 1),
        };
        if !path.exists() {
            missing += 1;
        }

        entries.push(Entry {
            duration_secs: track.duration_ms / 1000,
            label: format!("{} - {}", track.artists, track.title),
            location: relative_location(root, &path),
        });
    }

    if check_only && missing > 0 {
        tracing::info!(
            "Playlist incomplete: missing {} of {} tracks, not created",
            missing,
            batch.len()
        );
        return Ok(PlaylistOutcome::Incomplete {
            missing,
            total: batch.len(),
        });
    }

    crate::organizer::ensure_dir(root)?;
    let path = root.join(format!("{}.m3u8", sanitize_component(batch.name.trim())));
    std::fs::write(&path, render(&entries))?;

    tracing::info!("Playlist created: {:?}", path);
    Ok(PlaylistOutcome::Written(path))
}

fn render(entries: &[Entry]) -> String {
    let mut out = String::from("#EXTM3U\n");
    for entry in entries {
        let _ = writeln!(out, "#EXTINF:{},{}", entry.duration_secs, entry.label);
        let _ = writeln!(out, "{}", entry.location);
    }
    out
}

/// `path` relative to `root` with `/` separators, or absolute when outside.
fn relative_location(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.display().to_string(),
    }
}
