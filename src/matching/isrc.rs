//! ISRC verification within a single directory.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::metadata::read_isrc;
use crate::organizer::template::AUDIO_EXTENSION;

/// First audio file directly inside `dir` whose embedded ISRC equals `isrc`.
///
/// The comparison is exact: case and surrounding whitespace both count.
/// Files are checked in name order; the earliest match wins even though
/// tags are read in parallel. Unreadable files count as non-matching.
pub fn find_by_isrc(dir: &Path, isrc: &str) -> Option<PathBuf> {
    if isrc.trim().is_empty() {
        return None;
    }

    let files = audio_files(dir);
    files.par_iter().find_map_first(|path| match read_isrc(path) {
        Ok(Some(found)) if found == isrc => Some(path.clone()),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Skipping {:?} during ISRC check: {}", path, e);
            None
        }
    })
}

/// Audio files directly inside `dir`, sorted by name.
fn audio_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Cannot list {:?}: {}", dir, e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_audio_extension(path))
        .collect();
    files.sort();
    files
}

fn has_audio_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(AUDIO_EXTENSION))
}
