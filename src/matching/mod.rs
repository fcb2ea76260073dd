//! Duplicate detection.
//!
//! Decides, before any network call, whether a track already exists under
//! the output directory. Two strategies run in order:
//!
//! 1. **Exact path**: the file the current placement settings would produce
//! 2. **ISRC scan**: fuzzy artist-folder discovery ([`directories`]) followed
//!    by an ISRC tag check of every audio file in those folders ([`isrc`])
//!
//! The scan recognizes files saved under an older naming scheme or with
//! different folder casing/punctuation. It only runs when the track has an
//! ISRC and subfolders are in use, since a flat layout is fully covered by
//! the exact-path check.

pub mod directories;
pub mod isrc;
pub mod variations;

use std::path::{Path, PathBuf};

use crate::model::{MatchResult, Track};
use crate::organizer::Placement;

pub use directories::find_candidate_directories;
pub use isrc::find_by_isrc;
pub use variations::extract_variations;

/// Label reported for a hit on the canonical path.
pub const EXACT_MATCH: &str = "exact match";
/// Label reported for an ISRC hit directly in the output directory.
pub const ROOT_LOCATION: &str = "root";

/// Filesystem operations behind the ISRC scan.
///
/// Implement this trait to observe or fake the scan in tests.
pub trait LibraryScan: Send + Sync {
    /// Directories that may hold `artist`'s files, in search order.
    fn candidate_directories(&self, root: &Path, artist: &str) -> Vec<PathBuf>;

    /// First file in `dir` tagged with `isrc`.
    fn find_by_isrc(&self, dir: &Path, isrc: &str) -> Option<PathBuf>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLibrary;

impl LibraryScan for FsLibrary {
    fn candidate_directories(&self, root: &Path, artist: &str) -> Vec<PathBuf> {
        find_candidate_directories(root, artist)
    }

    fn find_by_isrc(&self, dir: &Path, isrc: &str) -> Option<PathBuf> {
        find_by_isrc(dir, isrc)
    }
}

/// Finds existing copies of tracks under the output directory.
#[derive(Debug, Clone, Default)]
pub struct DuplicateDetector<S: LibraryScan = FsLibrary> {
    scanner: S,
}

impl DuplicateDetector<FsLibrary> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: LibraryScan> DuplicateDetector<S> {
    /// Create a detector with a custom scanner.
    pub fn with_scanner(scanner: S) -> Self {
        Self { scanner }
    }

    /// Look for an existing copy of the track at 1-based `position`.
    ///
    /// The canonical path is checked first and, when it holds a non-empty
    /// file, nothing else touches the filesystem.
    pub fn resolve_existing(
        &self,
        track: &Track,
        position: usize,
        placement: &Placement,
    ) -> MatchResult {
        let expected = placement.canonical_path(track, position);
        if is_non_empty_file(&expected) {
            return MatchResult::found(expected, EXACT_MATCH);
        }

        if !track.has_isrc() || !placement.uses_subfolders() {
            return MatchResult::NotFound;
        }

        let root = placement.output_dir();
        let isrc = track.isrc.as_str();

        for dir in self.scanner.candidate_directories(root, &track.artists) {
            if let Some(path) = self.scanner.find_by_isrc(&dir, isrc) {
                let label = location_label(root, &dir);
                tracing::debug!("ISRC {} found in {} ({:?})", isrc, label, path);
                return MatchResult::found(path, label);
            }
        }

        MatchResult::NotFound
    }
}

fn is_non_empty_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Name of the folder a match was found in, or `"root"` for the output root.
fn location_label(root: &Path, dir: &Path) -> String {
    if dir == root {
        return ROOT_LOCATION.to_string();
    }

    let root_name = root.file_name().and_then(|n| n.to_str());
    match dir.file_name().and_then(|n| n.to_str()) {
        Some(name) if !name.is_empty() && Some(name) != root_name => name.to_string(),
        _ => ROOT_LOCATION.to_string(),
    }
}
