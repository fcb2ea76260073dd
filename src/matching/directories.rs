//! Fuzzy artist-folder discovery.
//!
//! Finds the directories under a library root that may hold a given
//! artist's files: the root itself (flat layouts), every top-level folder
//! whose name matches one of the artist's name variations, those folders'
//! immediate subfolders (artist/album nesting) and the usual compilation
//! folders.
//!
//! Matching ignores case, word order and the difference between `.`, `-`
//! and `_`, so `"DJ Shadow"` finds `DJ_Shadow`, `dj-shadow` and `DJ.SHADOW`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use walkdir::WalkDir;

use super::variations::{extract_variations, normalize};

/// Folder names used for multi-artist releases, checked at the root.
pub const COMPILATION_FOLDERS: [&str; 4] = ["Various Artists", "Compilations", "VA", "Compilation"];

/// Characters treated as interchangeable inside artist names.
const SEPARATOR_CHARS: [char; 3] = ['.', '-', '_'];
const SEPARATOR_CLASS: &str = r"[._\-]";
/// What may sit on either side of a word for it to count as a whole word.
const BOUNDARY_BEFORE: &str = r"(?:^|[\s._\-])";
const BOUNDARY_AFTER: &str = r"(?:[\s._\-]|$)";

/// Case-insensitive matcher requiring every word of an artist name to
/// appear as a whole word, in any order.
#[derive(Debug, Clone)]
pub struct ArtistPattern {
    words: Vec<Regex>,
}

impl ArtistPattern {
    /// Build a pattern for one artist-name variation.
    ///
    /// Returns `None` for names without words or when a word pattern fails
    /// to compile; callers skip that variation.
    pub fn new(artist: &str) -> Option<Self> {
        let words = artist
            .split_whitespace()
            .map(|word| {
                let pattern = format!(
                    "{}{}{}",
                    BOUNDARY_BEFORE,
                    flexible_word(&normalize(word)),
                    BOUNDARY_AFTER
                );
                RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .unicode(true)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>();

        match words {
            Ok(words) if !words.is_empty() => Some(Self { words }),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("Skipping artist variation {:?}: {}", artist, e);
                None
            }
        }
    }

    /// Whether a (normalized) directory name matches every word.
    pub fn is_match(&self, name: &str) -> bool {
        self.words.iter().all(|word| word.is_match(name))
    }
}

/// Escape a word literally, except that `.`, `-` and `_` match each other.
fn flexible_word(word: &str) -> String {
    let mut pattern = String::with_capacity(word.len() * 2);
    for c in word.chars() {
        if SEPARATOR_CHARS.contains(&c) {
            pattern.push_str(SEPARATOR_CLASS);
        } else {
            pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        }
    }
    pattern
}

/// Ordered, de-duplicated list of existing directories worth scanning for
/// `artist`'s files under `root`. `root` itself always comes first.
///
/// Listing failures are logged and skipped so a single unreadable folder
/// never aborts the search.
pub fn find_candidate_directories(root: &Path, artist: &str) -> Vec<PathBuf> {
    let mut candidates = CandidateList::default();
    if !root.is_dir() {
        return candidates.into_vec();
    }
    candidates.push(root.to_path_buf());

    let top_level = list_subdirectories(root);

    for variation in extract_variations(artist) {
        let Some(pattern) = ArtistPattern::new(&variation) else {
            continue;
        };

        for dir in &top_level {
            let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if pattern.is_match(&normalize(name)) {
                candidates.push(dir.clone());
                candidates.extend(list_subdirectories(dir));
            }
        }
    }

    for folder in COMPILATION_FOLDERS {
        let path = root.join(folder);
        if path.is_dir() {
            candidates.push(path.clone());
            candidates.extend(list_subdirectories(&path));
        }
    }

    candidates.into_vec()
}

/// Immediate subdirectories of `dir`, sorted by name.
fn list_subdirectories(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("Skipping unreadable entry under {:?}: {}", dir, e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .collect()
}

/// Insertion-ordered set of paths.
#[derive(Default)]
struct CandidateList {
    seen: HashSet<PathBuf>,
    ordered: Vec<PathBuf>,
}

impl CandidateList {
    fn push(&mut self, path: PathBuf) {
        if self.seen.insert(path.clone()) {
            self.ordered.push(path);
        }
    }

    fn extend(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        for path in paths {
            self.push(path);
        }
    }

    fn into_vec(self) -> Vec<PathBuf> {
        self.ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn mkdirs(root: &Path, dirs: &[&str]) {
        for dir in dirs {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
    }

    #[test]
    fn test_pattern_ignores_separators_and_case() {
        let pattern = ArtistPattern::new("DJ Shadow").unwrap();
        assert!(pattern.is_match("DJ Shadow"));
        assert!(pattern.is_match("DJ_Shadow"));
        assert!(pattern.is_match("dj-shadow"));
        assert!(pattern.is_match("DJ.SHADOW"));
        assert!(pattern.is_match("Shadow DJ"));
        assert!(pattern.is_match("DJ Shadow - Endtroducing"));
        assert!(!pattern.is_match("DJShadow"));
        assert!(!pattern.is_match("DJ Shadows"));
    }

    #[test]
    fn test_pattern_punctuation_inside_words() {
        let pattern = ArtistPattern::new("R.A.D.").unwrap();
        assert!(pattern.is_match("R.A.D."));
        assert!(pattern.is_match("R_A_D_"));
        assert!(pattern.is_match("r-a-d-"));
        assert!(!pattern.is_match("RAD"));
    }

    #[test]
    fn test_pattern_escapes_regex_metacharacters() {
        let pattern = ArtistPattern::new("Sunn O)))").unwrap();
        assert!(pattern.is_match("Sunn O)))"));
        assert!(!pattern.is_match("Sunn O"));

        let pattern = ArtistPattern::new("P!nk").unwrap();
        assert!(pattern.is_match("p!nk"));
    }

    #[test]
    fn test_pattern_unicode_case() {
        let pattern = ArtistPattern::new("Ляпис Трубецкой").unwrap();
        assert!(pattern.is_match("ляпис_трубецкой"));
    }

    #[test]
    fn test_pattern_needs_words() {
        assert!(ArtistPattern::new("   ").is_none());
    }

    #[test]
    fn test_finds_punctuated_artist_folder() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        mkdirs(root, &["DJ_Shadow/Endtroducing", "Someone Else/Album"]);

        let dirs = find_candidate_directories(root, "DJ Shadow");
        assert_eq!(
            dirs,
            vec![
                root.to_path_buf(),
                root.join("DJ_Shadow"),
                root.join("DJ_Shadow").join("Endtroducing"),
            ]
        );
    }

    #[test]
    fn test_matches_any_variation() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        mkdirs(root, &["years-and-years", "Years & Years/Communion", "TEYA"]);

        let dirs = find_candidate_directories(root, "Olly Alexander (Years & Years)");
        assert!(dirs.contains(&root.join("Years & Years")));
        assert!(dirs.contains(&root.join("Years & Years").join("Communion")));
        assert!(!dirs.contains(&root.join("TEYA")));
    }

    #[test]
    fn test_includes_compilation_folders() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        mkdirs(root, &["Various Artists/Now 42", "VA", "Unrelated"]);

        let dirs = find_candidate_directories(root, "Nobody");
        assert_eq!(
            dirs,
            vec![
                root.to_path_buf(),
                root.join("Various Artists"),
                root.join("Various Artists").join("Now 42"),
                root.join("VA"),
            ]
        );
    }

    #[test]
    fn test_candidates_are_deduplicated() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        // Matched by both the "Shadow" and the "DJ Shadow" variation
        mkdirs(root, &["DJ Shadow/Endtroducing"]);

        let dirs = find_candidate_directories(root, "Shadow, DJ Shadow");
        let unique: HashSet<_> = dirs.iter().collect();
        assert_eq!(unique.len(), dirs.len());
        assert_eq!(dirs.len(), 3);
    }

    #[test]
    fn test_files_are_not_candidates() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("DJ Shadow.flac"), b"not a dir").unwrap();

        let dirs = find_candidate_directories(root, "DJ Shadow");
        assert_eq!(dirs, vec![root.to_path_buf()]);
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let temp = tempdir().unwrap();
        let dirs = find_candidate_directories(&temp.path().join("nope"), "DJ Shadow");
        assert!(dirs.is_empty());
    }
}
