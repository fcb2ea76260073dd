//! Debug helpers for the duplicate detector.

use std::path::Path;

use crate::matching::{extract_variations, find_by_isrc, find_candidate_directories};

/// Print the variations derived from an artist credit
pub fn cmd_variations(artist: &str) -> anyhow::Result<()> {
    let variations = extract_variations(artist);
    if variations.is_empty() {
        println!("No variations for {:?}", artist);
        return Ok(());
    }

    for (i, variation) in variations.iter().enumerate() {
        println!("{}. {}", i + 1, variation);
    }
    Ok(())
}

/// Search the candidate folders for `artist` for a file carrying `isrc`
pub fn cmd_locate(output_dir: &Path, artist: &str, isrc: &str) -> anyhow::Result<()> {
    if !output_dir.is_dir() {
        anyhow::bail!("Not a directory: {:?}", output_dir);
    }

    let candidates = find_candidate_directories(output_dir, artist);
    println!("Searching {} folders for ISRC {}", candidates.len(), isrc);

    for dir in &candidates {
        if let Some(path) = find_by_isrc(dir, isrc) {
            println!("Found: {}", path.display());
            return Ok(());
        }
        tracing::debug!("Not in {:?}", dir);
    }

    println!("Not found");
    Ok(())
}
