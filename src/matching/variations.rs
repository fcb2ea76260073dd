//! Artist-name variations.
//!
//! Catalog artist credits encode collaborations inconsistently
//! (`"A, B"`, `"A feat. B"`, `"Alias (Group)"`). Folder matching and folder
//! naming both want a ranked list of likely single-artist names instead of
//! the raw credit, which is what [`extract_variations`] produces.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Separators tried in priority order; only the first one present is used.
const SEPARATORS: [&str; 6] = [", ", " feat. ", " ft. ", " featuring ", " & ", " and "];

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)").expect("valid parenthetical regex"));

/// Any parenthetical group in a split part, including one cut open by the split.
static PARENTHETICAL_REMAINDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\([^)]*(?:\)|$)|^[^(]*\)").expect("valid remainder regex")
});

/// Normalize to NFKC so visually identical names compare equal.
pub fn normalize(s: &str) -> String {
    s.nfkc().collect()
}

/// Ordered, duplicate-free artist-name candidates for an artist credit.
///
/// - `[0]` is always the full normalized credit
/// - `[1]` is the parenthetical content when there is one, otherwise the
///   first artist of the split
/// - the remaining entries follow in left-to-right order
///
/// ```ignore
/// assert_eq!(
///     extract_variations("Olly Alexander (Years & Years)"),
///     ["Olly Alexander (Years & Years)", "Years & Years", "Olly Alexander"],
/// );
/// ```
pub fn extract_variations(artist: &str) -> Vec<String> {
    let mut variations = Vec::new();
    if artist.is_empty() {
        return variations;
    }

    let artist = normalize(artist);
    push_unique(&mut variations, &artist);

    if let Some(caps) = PARENTHETICAL.captures(&artist) {
        push_unique(&mut variations, caps[1].trim());
        let start = caps.get(0).map_or(0, |m| m.start());
        push_unique(&mut variations, artist[..start].trim());
    }

    if let Some(separator) = SEPARATORS.iter().find(|sep| artist.contains(*sep)) {
        for part in artist.split(separator) {
            let part = PARENTHETICAL_REMAINDER.replace_all(part.trim(), "");
            push_unique(&mut variations, part.trim());
        }
    }

    variations
}

fn push_unique(variations: &mut Vec<String>, candidate: &str) {
    if !candidate.is_empty() && !variations.iter().any(|v| v == candidate) {
        variations.push(candidate.to_string());
    }
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn credit() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-zA-Z0-9 ().,&é]{1,40}").unwrap()
    }

    proptest! {
        /// The first variation is always the normalized input
        #[test]
        fn first_is_normalized_input(input in credit()) {
            let variations = extract_variations(&input);
            prop_assert_eq!(&variations[0], &normalize(&input));
        }

        /// No variation appears twice
        #[test]
        fn no_duplicates(input in credit()) {
            let variations = extract_variations(&input);
            let mut seen = std::collections::HashSet::new();
            for v in &variations {
                prop_assert!(seen.insert(v.clone()), "duplicate {:?} in {:?}", v, variations);
            }
        }

        /// Non-empty input never yields an empty list
        #[test]
        fn never_empty_for_non_empty_input(input in credit()) {
            prop_assert!(!extract_variations(&input).is_empty());
        }
    }
}
