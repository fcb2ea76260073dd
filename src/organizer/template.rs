//! Filename templating.
//!
//! Renders a track's file name from a template such as
//! `{track} - {title} - {artist}` or one of the named presets.
//!
//! Placeholders: `{title}`, `{artist}`, `{album}`, `{track_number}`,
//! `{track}`, `{date}`, `{year}`, `{position}`, `{isrc}`, `{duration}`.
//! Unknown placeholders are left untouched. The result always ends in
//! `.flac` and never contains runs of whitespace.

use crate::model::Track;

/// Extension every rendered file name ends with.
pub const AUDIO_EXTENSION: &str = "flac";

/// Default template when none is configured.
pub const DEFAULT_TEMPLATE: &str = "{title} - {artist}";

/// Named presets accepted in place of a custom template.
fn preset(name: &str) -> Option<&'static str> {
    match name {
        "title_artist" => Some("{title} - {artist}"),
        "artist_title" => Some("{artist} - {title}"),
        "title_only" => Some("{title}"),
        _ => None,
    }
}

/// Render the file name for `track` at 1-based `position` in its batch.
pub fn render_filename(template: &str, track: &Track, position: usize) -> String {
    let template = preset(template).unwrap_or(template);

    let track_number = if track.track_number > 0 {
        format!("{:02}", track.track_number)
    } else {
        format!("{:02}", position)
    };

    let replacements = [
        ("title", sanitize_component(&track.title)),
        ("artist", sanitize_component(&track.artists)),
        ("album", sanitize_component(&track.album)),
        ("track_number", track_number.clone()),
        ("track", track_number),
        ("date", sanitize_component(&track.release_date)),
        ("year", release_year(&track.release_date).to_string()),
        ("position", format!("{:02}", position)),
        ("isrc", sanitize_component(&track.isrc)),
        ("duration", format_duration(track.duration_ms)),
    ];

    let mut result = template.to_string();
    for (key, value) in &replacements {
        result = result.replace(&format!("{{{}}}", key), value);
    }

    if !result
        .to_lowercase()
        .ends_with(&format!(".{}", AUDIO_EXTENSION))
    {
        result.push('.');
        result.push_str(AUDIO_EXTENSION);
    }

    collapse_whitespace(&result)
}

/// Normalize whitespace in a path component and neutralize path separators.
///
/// All other characters are kept as-is so names stay recognizable.
pub fn sanitize_component(value: &str) -> String {
    let replaced: String = value
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            _ => c,
        })
        .collect();
    collapse_whitespace(&replaced)
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `"2021-03-05"` -> `"2021"`, `"2021"` -> `"2021"`, `""` -> `""`.
pub fn release_year(release_date: &str) -> &str {
    release_date.split('-').next().unwrap_or_default()
}

/// Milliseconds as `MM:SS`, empty when unknown.
fn format_duration(duration_ms: u64) -> String {
    if duration_ms == 0 {
        return String::new();
    }
    let total_seconds = duration_ms / 1000;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_track;

    #[test]
    fn test_default_template() {
        let track = mock_track();
        assert_eq!(
            render_filename(DEFAULT_TEMPLATE, &track, 1),
            "Test Track - Test Artist.flac"
        );
    }

    #[test]
    fn test_presets() {
        let track = mock_track();
        assert_eq!(
            render_filename("artist_title", &track, 1),
            "Test Artist - Test Track.flac"
        );
        assert_eq!(render_filename("title_only", &track, 1), "Test Track.flac");
        assert_eq!(
            render_filename("title_artist", &track, 1),
            "Test Track - Test Artist.flac"
        );
    }

    #[test]
    fn test_all_placeholders() {
        let mut track = mock_track();
        track.track_number = 7;
        track.release_date = "2019-10-04".to_string();
        track.duration_ms = 215_000;
        track.isrc = "GBUM71903894".to_string();

        let name = render_filename(
            "{track} {track_number} {position} {year} {date} {isrc} {duration} {album}",
            &track,
            3,
        );
        assert_eq!(
            name,
            "07 07 03 2019 2019-10-04 GBUM71903894 03:35 Test Album.flac"
        );
    }

    #[test]
    fn test_track_number_falls_back_to_position() {
        let mut track = mock_track();
        track.track_number = 0;
        assert_eq!(render_filename("{track}. {title}", &track, 12), "12. Test Track.flac");
    }

    #[test]
    fn test_unknown_placeholder_left_untouched() {
        let track = mock_track();
        assert_eq!(
            render_filename("{title} {genre}", &track, 1),
            "Test Track {genre}.flac"
        );
    }

    #[test]
    fn test_existing_extension_not_duplicated() {
        let track = mock_track();
        assert_eq!(render_filename("{title}.FLAC", &track, 1), "Test Track.FLAC");
    }

    #[test]
    fn test_whitespace_normalized() {
        let mut track = mock_track();
        track.title = "  Spaced\t  Out  ".to_string();
        assert_eq!(
            render_filename("{title}   -  {artist}", &track, 1),
            "Spaced Out - Test Artist.flac"
        );
    }

    #[test]
    fn test_missing_values_render_empty() {
        let mut track = mock_track();
        track.release_date = String::new();
        track.duration_ms = 0;
        // The separator before the extension survives, only the run collapses
        assert_eq!(
            render_filename("{title} {year} {duration}", &track, 1),
            "Test Track .flac"
        );
    }

    #[test]
    fn test_path_separators_replaced() {
        assert_eq!(sanitize_component("AC/DC"), "AC_DC");
        assert_eq!(sanitize_component("Back\\Slash"), "Back_Slash");
        assert_eq!(sanitize_component("Keep: ?*"), "Keep: ?*");
    }

    #[test]
    fn test_release_year() {
        assert_eq!(release_year("2021-03-05"), "2021");
        assert_eq!(release_year("1999"), "1999");
        assert_eq!(release_year(""), "");
    }
}
