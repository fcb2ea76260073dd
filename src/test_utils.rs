//! Test utilities and fixtures for flac-hoard tests.
//!
//! Provides track factories and a minimal FLAC file writer so duplicate
//! detection can be tested against real tags without shipping audio.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{mock_track, write_test_flac};
//!
//! #[test]
//! fn test_something() {
//!     let dir = tempfile::tempdir().unwrap();
//!     write_test_flac(&dir.path().join("a.flac"), Some("USAT22409172"));
//!     let track = mock_track();
//!     // ... test logic
//! }
//! ```

use std::path::Path;

use crate::model::{CollectionKind, Track, TrackList};

/// Creates a mock Track with sensible defaults.
///
/// Customize by assigning fields:
///
/// ```ignore
/// let mut track = mock_track();
/// track.isrc = String::new();
/// ```
pub fn mock_track() -> Track {
    let mut track = Track::new("track-1", "Test Track", "Test Artist");
    track.external_ref = "https://open.spotify.com/track/track-1".to_string();
    track.album = "Test Album".to_string();
    track.track_number = 1;
    track.duration_ms = 180_000;
    track.isrc = "TEST00000001".to_string();
    track.release_date = "2023-01-01".to_string();
    track
}

/// Creates a mock track with the given ID, ISRC and artist credit.
pub fn mock_track_with(id: &str, isrc: &str, artists: &str) -> Track {
    let mut track = mock_track();
    track.id = id.to_string();
    track.title = format!("Track {}", id);
    track.isrc = isrc.to_string();
    track.artists = artists.to_string();
    track
}

/// Creates an album batch with one track per artist credit.
///
/// Track `i` (1-based) is titled `"Track i"`, numbered `i` and carries the
/// ISRC `TEST0000000i`.
pub fn mock_album(name: &str, artists: &[&str]) -> TrackList {
    let tracks = artists
        .iter()
        .enumerate()
        .map(|(i, artist)| {
            let n = i + 1;
            let mut track = Track::new(format!("id-{}", n), format!("Track {}", n), *artist);
            track.album = name.to_string();
            track.track_number = n as u32;
            track.duration_ms = 200_000;
            track.isrc = format!("TEST{:08}", n);
            track.release_date = "2020-05-01".to_string();
            track
        })
        .collect();

    TrackList {
        kind: CollectionKind::Album,
        name: name.to_string(),
        tracks,
    }
}

/// Wraps tracks into a playlist batch.
pub fn mock_playlist(name: &str, tracks: Vec<Track>) -> TrackList {
    TrackList {
        kind: CollectionKind::Playlist,
        name: name.to_string(),
        tracks,
    }
}

/// Writes a minimal, valid FLAC file (metadata only) to `path`.
///
/// Contains a STREAMINFO block and, when `isrc` is given, a Vorbis comment
/// block carrying `ISRC=<isrc>`.
pub fn write_test_flac(path: &Path, isrc: Option<&str>) {
    std::fs::write(path, test_flac_bytes(isrc)).expect("Failed to write test FLAC");
}

/// Bytes of the file written by [`write_test_flac`].
pub fn test_flac_bytes(isrc: Option<&str>) -> Vec<u8> {
    const STREAMINFO: u8 = 0;
    const VORBIS_COMMENT: u8 = 4;
    const LAST_BLOCK: u8 = 0x80;

    let mut bytes = b"fLaC".to_vec();

    let mut stream_info = Vec::with_capacity(34);
    stream_info.extend_from_slice(&4096u16.to_be_bytes()); // min block size
    stream_info.extend_from_slice(&4096u16.to_be_bytes()); // max block size
    stream_info.extend_from_slice(&[0, 0, 0, 0, 0, 0]); // min/max frame size
    // 20 bits sample rate, 3 bits channels-1, 5 bits bps-1, 36 bits total samples
    let packed: u64 = (44_100u64 << 44) | (1u64 << 41) | (15u64 << 36) | 44_100u64;
    stream_info.extend_from_slice(&packed.to_be_bytes());
    stream_info.extend_from_slice(&[0u8; 16]); // MD5

    let push_block = |bytes: &mut Vec<u8>, header: u8, body: &[u8]| {
        bytes.push(header);
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        bytes.extend_from_slice(body);
    };

    match isrc {
        Some(isrc) => {
            push_block(&mut bytes, STREAMINFO, &stream_info);

            let vendor = b"flac-hoard tests";
            let comment = format!("ISRC={}", isrc);
            let mut body = Vec::new();
            body.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
            body.extend_from_slice(vendor);
            body.extend_from_slice(&1u32.to_le_bytes());
            body.extend_from_slice(&(comment.len() as u32).to_le_bytes());
            body.extend_from_slice(comment.as_bytes());
            push_block(&mut bytes, LAST_BLOCK | VORBIS_COMMENT, &body);
        }
        None => push_block(&mut bytes, LAST_BLOCK | STREAMINFO, &stream_info),
    }

    // Stand-in for audio frames
    bytes.extend_from_slice(&[0u8; 64]);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_track_defaults() {
        let track = mock_track();
        assert_eq!(track.title, "Test Track");
        assert_eq!(track.artists, "Test Artist");
        assert!(track.has_isrc());
        assert!(!track.is_downloaded());
    }

    #[test]
    fn test_mock_album_numbering() {
        let album = mock_album("Album", &["A", "B", "C"]);
        assert_eq!(album.len(), 3);
        assert_eq!(album.tracks[2].title, "Track 3");
        assert_eq!(album.tracks[2].track_number, 3);
        assert_eq!(album.tracks[2].isrc, "TEST00000003");
    }

    #[test]
    fn test_flac_bytes_layout() {
        let bytes = test_flac_bytes(Some("USAT22409172"));
        assert_eq!(&bytes[..4], b"fLaC");
        // First block is a non-final STREAMINFO of 34 bytes
        assert_eq!(bytes[4], 0);
        assert_eq!(&bytes[5..8], &[0, 0, 34]);
        assert!(
            bytes
                .windows(b"ISRC=USAT22409172".len())
                .any(|w| w == b"ISRC=USAT22409172")
        );

        let untagged = test_flac_bytes(None);
        assert_eq!(untagged[4], 0x80);
    }
}
