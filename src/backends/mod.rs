//! Download backends.
//!
//! A backend turns an ISRC (plus display metadata) into a lossless audio
//! file on disk. The orchestrator only knows the [`DownloadBackend`] trait
//! and a [`BackendRegistry`] mapping identifiers to constructors, so adding
//! a service never touches the acquisition control flow.
//!
//! Adapters are constructed fresh for every attempt and must not rely on
//! session state carried across tracks.

pub mod deezer;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::BackendError;

/// Identifier of a download service, e.g. `"deezer"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendId(String);

impl BackendId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BackendId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for BackendId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Everything an adapter gets to know about one attempt.
#[derive(Debug, Clone)]
pub struct AttemptRequest<'a> {
    pub isrc: &'a str,
    pub title: &'a str,
    pub artist: &'a str,
    pub album: &'a str,
    pub track_id: &'a str,
    /// Directory the file should be written to
    pub output_dir: &'a Path,
    /// Adapters abort in-flight transfers when this fires
    pub cancel: &'a CancellationToken,
}

/// A service that can supply an audio file for a track.
#[async_trait]
pub trait DownloadBackend: Send + Sync {
    /// Download the track into `request.output_dir` and return the file path.
    ///
    /// Partial files must be removed before returning an error.
    async fn attempt(&self, request: &AttemptRequest<'_>) -> Result<PathBuf, BackendError>;
}

/// Settings shared by all adapters of a run.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Upper bound for one attempt, also applied to the adapter's HTTP client
    pub timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Default per-attempt timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Builds one adapter instance.
pub type BackendFactory =
    Arc<dyn Fn(&BackendSettings) -> Result<Box<dyn DownloadBackend>, BackendError> + Send + Sync>;

/// Known backends by identifier.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    factories: BTreeMap<BackendId, BackendFactory>,
}

impl BackendRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in backend.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(deezer::BACKEND_ID, |settings| {
            Ok(Box::new(deezer::DeezerBackend::new(settings)?) as Box<dyn DownloadBackend>)
        });
        registry
    }

    /// Add or replace a backend constructor.
    pub fn register<F>(&mut self, id: impl Into<BackendId>, factory: F)
    where
        F: Fn(&BackendSettings) -> Result<Box<dyn DownloadBackend>, BackendError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(id.into(), Arc::new(factory));
    }

    pub fn contains(&self, id: &BackendId) -> bool {
        self.factories.contains_key(id)
    }

    /// Construct a fresh adapter, or `None` for an unknown identifier.
    pub fn create(
        &self,
        id: &BackendId,
        settings: &BackendSettings,
    ) -> Option<Result<Box<dyn DownloadBackend>, BackendError>> {
        self.factories.get(id).map(|factory| factory(settings))
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &BackendId> {
        self.factories.keys()
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// File name an adapter delivers a track under, unique per catalog track.
///
/// Keeps alphanumerics, spaces, `-` and `_`; everything else is dropped.
/// `key` (the catalog track id) keeps concurrent attempts for tracks with
/// the same artist and title apart; the orchestrator renames the file to
/// its canonical path afterwards.
pub fn safe_file_name(artist: &str, title: &str, key: &str) -> String {
    let keep = |s: &str| -> String {
        s.chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .trim()
            .to_string()
    };
    let key = keep(key);
    if key.is_empty() {
        format!("{} - {}.flac", keep(artist), keep(title))
    } else {
        format!("{} - {} [{}].flac", keep(artist), keep(title), key)
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::{MockBehavior, register_mock};
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_backend_id_normalized() {
        assert_eq!(BackendId::from(" Deezer "), BackendId::from("deezer"));
        assert_eq!(BackendId::from("deezer").to_string(), "deezer");
    }

    #[test]
    fn test_default_registry() {
        let registry = BackendRegistry::with_defaults();
        assert!(registry.contains(&"deezer".into()));
        assert!(!registry.contains(&"tidal".into()));
        assert!(registry.create(&"qobuz".into(), &BackendSettings::default()).is_none());
        assert_eq!(registry.ids().map(BackendId::as_str).collect::<Vec<_>>(), ["deezer"]);
    }

    #[test]
    fn test_safe_file_name() {
        assert_eq!(
            safe_file_name("AC/DC", "Back In Black (Live)", ""),
            "ACDC - Back In Black Live.flac"
        );
        assert_eq!(safe_file_name("Björk", "Jóga", "  "), "Björk - Jóga.flac");
    }

    #[test]
    fn test_safe_file_name_differs_per_track() {
        let original = safe_file_name("Daft Punk", "Get Lucky", "4uLU6hMCjMI75M1A2tKUQC");
        let remaster = safe_file_name("Daft Punk", "Get Lucky", "2Foc5Q5nqNiosCNqttzHof");
        assert_eq!(original, "Daft Punk - Get Lucky [4uLU6hMCjMI75M1A2tKUQC].flac");
        assert_ne!(original, remaster);
        assert_eq!(safe_file_name("A", "B", "id/../x"), "A - B [idx].flac");
    }

    #[tokio::test]
    async fn test_each_create_builds_a_fresh_adapter() {
        let temp = tempdir().unwrap();
        let mut registry = BackendRegistry::new();
        let counter = register_mock(&mut registry, "mock", MockBehavior::Succeed);
        let cancel = CancellationToken::new();
        let request = AttemptRequest {
            isrc: "TEST00000001",
            title: "Song",
            artist: "Artist",
            album: "",
            track_id: "1",
            output_dir: temp.path(),
            cancel: &cancel,
        };

        for _ in 0..2 {
            let backend = registry
                .create(&"mock".into(), &BackendSettings::default())
                .unwrap()
                .unwrap();
            let path = backend.attempt(&request).await.unwrap();
            assert!(path.exists());
        }
        assert_eq!(counter.get(), 2);
    }
}
