//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\flac-hoard\config.toml
//! - macOS: ~/Library/Application Support/flac-hoard/config.toml
//! - Linux: ~/.config/flac-hoard/config.toml
//!
//! The config file is human-readable and editable. Command-line flags
//! override it per run; `flac-hoard config --init` writes the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::backends::DEFAULT_TIMEOUT_SECS;
use crate::organizer::DEFAULT_TEMPLATE;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where and under which names files are stored
    pub placement: PlacementSettings,

    /// Download services
    pub backends: BackendsConfig,

    /// Run behaviour
    pub run: RunConfig,
}

/// File layout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSettings {
    /// Default output directory when none is given on the command line
    pub output_dir: Option<PathBuf>,

    /// Preset (`title_artist`, `artist_title`, `title_only`) or custom template
    pub filename_format: String,

    /// Put files in a folder per artist
    pub artist_subfolders: bool,

    /// Put files in a folder per album
    pub album_subfolders: bool,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            output_dir: None,
            filename_format: DEFAULT_TEMPLATE.to_string(),
            artist_subfolders: false,
            album_subfolders: false,
        }
    }
}

/// Download service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendsConfig {
    /// Services to try, in priority order
    pub services: Vec<String>,

    /// Upper bound for one backend attempt, in seconds
    pub timeout_secs: u64,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            services: vec![crate::backends::deezer::BACKEND_ID.to_string()],
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Run behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Only report which tracks are missing; never download
    pub check_only: bool,

    /// Write an M3U8 playlist for albums and playlists
    pub create_playlist: bool,

    /// Write catalog tags into downloaded files
    pub embed_tags: bool,

    /// Tracks processed at the same time
    pub concurrency: usize,

    /// Re-run the batch every N minutes
    pub loop_minutes: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            check_only: false,
            create_playlist: false,
            embed_tags: true,
            concurrency: 1,
            loop_minutes: None,
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("flac-hoard"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the standard location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from a specific file, falling back to defaults.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::debug!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the standard location
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)?;
    Ok(path)
}

/// Save configuration to `path`
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
