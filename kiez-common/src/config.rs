//! Configuration loading and data folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "KIEZ_DATA_DIR";

/// Name of the transcoding subdirectory below the data directory
pub const TRANSCODE_SUBDIR: &str = "transcriptions";

/// Logging section of the TOML config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, used when RUST_LOG is unset
    pub level: Option<String>,
}

/// Contents of `config.toml`
///
/// Every field is optional; missing values fall back to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Root folder holding uploaded source media
    pub data_dir: Option<PathBuf>,

    /// Folder holding transcoded renditions (default: `<data_dir>/transcriptions`)
    pub transcode_dir: Option<PathBuf>,

    /// External transcoder binary (default: `ffmpeg`)
    pub transcoder: Option<String>,

    /// Extension of cached renditions, without the dot (default: `ogg`)
    pub cache_extension: Option<String>,

    /// Upper bound on waiting for a transcode in seconds; 0 disables the bound
    pub transcode_timeout_secs: Option<u64>,

    pub logging: LoggingConfig,
}

impl TomlConfig {
    pub const DEFAULT_TRANSCODER: &'static str = "ffmpeg";
    pub const DEFAULT_CACHE_EXTENSION: &'static str = "ogg";
    pub const DEFAULT_TRANSCODE_TIMEOUT_SECS: u64 = 300;

    pub fn transcoder(&self) -> &str {
        self.transcoder.as_deref().unwrap_or(Self::DEFAULT_TRANSCODER)
    }

    pub fn cache_extension(&self) -> &str {
        self.cache_extension
            .as_deref()
            .map(|ext| ext.trim_start_matches('.'))
            .unwrap_or(Self::DEFAULT_CACHE_EXTENSION)
    }

    /// Timeout in seconds, `None` when disabled
    pub fn transcode_timeout_secs(&self) -> Option<u64> {
        match self
            .transcode_timeout_secs
            .unwrap_or(Self::DEFAULT_TRANSCODE_TIMEOUT_SECS)
        {
            0 => None,
            secs => Some(secs),
        }
    }
}

/// Load a TOML config file
///
/// A missing file is not an error: a warning is logged and defaults are
/// returned. A file that exists but does not parse is `Error::Config`.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(TomlConfig::default());
        }
        Err(e) => return Err(Error::Io(e)),
    };

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Default configuration file path for the platform (`<config_dir>/kiez/config.toml`)
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("kiez").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// Data folder resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. `KIEZ_DATA_DIR` environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_dir(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.data_dir {
        return path.clone();
    }

    default_data_dir()
}

/// Transcode folder: CLI argument, then TOML, then `<data_dir>/transcriptions`
pub fn resolve_transcode_dir(cli_arg: Option<&Path>, config: &TomlConfig, data_dir: &Path) -> PathBuf {
    cli_arg
        .map(Path::to_path_buf)
        .or_else(|| config.transcode_dir.clone())
        .unwrap_or_else(|| data_dir.join(TRANSCODE_SUBDIR))
}

/// OS-dependent default data folder
fn default_data_dir() -> PathBuf {
    // ~/.local/share/kiez, ~/Library/Application Support/kiez, %LOCALAPPDATA%\kiez
    dirs::data_local_dir()
        .map(|d| d.join("kiez"))
        .unwrap_or_else(|| PathBuf::from("./kiez_data"))
}
