//! kiez-tc specific configuration

use kiez_common::config::{resolve_transcode_dir, TomlConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Transcoding cache configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeSettings {
    /// Folder holding cached renditions
    pub output_dir: PathBuf,
    /// Extension of cached renditions, without the dot
    pub cache_extension: String,
    /// Ceiling on waiting for one transcode (`None` waits forever)
    pub timeout: Option<Duration>,
}

impl TranscodeSettings {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            cache_extension: TomlConfig::DEFAULT_CACHE_EXTENSION.to_string(),
            timeout: Some(Duration::from_secs(TomlConfig::DEFAULT_TRANSCODE_TIMEOUT_SECS)),
        }
    }

    /// Build settings from a loaded TOML config and the resolved data folder
    pub fn from_config(config: &TomlConfig, data_dir: &Path) -> Self {
        Self {
            output_dir: resolve_transcode_dir(None, config, data_dir),
            cache_extension: config.cache_extension().to_string(),
            timeout: config.transcode_timeout_secs().map(Duration::from_secs),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension: String = extension.into();
        self.cache_extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}
