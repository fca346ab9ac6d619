//! Track data model
//!
//! Mirrors the payload returned by the song-listing endpoint. The server owns
//! persistence; everything here treats a loaded track as an immutable value.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Stable track identifier
///
/// Serialized transparently so `"42"` on the wire becomes `TrackId("42")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for TrackId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of audio content with persisted metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Stable, unique identity
    pub id: TrackId,

    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,

    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,

    /// Location of the original media, relative to the data directory or absolute
    ///
    /// Placeholder ("dummy") tracks carry a `link` instead and have no file.
    #[serde(default, alias = "path", alias = "filePath")]
    pub source_path: Option<PathBuf>,

    /// External link for placeholder tracks
    #[serde(default)]
    pub link: Option<String>,

    /// SHA-256 of the source file, used by the upload path for de-duplication
    #[serde(default)]
    pub file_hash: Option<String>,
}

impl Track {
    /// Create a track with only the required fields set
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: None,
            genre: None,
            year: None,
            duration: None,
            source_path: None,
            link: None,
            file_hash: None,
        }
    }

    /// Builder-style setter for the source file location
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// True for placeholder tracks that only point at an external link
    pub fn is_placeholder(&self) -> bool {
        self.source_path.is_none() && self.link.is_some()
    }
}
