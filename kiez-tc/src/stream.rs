//! Byte-serving contract
//!
//! The HTTP layer resolves a track, asks the cache for its rendition and
//! streams it back. This module does everything short of the HTTP response:
//! it locates the source under the data folder, produces the rendition and
//! derives the response headers. The attachment filename comes from the
//! ORIGINAL file, not the cache file.

use crate::cache::TranscodeCache;
use crate::error::TranscodeError;
use kiez_common::{Track, TrackId};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors preparing a track for streaming
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Track has no source file (placeholder track)
    #[error("Track {0} has no source file")]
    MissingSourcePath(TrackId),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),
}

/// Everything a handler needs to stream a cached rendition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// Cached rendition to read from
    pub path: PathBuf,
    /// MIME type of the rendition
    pub content_type: &'static str,
    /// Filename offered to the client (basename of the original upload)
    pub attachment_filename: String,
}

impl StreamDescriptor {
    /// `Content-Disposition` header value
    pub fn content_disposition(&self) -> String {
        let escaped = self.attachment_filename.replace('\\', "\\\\").replace('"', "\\\"");
        format!("attachment; filename=\"{}\"", escaped)
    }
}

/// MIME type for a cache extension
pub fn content_type_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "ogg" | "oga" | "opus" => "audio/ogg",
        "mp3" => "audio/mpeg",
        "m4a" | "aac" | "mp4" => "audio/mp4",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}

/// Absolute location of a track's source file
///
/// Persisted paths are relative to the data folder; absolute paths pass through.
pub fn resolve_source_path(data_dir: &Path, track: &Track) -> Result<PathBuf, StreamError> {
    let relative = track
        .source_path
        .as_deref()
        .ok_or_else(|| StreamError::MissingSourcePath(track.id.clone()))?;
    Ok(data_dir.join(relative))
}

/// Produce (or reuse) the rendition of `track` and describe how to serve it
pub async fn prepare_stream(
    cache: &TranscodeCache,
    data_dir: &Path,
    track: &Track,
) -> Result<StreamDescriptor, StreamError> {
    let source = resolve_source_path(data_dir, track)?;
    let path = cache.get_or_create(&source).await?;

    let attachment_filename = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| track.id.to_string());

    Ok(StreamDescriptor {
        path,
        content_type: content_type_for_extension(&cache.settings().cache_extension),
        attachment_filename,
    })
}
