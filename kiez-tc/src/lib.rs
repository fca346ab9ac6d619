//! # Kiez Transcoding Cache (kiez-tc)
//!
//! **Purpose:** Lazily produce a playable rendition of an uploaded source file
//! and keep it on disk, transcoding at most once per distinct source even when
//! many playback sessions ask for the same track at the same time.
//!
//! **Architecture:** A deterministic path mapping, an in-flight registry of
//! running transcodes, and a pluggable [`Transcoder`] capability (ffmpeg in
//! production, stubs in tests).

pub mod cache;
pub mod config;
pub mod error;
pub mod stream;
pub mod transcoder;

pub use cache::TranscodeCache;
pub use config::TranscodeSettings;
pub use error::{Result, TranscodeError};
pub use transcoder::{FfmpegTranscoder, TranscodeOutput, Transcoder};
