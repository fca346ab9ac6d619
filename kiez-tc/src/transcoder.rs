//! External transcoder capability
//!
//! The cache only needs `run(args) -> (exit code, diagnostics)`, so the
//! process invocation sits behind a trait and tests substitute a stub.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Result of one transcoder run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeOutput {
    /// Process exit code (`None` if terminated by a signal)
    pub exit_code: Option<i32>,
    /// Captured diagnostic stream (stderr for ffmpeg)
    pub diagnostics: String,
}

impl TranscodeOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs an external transcode to completion
///
/// Called on tokio's blocking pool, so implementations may block.
pub trait Transcoder: Send + Sync + 'static {
    fn run(&self, args: &[OsString]) -> std::io::Result<TranscodeOutput>;
}

/// Build the argument list `-i <source> -y <output>`
pub fn transcode_args(source: &Path, output: &Path) -> Vec<OsString> {
    vec![
        OsString::from("-i"),
        source.as_os_str().to_os_string(),
        OsString::from("-y"),
        output.as_os_str().to_os_string(),
    ]
}

/// Command-line media transcoder (ffmpeg or argument-compatible)
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Check if the binary can be launched
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary).arg("-version").output().is_ok()
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Transcoder for FfmpegTranscoder {
    fn run(&self, args: &[OsString]) -> std::io::Result<TranscodeOutput> {
        tracing::debug!(binary = %self.binary.display(), ?args, "Launching transcoder");

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(std::process::Stdio::null())
            .output()?;

        Ok(TranscodeOutput {
            exit_code: output.status.code(),
            diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcode_args_order() {
        let args = transcode_args(Path::new("/music/a.wav"), Path::new("/cache/a.ogg"));
        assert_eq!(
            args,
            vec![
                OsString::from("-i"),
                OsString::from("/music/a.wav"),
                OsString::from("-y"),
                OsString::from("/cache/a.ogg"),
            ]
        );
    }

    #[test]
    fn test_missing_binary_is_launch_error() {
        let transcoder = FfmpegTranscoder::new("/nonexistent/kiez-ffmpeg");
        assert!(!transcoder.is_available());
        let err = transcoder.run(&[]).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_exit_code_zero_is_success() {
        let ok = TranscodeOutput { exit_code: Some(0), diagnostics: String::new() };
        let failed = TranscodeOutput { exit_code: Some(1), diagnostics: "boom".into() };
        let killed = TranscodeOutput { exit_code: None, diagnostics: String::new() };
        assert!(ok.success());
        assert!(!failed.success());
        assert!(!killed.success());
    }
}
