//! Transcoding cache
//!
//! Maps a source file to a cached rendition inside the output folder and
//! produces the rendition on first request.
//!
//! Concurrency model:
//! - The in-flight registry maps an output path to the completion signal of
//!   the transcode producing it. It is consulted and updated under one lock,
//!   together with the cache-hit check, so a second caller for the same key
//!   either sees the finished file or joins the running transcode.
//! - The transcode runs in a detached task. Callers only wait on its signal,
//!   so a caller that gives up (timeout, dropped request) never stops a
//!   process other waiters depend on.
//! - The transcoder writes to a hidden staging file that is renamed into
//!   place on success, so the cache path never names a half-written file.

use crate::config::TranscodeSettings;
use crate::error::{Result, TranscodeError};
use crate::transcoder::{transcode_args, Transcoder};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// Outcome slot published by a transcode task (`None` while running)
type Outcome = Option<Result<PathBuf>>;

/// Output path -> completion signal of the transcode producing it
type InFlightRegistry = Arc<Mutex<HashMap<PathBuf, watch::Receiver<Outcome>>>>;

/// Derive the cache path for a source file
///
/// `output_dir / file_stem(source) + "." + extension`. Pure: no I/O, no
/// timestamps, no randomness.
pub fn resolve_cache_path(output_dir: &Path, source: &Path, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .unwrap_or_else(|| source.as_os_str())
        .to_string_lossy();
    output_dir.join(format!("{}.{}", stem, extension))
}

/// Hidden sibling the transcoder writes into before the final rename
///
/// Keeps the real extension so the transcoder can infer the container format.
fn staging_path(output: &Path) -> PathBuf {
    let stem = output.file_stem().unwrap_or_default().to_string_lossy();
    let name = match output.extension() {
        Some(ext) => format!(".{}.partial.{}", stem, ext.to_string_lossy()),
        None => format!(".{}.partial", stem),
    };
    output.with_file_name(name)
}

/// On-demand transcoding cache
///
/// Share it between request handlers through an `Arc`.
pub struct TranscodeCache {
    settings: TranscodeSettings,
    transcoder: Arc<dyn Transcoder>,
    in_flight: InFlightRegistry,
}

impl TranscodeCache {
    pub fn new(settings: TranscodeSettings, transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            settings,
            transcoder,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn settings(&self) -> &TranscodeSettings {
        &self.settings
    }

    /// Cache path for `source` under the configured folder and extension
    pub fn resolve_cache_path(&self, source: &Path) -> PathBuf {
        resolve_cache_path(&self.settings.output_dir, source, &self.settings.cache_extension)
    }

    /// True if a finished rendition of `source` is on disk
    pub async fn is_cached(&self, source: &Path) -> bool {
        path_exists(&self.resolve_cache_path(source)).await
    }

    /// Number of transcodes currently running
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    /// Return the cached rendition of `source`, transcoding it first if absent
    ///
    /// An existing file is returned as-is without comparing it to the source.
    /// Concurrent callers for the same cache path share one transcode and all
    /// observe its result, success or failure. Failures are not cached: the
    /// next request after a failure starts a fresh attempt.
    pub async fn get_or_create(&self, source: &Path) -> Result<PathBuf> {
        let output = self.resolve_cache_path(source);

        let signal = {
            let mut in_flight = self.in_flight.lock().await;

            match in_flight.get(&output).cloned() {
                Some(signal) => {
                    debug!(output = %output.display(), "Joining in-flight transcode");
                    signal
                }
                None => {
                    if path_exists(&output).await {
                        debug!(output = %output.display(), "Cache hit");
                        return Ok(output);
                    }

                    if !path_exists(source).await {
                        return Err(TranscodeError::SourceNotFound(source.to_path_buf()));
                    }

                    let output_dir = &self.settings.output_dir;
                    tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
                        TranscodeError::DirectoryCreation {
                            path: output_dir.clone(),
                            reason: e.to_string(),
                        }
                    })?;

                    let (tx, rx) = watch::channel(None);
                    in_flight.insert(output.clone(), rx.clone());
                    self.spawn_transcode(source.to_path_buf(), output.clone(), tx);
                    rx
                }
            }
        };

        self.wait_for(signal, output).await
    }

    /// Run the transcode in a detached task and publish its outcome
    fn spawn_transcode(&self, source: PathBuf, output: PathBuf, tx: watch::Sender<Outcome>) {
        let transcoder = Arc::clone(&self.transcoder);
        let in_flight = Arc::clone(&self.in_flight);

        tokio::spawn(async move {
            let outcome = run_transcode(transcoder, &source, &output).await;

            // Unregister and publish under the lock: a later caller either
            // joins this signal or sees the renamed file, never neither.
            let mut registry = in_flight.lock().await;
            registry.remove(&output);
            tx.send_replace(Some(outcome));
        });
    }

    async fn wait_for(&self, mut signal: watch::Receiver<Outcome>, output: PathBuf) -> Result<PathBuf> {
        let wait = async move {
            loop {
                let current = (*signal.borrow_and_update()).clone();
                if let Some(outcome) = current {
                    return outcome;
                }
                if signal.changed().await.is_err() {
                    let last = (*signal.borrow()).clone();
                    return last.unwrap_or_else(|| {
                        Err(TranscodeError::Internal(
                            "transcode task ended without a result".to_string(),
                        ))
                    });
                }
            }
        };

        match self.settings.timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(output = %output.display(), timeout = ?limit, "Gave up waiting for transcode");
                    Err(TranscodeError::Timeout { output, after: limit })
                }
            },
            None => wait.await,
        }
    }
}

/// Transcode `source` into the staging file and move it to `output`
///
/// The staging file is removed on every failure path.
async fn run_transcode(transcoder: Arc<dyn Transcoder>, source: &Path, output: &Path) -> Result<PathBuf> {
    let staging = staging_path(output);
    let started = Instant::now();

    info!(source = %source.display(), output = %output.display(), "Transcoding");

    let result = transcode_into(transcoder, source, &staging, output).await;

    match &result {
        Ok(_) => info!(
            output = %output.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Transcode complete"
        ),
        Err(e) => {
            let _ = tokio::fs::remove_file(&staging).await;
            warn!(source = %source.display(), error = %e, "Transcode failed");
        }
    }

    result
}

async fn transcode_into(
    transcoder: Arc<dyn Transcoder>,
    source: &Path,
    staging: &Path,
    output: &Path,
) -> Result<PathBuf> {
    let args = transcode_args(source, staging);

    let run = tokio::task::spawn_blocking(move || transcoder.run(&args))
        .await
        .map_err(|e| TranscodeError::Internal(format!("Task join error: {}", e)))?
        .map_err(|e| TranscodeError::TranscodeFailure {
            exit_code: None,
            diagnostics: format!("Failed to launch transcoder: {}", e),
        })?;

    if !run.success() {
        return Err(TranscodeError::TranscodeFailure {
            exit_code: run.exit_code,
            diagnostics: run.diagnostics,
        });
    }

    tokio::fs::rename(staging, output)
        .await
        .map_err(|e| TranscodeError::TranscodeFailure {
            exit_code: run.exit_code,
            diagnostics: format!("Transcoder exited cleanly but produced no usable output: {}", e),
        })?;

    Ok(output.to_path_buf())
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
