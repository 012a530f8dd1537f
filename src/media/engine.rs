//! Compositing engine.
//!
//! The engine consumes a pipeline description and a source file and writes
//! an encoded output. [`FfmpegEngine`] drives the ffmpeg binary; tests
//! substitute their own [`CompositingEngine`].
//!
//! Runs are bounded by an [`ExecutionGate`]: descriptions may be built
//! concurrently, but only `max_concurrent_runs` engine processes (one by
//! default) are in flight at a time.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::normalize::normalize_args;
use super::probe::ProbeReport;
use super::{stderr_tail, MediaError};
use crate::config::EngineConfig;
use crate::constants::{STDERR_TAIL_BYTES, TERMINAL_LABEL};

/// One compositing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub filter_complex: String,
}

#[async_trait]
pub trait CompositingEngine: Send + Sync {
    /// Frame size and stream layout of `input`.
    async fn probe(&self, input: &Path) -> ProbeReport;

    /// Re-encode `input` into a standard format at `output`.
    async fn normalize(&self, input: &Path, output: &Path) -> Result<(), MediaError>;

    /// Execute a pipeline description against `request.input`.
    async fn composite(&self, request: &CompositeRequest) -> Result<(), MediaError>;
}

/// Global bound on in-flight engine runs.
#[derive(Debug, Clone)]
pub struct ExecutionGate {
    permits: Arc<Semaphore>,
    width: usize,
}

impl ExecutionGate {
    pub fn new(width: usize) -> Self {
        let width = width.max(1);
        Self {
            permits: Arc::new(Semaphore::new(width)),
            width,
        }
    }

    /// Wait for a run slot. The slot is released when the permit drops.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, MediaError> {
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| MediaError::GateClosed)
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

pub(crate) fn path_str(path: &Path) -> Result<String, MediaError> {
    path.to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| MediaError::InvalidPath(path.display().to_string()))
}

/// Encoder flags shared by every branded output.
fn output_encoding_args(engine: &EngineConfig) -> Vec<String> {
    vec![
        "-c:v".into(),
        engine.video_codec.clone(),
        "-crf".into(),
        engine.crf.to_string(),
        "-preset".into(),
        engine.preset.clone(),
        "-c:a".into(),
        engine.audio_codec.clone(),
        "-b:a".into(),
        engine.audio_bitrate.clone(),
        "-movflags".into(),
        "+faststart".into(),
    ]
}

/// Full ffmpeg argument list for a compositing run.
pub fn render_args(engine: &EngineConfig, request: &CompositeRequest) -> Result<Vec<String>, MediaError> {
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-i".into(),
        path_str(&request.input)?,
        "-filter_complex".into(),
        request.filter_complex.clone(),
        "-map".into(),
        format!("[{}]", TERMINAL_LABEL),
        // Audio is optional: silent clips still render
        "-map".into(),
        "0:a?".into(),
    ];
    args.extend(output_encoding_args(engine));
    args.push(path_str(&request.output)?);
    Ok(args)
}

/// ffmpeg/ffprobe backed engine.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    config: EngineConfig,
}

impl FfmpegEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn run(&self, args: Vec<String>) -> Result<(), MediaError> {
        tracing::debug!(bin = %self.config.ffmpeg_path, args = ?args, "spawning ffmpeg");

        let child = tokio::process::Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(MediaError::NotFound)?;

        let timeout = self.config.timeout();
        // On timeout the child is dropped, which kills it
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| MediaError::Timeout(timeout))??;

        if !output.status.success() {
            return Err(MediaError::ExecutionFailed {
                exit_code: output.status.code(),
                stderr: stderr_tail(&output.stderr, STDERR_TAIL_BYTES),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl CompositingEngine for FfmpegEngine {
    async fn probe(&self, input: &Path) -> ProbeReport {
        super::probe::probe(&self.config, input).await
    }

    async fn normalize(&self, input: &Path, output: &Path) -> Result<(), MediaError> {
        self.run(normalize_args(&self.config, input, output)?).await
    }

    async fn composite(&self, request: &CompositeRequest) -> Result<(), MediaError> {
        if !request.input.exists() {
            return Err(MediaError::VideoNotFound(request.input.display().to_string()));
        }
        self.run(render_args(&self.config, request)?).await
    }
}
