//! Frame-size probe.
//!
//! Runs ffprobe with JSON output and reports the first video stream's
//! dimensions. A failed probe is not fatal: the canonical 1080x1920
//! portrait frame is substituted and the report says so.

use std::path::Path;

use serde::Deserialize;

use super::MediaError;
use crate::config::EngineConfig;
use crate::overlay::FrameSize;

/// Top-level ffprobe JSON output (`-print_format json -show_streams`).
#[derive(Debug, Deserialize)]
pub struct FfprobeOutput {
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
}

/// A single stream from ffprobe output.
#[derive(Debug, Deserialize)]
pub struct FfprobeStream {
    pub index: i32,
    pub codec_name: Option<String>,
    pub codec_type: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

impl FfprobeOutput {
    pub fn first_video_stream(&self) -> Option<&FfprobeStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
    }
}

/// Probe result handed to the pipeline builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    pub frame: FrameSize,
    /// False when streams were found but none of them is video
    pub has_video: bool,
    /// True when `frame` is the substituted default
    pub defaulted: bool,
}

impl ProbeReport {
    fn fallback() -> Self {
        Self {
            frame: FrameSize::default_portrait(),
            has_video: true,
            defaulted: true,
        }
    }
}

pub fn parse_probe_output(json: &str) -> Result<FfprobeOutput, MediaError> {
    serde_json::from_str(json).map_err(|e| MediaError::ParseError(e.to_string()))
}

/// Turn parsed ffprobe output into a report, defaulting unusable sizes.
pub fn report_from_output(output: &FfprobeOutput) -> ProbeReport {
    if !output.streams.is_empty() && output.first_video_stream().is_none() {
        return ProbeReport {
            frame: FrameSize::default_portrait(),
            has_video: false,
            defaulted: true,
        };
    }

    let dims = output.first_video_stream().and_then(|s| match (s.width, s.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Some((u32::try_from(w).ok()?, u32::try_from(h).ok()?)),
        _ => None,
    });

    match dims {
        Some((width, height)) => ProbeReport {
            frame: FrameSize::new(width, height),
            has_video: true,
            defaulted: false,
        },
        None => ProbeReport::fallback(),
    }
}

async fn run_ffprobe(engine: &EngineConfig, path: &Path) -> Result<FfprobeOutput, MediaError> {
    if !path.exists() {
        return Err(MediaError::VideoNotFound(path.display().to_string()));
    }

    let output = tokio::process::Command::new(&engine.ffprobe_path)
        .args(["-v", "quiet", "-print_format", "json", "-show_streams"])
        .arg(path)
        .output()
        .await
        .map_err(MediaError::NotFound)?;

    if !output.status.success() {
        return Err(MediaError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

/// Probe `path`. Never fails; see [`ProbeReport::defaulted`].
pub async fn probe(engine: &EngineConfig, path: &Path) -> ProbeReport {
    match run_ffprobe(engine, path).await {
        Ok(output) => {
            let report = report_from_output(&output);
            if report.defaulted && report.has_video {
                tracing::warn!(path = %path.display(), "probe found no usable dimensions, using default frame");
            }
            report
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "probe failed, using default frame");
            ProbeReport::fallback()
        }
    }
}
