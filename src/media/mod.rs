//! Media collaborators around the overlay core.
//!
//! - [`probe`]: frame size and stream inspection through ffprobe
//! - [`normalize`]: re-encode exotic sources before branding
//! - [`engine`]: the compositing engine trait, the ffmpeg implementation
//!   and the global execution gate

pub mod engine;
pub mod normalize;
pub mod probe;

pub use engine::{render_args, CompositeRequest, CompositingEngine, ExecutionGate, FfmpegEngine};
pub use normalize::{normalize, normalize_args};
pub use probe::{parse_probe_output, probe, FfprobeOutput, FfprobeStream, ProbeReport};

use std::time::Duration;

/// Errors from ffprobe/ffmpeg invocations.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("ffprobe/ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("ffmpeg timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    #[error("input has no video stream (audio-only?): {0}")]
    NoVideoStream(String),

    #[error("video file not found: {0}")]
    VideoNotFound(String),

    #[error("path is not valid UTF-8: {0}")]
    InvalidPath(String),

    #[error("execution gate closed")]
    GateClosed,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Keep the last `max` bytes of engine stderr, on a char boundary.
pub(crate) fn stderr_tail(stderr: &[u8], max: usize) -> String {
    let text = String::from_utf8_lossy(stderr);
    if text.len() <= max {
        return text.trim().to_string();
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].trim().to_string()
}
