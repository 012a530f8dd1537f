//! Compositing engine configuration.
//!
//! Binary locations, the run timeout, the width of the global execution
//! gate and the encoder flags passed to ffmpeg.
//!
//! Default values are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    DEFAULT_AUDIO_BITRATE, DEFAULT_AUDIO_CODEC, DEFAULT_CRF, DEFAULT_ENGINE_TIMEOUT_SECS,
    DEFAULT_FFMPEG_PATH, DEFAULT_FFPROBE_PATH, DEFAULT_MAX_CONCURRENT_RUNS,
    DEFAULT_NORMALIZE_WIDTH, DEFAULT_PRESET, DEFAULT_VIDEO_CODEC,
};

fn default_ffmpeg_path() -> String {
    DEFAULT_FFMPEG_PATH.to_string()
}

fn default_ffprobe_path() -> String {
    DEFAULT_FFPROBE_PATH.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_ENGINE_TIMEOUT_SECS
}

fn default_max_concurrent_runs() -> usize {
    DEFAULT_MAX_CONCURRENT_RUNS
}

fn default_true() -> bool {
    true
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}

fn default_crf() -> u8 {
    DEFAULT_CRF
}

fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}

fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}

fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}

fn default_normalize_width() -> u32 {
    DEFAULT_NORMALIZE_WIDTH
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,

    /// Engine process is killed after this many seconds (default: 600)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Compositing runs allowed in flight at once (default: 1)
    #[serde(default = "default_max_concurrent_runs")]
    pub max_concurrent_runs: usize,

    /// Re-encode sources to a standard format before branding (default: true)
    #[serde(default = "default_true")]
    pub normalize: bool,

    #[serde(default = "default_normalize_width")]
    pub normalize_width: u32,

    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    #[serde(default = "default_crf")]
    pub crf: u8,

    #[serde(default = "default_preset")]
    pub preset: String,

    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            timeout_secs: default_timeout_secs(),
            max_concurrent_runs: default_max_concurrent_runs(),
            normalize: true,
            normalize_width: default_normalize_width(),
            video_codec: default_video_codec(),
            crf: default_crf(),
            preset: default_preset(),
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.ffmpeg_path.trim().is_empty() {
            return Err("engine.ffmpeg_path cannot be empty".to_string());
        }
        if self.ffprobe_path.trim().is_empty() {
            return Err("engine.ffprobe_path cannot be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("engine.timeout_secs must be > 0 seconds".to_string());
        }
        if self.max_concurrent_runs == 0 {
            return Err("engine.max_concurrent_runs must be at least 1".to_string());
        }
        if self.normalize_width < 2 || self.normalize_width % 2 != 0 {
            return Err(format!(
                "engine.normalize_width must be an even number >= 2, got {}",
                self.normalize_width
            ));
        }
        if self.crf > 51 {
            return Err(format!("engine.crf must be in 0..=51, got {}", self.crf));
        }
        Ok(())
    }
}
