// Source normalization: re-encode to 8-bit yuv420p H.264 at a fixed width
// with regenerated timestamps, so exotic inputs composite predictably.

use std::path::{Path, PathBuf};

use super::engine::{path_str, CompositingEngine};
use super::MediaError;
use crate::config::EngineConfig;

pub fn normalize_args(
    engine: &EngineConfig,
    input: &Path,
    output: &Path,
) -> Result<Vec<String>, MediaError> {
    Ok(vec![
        "-y".into(),
        "-fflags".into(),
        "+genpts".into(),
        "-i".into(),
        path_str(input)?,
        "-vf".into(),
        format!("scale={}:-2", engine.normalize_width),
        "-c:v".into(),
        engine.video_codec.clone(),
        "-preset".into(),
        engine.preset.clone(),
        "-crf".into(),
        engine.crf.to_string(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-c:a".into(),
        engine.audio_codec.clone(),
        "-b:a".into(),
        engine.audio_bitrate.clone(),
        "-movflags".into(),
        "+faststart".into(),
        path_str(output)?,
    ])
}

/// Where the normalized copy of `input` is written.
pub fn normalized_path(input: &Path, work_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    work_dir.join(format!("{}_normalized.mp4", stem))
}

/// Normalize `input` into `work_dir`. On failure the original input is
/// returned so the render can still proceed.
pub async fn normalize(engine: &dyn CompositingEngine, input: &Path, work_dir: &Path) -> PathBuf {
    let output = normalized_path(input, work_dir);

    match engine.normalize(input, &output).await {
        Ok(()) if output.is_file() => {
            tracing::info!(input = %input.display(), output = %output.display(), "source normalized");
            output
        }
        Ok(()) => {
            tracing::warn!(input = %input.display(), "normalization produced no file, using original");
            input.to_path_buf()
        }
        Err(e) => {
            tracing::warn!(input = %input.display(), error = %e, "normalization failed, using original");
            input.to_path_buf()
        }
    }
}
