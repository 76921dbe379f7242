//! FFprobe video information.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::command::{Invocation, MediaRunner, Tool};
use crate::error::{MediaError, MediaResult};

/// Frame rate and duration of the first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Frame rate (fps)
    pub fps: f64,
    /// Duration in seconds, 0 when the container does not report one
    pub duration: f64,
}

/// FFprobe JSON output for `-show_entries stream=...`.
#[derive(Debug, Deserialize)]
struct StreamProbe {
    #[serde(default)]
    streams: Vec<ProbedStream>,
}

#[derive(Debug, Deserialize)]
struct ProbedStream {
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

/// FFprobe JSON output for `-show_entries format=duration`.
#[derive(Debug, Deserialize)]
struct FormatProbe {
    format: Option<ProbedFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbedFormat {
    duration: Option<String>,
}

/// Probe the first video stream for its frame rate and duration.
pub async fn probe_stream(runner: &dyn MediaRunner, path: impl AsRef<Path>) -> MediaResult<StreamInfo> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let invocation = Invocation::new(
        Tool::Ffprobe,
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-select_streams".to_string(),
            "v:0".to_string(),
            "-show_entries".to_string(),
            "stream=r_frame_rate,duration".to_string(),
            "-of".to_string(),
            "json".to_string(),
            path.to_string_lossy().to_string(),
        ],
    );

    let output = runner.run(&invocation).await?;
    parse_stream_probe(&output.stdout)
}

/// Probe the container duration in seconds.
pub async fn probe_duration(runner: &dyn MediaRunner, path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let invocation = Invocation::new(
        Tool::Ffprobe,
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "json".to_string(),
            path.to_string_lossy().to_string(),
        ],
    );

    let output = runner.run(&invocation).await?;
    parse_format_duration(&output.stdout)
}

fn parse_stream_probe(stdout: &[u8]) -> MediaResult<StreamInfo> {
    let probe: StreamProbe = serde_json::from_slice(stdout)?;

    let stream = probe
        .streams
        .first()
        .ok_or_else(|| MediaError::invalid_probe("No video stream found"))?;

    let fps = stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .ok_or_else(|| {
            MediaError::invalid_probe(format!("Unparseable frame rate: {:?}", stream.r_frame_rate))
        })?;

    let duration = stream
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(StreamInfo { fps, duration })
}

fn parse_format_duration(stdout: &[u8]) -> MediaResult<f64> {
    let probe: FormatProbe = serde_json::from_slice(stdout)?;

    probe
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| MediaError::invalid_probe("Missing container duration"))
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
pub fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok()
}
