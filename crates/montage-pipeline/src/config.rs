//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use montage_media::{MixDuration, DEFAULT_MUSIC_VOLUME, DEFAULT_TRANSITION_SECS};
use montage_models::EncodingConfig;
use montage_services::DEFAULT_VOICE;
use montage_storage::DEFAULT_MUSIC_PREFIX;
use tracing::warn;

use crate::merger::BUFFER_SECS;

/// Class name that marks a highlight frame.
pub const DEFAULT_SENTINEL_LABEL: &str = "kill";

/// Minimum detection confidence, in percent.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 50.0;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory under which each stage run creates its scratch area
    pub work_dir: PathBuf,
    /// Detection label treated as a highlight (case-insensitive)
    pub sentinel_label: String,
    /// Minimum detection confidence in percent
    pub min_confidence: f32,
    /// Padding added on both sides of a detection
    pub buffer_secs: f64,
    /// Crossfade window between clips
    pub transition_secs: f64,
    /// Key prefix of background tracks
    pub music_prefix: String,
    /// Bucket holding background tracks; the source bucket when unset
    pub music_bucket: Option<String>,
    /// Background track volume
    pub music_volume: f64,
    /// Which input decides the mixed length
    pub mix_duration: MixDuration,
    /// Narration voice
    pub narration_voice: String,
    /// Bucket receiving montages; the source bucket when unset
    pub output_bucket: Option<String>,
    /// Timeout for each FFmpeg/FFprobe invocation
    pub media_timeout: Option<Duration>,
    /// Settings for re-encoding passes
    pub encoding: EncodingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir().join("montage"),
            sentinel_label: DEFAULT_SENTINEL_LABEL.to_string(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            buffer_secs: BUFFER_SECS,
            transition_secs: DEFAULT_TRANSITION_SECS,
            music_prefix: DEFAULT_MUSIC_PREFIX.to_string(),
            music_bucket: None,
            music_volume: DEFAULT_MUSIC_VOLUME,
            mix_duration: MixDuration::default(),
            narration_voice: DEFAULT_VOICE.to_string(),
            output_bucket: None,
            media_timeout: Some(Duration::from_secs(1800)),
            encoding: EncodingConfig::default(),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env_string(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparseable {}={:?}", name, raw);
            None
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut encoding = defaults.encoding.clone();
        if let Some(codec) = env_string("MONTAGE_VIDEO_CODEC") {
            encoding.codec = codec;
        }
        if let Some(preset) = env_string("MONTAGE_PRESET") {
            encoding.preset = preset;
        }
        if let Some(crf) = env_parse("MONTAGE_CRF") {
            encoding.crf = crf;
        }

        Self {
            work_dir: env_string("MONTAGE_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            sentinel_label: env_string("MONTAGE_SENTINEL_LABEL")
                .unwrap_or(defaults.sentinel_label),
            min_confidence: env_parse("MONTAGE_MIN_CONFIDENCE").unwrap_or(defaults.min_confidence),
            buffer_secs: env_parse("MONTAGE_BUFFER_SECS").unwrap_or(defaults.buffer_secs),
            transition_secs: env_parse("MONTAGE_TRANSITION_SECS")
                .unwrap_or(defaults.transition_secs),
            music_prefix: env_string("MONTAGE_MUSIC_PREFIX").unwrap_or(defaults.music_prefix),
            music_bucket: env_string("MONTAGE_MUSIC_BUCKET"),
            music_volume: env_parse("MONTAGE_MUSIC_VOLUME").unwrap_or(defaults.music_volume),
            mix_duration: env_parse("MONTAGE_MIX_DURATION").unwrap_or(defaults.mix_duration),
            narration_voice: env_string("MONTAGE_NARRATION_VOICE")
                .unwrap_or(defaults.narration_voice),
            output_bucket: env_string("MONTAGE_OUTPUT_BUCKET"),
            media_timeout: match env_parse::<u64>("MONTAGE_MEDIA_TIMEOUT_SECS") {
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
                None => defaults.media_timeout,
            },
            encoding,
        }
    }
}
