//! Encoding settings for montage passes that cannot use stream copy.
//!
//! Trims, narration overlays and the first concat attempt all stream-copy.
//! Only the crossfade render and the re-encoding concat fallback encode, and
//! both use these settings so every published montage has the same codecs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// H.264/AAC settings for re-encoded output.
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EncodingConfig {
    /// FFmpeg video encoder
    pub codec: String,
    /// x264 speed/size trade-off
    pub preset: String,
    /// Constant Rate Factor, 0-51, lower is better
    pub crf: u8,
    /// FFmpeg audio encoder
    pub audio_codec: String,
    /// Audio bitrate, e.g. `192k`
    pub audio_bitrate: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: "libx264".to_string(),
            preset: "fast".to_string(),
            crf: 20,
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
        }
    }
}

impl EncodingConfig {
    /// FFmpeg output arguments selecting these codecs.
    pub fn output_args(&self) -> Vec<String> {
        vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
        ]
    }
}
