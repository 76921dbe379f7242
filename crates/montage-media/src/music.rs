//! Background music mixing.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::command::{FfmpegCommand, MediaRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters;

/// Default background track volume relative to the narration.
pub const DEFAULT_MUSIC_VOLUME: f64 = 0.2;

/// Which input decides the mixed output length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MixDuration {
    /// End with the shorter of montage and track.
    #[default]
    Shortest,
    /// Keep the full montage; the bed ends silent if the track is shorter.
    First,
}

impl MixDuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            MixDuration::Shortest => "shortest",
            MixDuration::First => "first",
        }
    }
}

impl fmt::Display for MixDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MixDuration {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shortest" => Ok(MixDuration::Shortest),
            "first" => Ok(MixDuration::First),
            other => Err(MediaError::invalid_input(format!(
                "Unknown mix duration: {}",
                other
            ))),
        }
    }
}

/// Build the command mixing `music` under the audio of `video`.
pub fn music_mix_command(
    video: impl AsRef<Path>,
    music: impl AsRef<Path>,
    output: impl AsRef<Path>,
    volume: f64,
    duration: MixDuration,
) -> FfmpegCommand {
    let cmd = FfmpegCommand::new(video, output)
        .input(music)
        .filter_complex(filters::music_bed(volume, duration.as_str()))
        .map("0:v")
        .map("[a]")
        .video_codec("copy")
        .audio_codec("aac");

    match duration {
        MixDuration::Shortest => cmd.shortest(),
        MixDuration::First => cmd,
    }
}

/// Mix a background track under `video`, writing `output`.
pub async fn mix_background_music(
    runner: &dyn MediaRunner,
    video: impl AsRef<Path>,
    music: impl AsRef<Path>,
    output: impl AsRef<Path>,
    volume: f64,
    duration: MixDuration,
) -> MediaResult<()> {
    music_mix_command(video, music, output, volume, duration)
        .run(runner)
        .await
        .map(|_| ())
}
