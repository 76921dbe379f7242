//! Per-interval clip operations.
//!
//! A highlight clip is produced in two FFmpeg passes:
//! 1. [`trim_stream_copy`] cuts `[start, end]` out of the source without re-encoding
//! 2. [`overlay_narration`] replaces the clip's audio with the narration track

use std::path::Path;
use tracing::info;

use montage_models::Interval;

use crate::command::{FfmpegCommand, MediaRunner};
use crate::error::{MediaError, MediaResult};

/// Build the stream-copy trim command.
pub fn trim_command(input: &Path, output: &Path, interval: Interval) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .start_at(interval.start)
        .end_at(interval.end)
        .codec_copy()
}

/// Extract `interval` from `input` into `output` without re-encoding.
///
/// Stream copy cuts snap to keyframes, so the clip may start slightly before
/// the requested position.
pub async fn trim_stream_copy(
    runner: &dyn MediaRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    interval: Interval,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    if interval.end <= interval.start {
        return Err(MediaError::invalid_input(format!(
            "Empty interval {:.1}-{:.1}",
            interval.start, interval.end
        )));
    }

    info!(
        "Extracting clip: {} -> {} ({:.1}s - {:.1}s)",
        input.display(),
        output.display(),
        interval.start,
        interval.end
    );

    trim_command(input, output, interval).run(runner).await?;
    Ok(())
}

/// Build the narration overlay command.
///
/// Video is copied, the original audio is dropped and the narration becomes
/// the only audio stream; output stops with the shorter of the two.
pub fn overlay_command(clip: &Path, narration: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(clip, output)
        .input(narration)
        .video_codec("copy")
        .map("0:v:0")
        .map("1:a:0")
        .shortest()
}

/// Replace the audio of `clip` with `narration`.
pub async fn overlay_narration(
    runner: &dyn MediaRunner,
    clip: impl AsRef<Path>,
    narration: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    let clip = clip.as_ref();
    let narration = narration.as_ref();
    let output = output.as_ref();

    overlay_command(clip, narration, output).run(runner).await?;

    info!("Narrated clip created: {}", output.display());
    Ok(())
}
