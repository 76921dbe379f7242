//! Fixed-rate frame sampling.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::command::{FfmpegCommand, MediaRunner};
use crate::error::MediaResult;

/// Frames sampled per second of source video.
pub const SAMPLE_FPS: u32 = 1;

/// File name prefix of sampled frames.
const FRAME_PREFIX: &str = "frame_";

/// Build the frame sampling command (`fps=1`, high quality JPEG).
pub fn sample_frames_command(video: &Path, frames_dir: &Path) -> FfmpegCommand {
    FfmpegCommand::new(video, frames_dir.join(format!("{FRAME_PREFIX}%04d.jpg")))
        .video_filter(format!("fps={}", SAMPLE_FPS))
        .image_quality(2)
}

/// Sample one frame per second of `video` into `frames_dir`.
///
/// Returns the frame files ordered by frame number, so index `i` of the
/// result is the frame for second `i`.
pub async fn sample_frames(
    runner: &dyn MediaRunner,
    video: impl AsRef<Path>,
    frames_dir: impl AsRef<Path>,
) -> MediaResult<Vec<PathBuf>> {
    let video = video.as_ref();
    let frames_dir = frames_dir.as_ref();

    tokio::fs::create_dir_all(frames_dir).await?;
    sample_frames_command(video, frames_dir).run(runner).await?;

    let frames = list_frames(frames_dir).await?;
    info!("Extracted {} frames from {}", frames.len(), video.display());
    Ok(frames)
}

/// List sampled frame files in `frames_dir`, ordered by frame number.
pub async fn list_frames(frames_dir: impl AsRef<Path>) -> MediaResult<Vec<PathBuf>> {
    let mut numbered = Vec::new();
    let mut entries = tokio::fs::read_dir(frames_dir.as_ref()).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if let Some(number) = frame_number(&path) {
            numbered.push((number, path));
        }
    }

    numbered.sort_by_key(|(number, _)| *number);
    Ok(numbered.into_iter().map(|(_, path)| path).collect())
}

/// Parse the sequence number out of `frame_0042.jpg`.
fn frame_number(path: &Path) -> Option<u64> {
    if path.extension()?.to_str()? != "jpg" {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix(FRAME_PREFIX)?
        .parse()
        .ok()
}
