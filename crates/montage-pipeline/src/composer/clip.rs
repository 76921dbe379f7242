//! Per-interval clip production.
//!
//! Each interval goes through commentary, narration, trim and overlay. A
//! failure at narration, trim or overlay drops the interval; commentary
//! failures fall back to a stock line instead.

use std::fmt;
use std::path::{Path, PathBuf};

use montage_media::{overlay_narration, remove_file_quietly, remove_files_quietly, trim_stream_copy};
use montage_models::{ClipResult, Interval};
use montage_services::AudioFormat;

use super::commentary::generate_commentary;
use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::logging::StageLogger;
use crate::metrics;

/// Sub-step at which an interval was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipStep {
    Narration,
    Trim,
    Overlay,
}

impl ClipStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipStep::Narration => "narration",
            ClipStep::Trim => "trim",
            ClipStep::Overlay => "overlay",
        }
    }
}

impl fmt::Display for ClipStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finished clip on disk.
#[derive(Debug, Clone)]
pub struct ProducedClip {
    pub result: ClipResult,
    pub path: PathBuf,
}

/// Scratch file names for interval `index`.
struct ClipFiles {
    narration: PathBuf,
    trimmed: PathBuf,
    final_clip: PathBuf,
}

impl ClipFiles {
    fn new(scratch: &Path, index: usize, format: AudioFormat) -> Self {
        Self {
            narration: scratch.join(format!("commentary_{}.{}", index, format.extension())),
            trimmed: scratch.join(format!("clip_{}.mp4", index)),
            final_clip: scratch.join(format!("final_{}.mp4", index)),
        }
    }
}

/// Produce the narrated clip for `interval`, or `None` if it was dropped.
///
/// Only `final_{index}.mp4` survives a successful call; nothing survives a
/// failed one.
pub async fn produce_clip(
    ctx: &PipelineContext,
    video: &Path,
    scratch: &Path,
    index: usize,
    interval: Interval,
    logger: &StageLogger,
) -> Option<ProducedClip> {
    let commentary = generate_commentary(ctx.text.as_ref(), logger).await;
    let files = ClipFiles::new(scratch, index, AudioFormat::Mp3);

    let outcome = run_steps(ctx, video, &files, interval, &commentary).await;
    remove_files_quietly([&files.narration, &files.trimmed]).await;

    match outcome {
        Ok(()) => {
            metrics::record_clip_composed();
            logger.log_progress(&format!(
                "clip {} ready ({:.1}s - {:.1}s): {}",
                index + 1,
                interval.start,
                interval.end,
                commentary
            ));
            Some(ProducedClip {
                result: ClipResult::new(index as u32 + 1, interval, commentary),
                path: files.final_clip,
            })
        }
        Err((step, message)) => {
            remove_file_quietly(&files.final_clip).await;
            metrics::record_clip_skipped(step.as_str());
            logger.log_warning(&format!(
                "skipping clip {} at {}: {}",
                index + 1,
                step,
                message
            ));
            None
        }
    }
}

async fn run_steps(
    ctx: &PipelineContext,
    video: &Path,
    files: &ClipFiles,
    interval: Interval,
    commentary: &str,
) -> Result<(), (ClipStep, String)> {
    let audio = ctx
        .speech
        .synthesize(commentary, &ctx.config.narration_voice, AudioFormat::Mp3)
        .await
        .map_err(|e| {
            (
                ClipStep::Narration,
                PipelineError::transient("narration", e).to_string(),
            )
        })?;
    tokio::fs::write(&files.narration, audio)
        .await
        .map_err(|e| (ClipStep::Narration, e.to_string()))?;

    trim_stream_copy(ctx.media.as_ref(), video, &files.trimmed, interval)
        .await
        .map_err(|e| (ClipStep::Trim, e.to_string()))?;

    overlay_narration(
        ctx.media.as_ref(),
        &files.trimmed,
        &files.narration,
        &files.final_clip,
    )
    .await
    .map_err(|e| (ClipStep::Overlay, e.to_string()))?;

    Ok(())
}
