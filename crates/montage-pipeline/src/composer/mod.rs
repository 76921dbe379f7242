//! Clip composer stage.
//!
//! For every interval: commentary, narration, trim and narration overlay.
//! The surviving clips are then crossfaded (or concatenated when that fails),
//! mixed with a background track when one is available, uploaded and
//! recorded in the ledger.

pub mod assembly;
pub mod clip;
pub mod commentary;
pub mod music;
pub mod publish;

use std::path::{Path, PathBuf};

use montage_media::{mix_background_music, remove_files_quietly};
use montage_models::{ComposedEnvelope, IntervalEnvelope};
use montage_storage::download_to_file;
use tracing::Instrument;

use crate::context::PipelineContext;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::StageLogger;
use crate::sampler::SOURCE_FILE;
use crate::scratch::{create_scratch, release_scratch};

pub use assembly::{assemble, AssemblyMethod};
pub use clip::{produce_clip, ClipStep, ProducedClip};
pub use commentary::{clean_commentary, FALLBACK_COMMENTARY, HYPE_PROMPT};
pub use publish::montage_key;

const COMPOSITE_FILE: &str = "composite.mp4";
const MIXED_FILE: &str = "montage.mp4";

/// Composer stage: intervals in, published montage out.
///
/// With no intervals nothing is downloaded or called.
pub async fn compose(
    ctx: &PipelineContext,
    input: IntervalEnvelope,
) -> PipelineResult<ComposedEnvelope> {
    let logger = StageLogger::new(input.job_id.as_ref(), "compose");

    if input.intervals.is_empty() {
        logger.log_completion("no intervals to compose");
        return Ok(ComposedEnvelope::empty(input.source, input.job_id));
    }

    let span = logger.span();
    async {
        logger.log_start(&format!("{} intervals", input.intervals.len()));

        let scratch = create_scratch(&ctx.config.work_dir, "compose")?;
        let result = compose_in_scratch(ctx, input, scratch.path(), &logger).await;
        release_scratch(scratch);
        result
    }
    .instrument(span)
    .await
}

async fn compose_in_scratch(
    ctx: &PipelineContext,
    input: IntervalEnvelope,
    scratch: &Path,
    logger: &StageLogger,
) -> PipelineResult<ComposedEnvelope> {
    let source = &input.source;

    let video = scratch.join(SOURCE_FILE);
    download_to_file(ctx.store.as_ref(), &source.bucket, &source.video_key, &video)
        .await
        .map_err(|e| PipelineError::fatal("download source video", e))?;

    let music = music::fetch_background_track(ctx, source, scratch, logger).await;

    let mut results = Vec::new();
    let mut clip_paths = Vec::new();
    for (index, interval) in input.intervals.iter().enumerate() {
        if let Some(clip) = produce_clip(ctx, &video, scratch, index, *interval, logger).await {
            results.push(clip.result);
            clip_paths.push(clip.path);
        }
    }

    if results.is_empty() {
        logger.log_completion("every interval was skipped, nothing to publish");
        return Ok(ComposedEnvelope::empty(input.source, input.job_id));
    }

    let composite = scratch.join(COMPOSITE_FILE);
    let method = assemble(ctx, &clip_paths, &composite, logger).await;
    remove_files_quietly(&clip_paths).await;

    match method {
        Ok(method) => logger.log_progress(&format!(
            "joined {} clips: {:?}",
            clip_paths.len(),
            method
        )),
        Err(e) => {
            logger.log_error(&format!("{}; publishing nothing", e));
            return Ok(ComposedEnvelope::empty(input.source, input.job_id));
        }
    }

    let montage = with_music(ctx, &composite, music.as_deref(), scratch, logger).await;

    let (bucket, key) = publish::upload_montage(ctx, source, &montage).await?;
    logger.log_progress(&format!("published {}/{}", bucket, key));

    publish::record_video(ctx, source, input.job_id.as_ref(), &key, logger).await;

    let envelope = ComposedEnvelope::published(input.source, input.job_id, results, key);
    logger.log_completion(&format!("{} clips in montage", envelope.total_clips));
    Ok(envelope)
}

/// Mix `music` under `composite`; returns the file to publish.
async fn with_music(
    ctx: &PipelineContext,
    composite: &Path,
    music: Option<&Path>,
    scratch: &Path,
    logger: &StageLogger,
) -> PathBuf {
    let Some(music) = music else {
        return composite.to_path_buf();
    };

    let mixed = scratch.join(MIXED_FILE);
    match mix_background_music(
        ctx.media.as_ref(),
        composite,
        music,
        &mixed,
        ctx.config.music_volume,
        ctx.config.mix_duration,
    )
    .await
    {
        Ok(()) => mixed,
        Err(e) => {
            logger.log_warning(&format!("music mix failed, publishing without music: {}", e));
            composite.to_path_buf()
        }
    }
}
