//! Frame sampling and detection.
//!
//! The source video is sampled at one frame per second and every frame is
//! sent to the detector. Frame `i` is stamped at exactly `i` seconds. A frame
//! that cannot be read or scored is skipped; only download, probe and frame
//! extraction failures fail the stage.

use std::path::Path;

use montage_media::{probe_stream, sample_frames};
use montage_models::{DetectionEnvelope, DetectionEvent, ValidatedEnvelope};
use montage_services::DetectedLabel;
use montage_storage::download_to_file;
use tracing::{debug, Instrument};

use crate::context::PipelineContext;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::StageLogger;
use crate::metrics;
use crate::scratch::{create_scratch, release_scratch};

/// Local name of the downloaded source video.
pub(crate) const SOURCE_FILE: &str = "video.mp4";

/// Keep labels naming `sentinel` (case-insensitive) at or above `min_confidence`.
pub fn matching_confidences<'a>(
    labels: &'a [DetectedLabel],
    sentinel: &'a str,
    min_confidence: f32,
) -> impl Iterator<Item = f32> + 'a {
    labels
        .iter()
        .filter(move |l| l.label.eq_ignore_ascii_case(sentinel) && l.confidence >= min_confidence)
        .map(|l| l.confidence)
}

/// Sampler stage: validated envelope in, detections out.
pub async fn sample_and_detect(
    ctx: &PipelineContext,
    input: ValidatedEnvelope,
) -> PipelineResult<DetectionEnvelope> {
    let logger = StageLogger::new(input.job_id.as_ref(), "sample");
    let span = logger.span();

    async {
        logger.log_start(&format!("{}/{}", input.source.bucket, input.source.video_key));

        let scratch = create_scratch(&ctx.config.work_dir, "sample")?;
        let detections = detect_in_scratch(ctx, &input, scratch.path(), &logger).await;
        release_scratch(scratch);
        let detections = detections?;

        metrics::record_detections(detections.len());
        logger.log_completion(&format!("{} detections", detections.len()));
        Ok(DetectionEnvelope::new(input, detections))
    }
    .instrument(span)
    .await
}

async fn detect_in_scratch(
    ctx: &PipelineContext,
    input: &ValidatedEnvelope,
    scratch: &Path,
    logger: &StageLogger,
) -> PipelineResult<Vec<DetectionEvent>> {
    let video = scratch.join(SOURCE_FILE);
    download_to_file(
        ctx.store.as_ref(),
        &input.source.bucket,
        &input.source.video_key,
        &video,
    )
    .await
    .map_err(|e| PipelineError::fatal("download source video", e))?;

    let info = probe_stream(ctx.media.as_ref(), &video)
        .await
        .map_err(|e| PipelineError::fatal("probe source video", e))?;
    logger.log_progress(&format!(
        "source is {:.2} fps, {:.1}s",
        info.fps, info.duration
    ));

    let frames = sample_frames(ctx.media.as_ref(), &video, scratch.join("frames"))
        .await
        .map_err(|e| PipelineError::fatal("extract frames", e))?;
    metrics::record_frames_sampled(frames.len());
    logger.log_progress(&format!("sampled {} frames", frames.len()));

    let config = &ctx.config;
    let mut detections = Vec::new();

    for (index, frame) in frames.iter().enumerate() {
        let bytes = match tokio::fs::read(frame).await {
            Ok(bytes) => bytes,
            Err(e) => {
                metrics::record_frame_failure();
                logger.log_warning(&format!("skipping unreadable frame {}: {}", index, e));
                continue;
            }
        };

        let labels = match ctx
            .detector
            .detect(&bytes, &input.detector_ref, config.min_confidence)
            .await
        {
            Ok(labels) => labels,
            Err(e) => {
                metrics::record_frame_failure();
                let err = PipelineError::transient("detection", e);
                logger.log_warning(&format!("skipping frame {}: {}", index, err));
                continue;
            }
        };

        let time = index as f64;
        for confidence in matching_confidences(&labels, &config.sentinel_label, config.min_confidence) {
            debug!(time, confidence, "Highlight detected");
            detections.push(DetectionEvent::new(time, f64::from(confidence)));
        }
    }

    Ok(detections)
}
