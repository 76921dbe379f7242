//! Montage publication and ledger recording.

use std::path::Path;

use montage_ledger::VideoRecord;
use montage_models::{JobId, SourceRef};
use montage_storage::{upload_from_file, VIDEO_CONTENT_TYPE};

use crate::context::PipelineContext;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::StageLogger;

/// Storage key of the montage for `source`: `{email}/output/{stem}_montage.mp4`.
pub fn montage_key(source: &SourceRef) -> String {
    format!("{}/output/{}_montage.mp4", source.email, source.file_stem())
}

/// Upload the montage; failure is fatal. Returns the bucket and key used.
pub async fn upload_montage(
    ctx: &PipelineContext,
    source: &SourceRef,
    montage: &Path,
) -> PipelineResult<(String, String)> {
    let bucket = ctx
        .config
        .output_bucket
        .clone()
        .unwrap_or_else(|| source.bucket.clone());
    let key = montage_key(source);

    upload_from_file(ctx.store.as_ref(), &bucket, &key, montage, VIDEO_CONTENT_TYPE)
        .await
        .map_err(|e| PipelineError::fatal("upload montage", e))?;

    Ok((bucket, key))
}

/// Record the published montage in the ledger, if one is configured.
///
/// The montage is already public at this point, so failures are only logged.
pub async fn record_video(
    ctx: &PipelineContext,
    source: &SourceRef,
    job_id: Option<&JobId>,
    montage_key: &str,
    logger: &StageLogger,
) {
    let Some(ledger) = ctx.ledger.as_ref() else {
        return;
    };

    // The ledger keys records by run; runs started without one get a fresh id.
    let job_id = job_id.cloned().unwrap_or_default();

    let record = VideoRecord {
        user_email: source.email.clone(),
        job_id: Some(job_id.to_string()),
        input_key: source.video_key.clone(),
        output_key: montage_key.to_string(),
    };

    match ledger.create_video_record(&record).await {
        Ok(receipt) => logger.log_progress(&format!("recorded video {}", receipt.video_id)),
        Err(e) => logger.log_error(&format!("failed to record video {}: {}", montage_key, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_montage_key() {
        let source = SourceRef::new(
            "uploads",
            "player@example.com/2024/clutch.round.mp4",
            "player@example.com",
        );
        assert_eq!(
            montage_key(&source),
            "player@example.com/output/clutch.round_montage.mp4"
        );

        let bare = SourceRef::new("uploads", "p@x.io/raw", "p@x.io");
        assert_eq!(montage_key(&bare), "p@x.io/output/raw_montage.mp4");
    }
}
