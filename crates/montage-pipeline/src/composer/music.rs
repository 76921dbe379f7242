//! Background track fetching for the composer.

use std::path::{Path, PathBuf};

use montage_models::SourceRef;
use montage_storage::{download_to_file, list_track_pages, pick_track};

use crate::context::PipelineContext;
use crate::logging::StageLogger;

/// Pick a background track and download it into `scratch`.
///
/// Any failure means the montage goes without music.
pub async fn fetch_background_track(
    ctx: &PipelineContext,
    source: &SourceRef,
    scratch: &Path,
    logger: &StageLogger,
) -> Option<PathBuf> {
    let bucket = ctx
        .config
        .music_bucket
        .as_deref()
        .unwrap_or(&source.bucket);

    let pages = match list_track_pages(ctx.store.as_ref(), bucket, &ctx.config.music_prefix).await {
        Ok(pages) => pages,
        Err(e) => {
            logger.log_warning(&format!("could not list background tracks: {}", e));
            return None;
        }
    };

    let key = {
        let mut rng = rand::rng();
        pick_track(&pages, &mut rng)
    };
    let Some(key) = key else {
        logger.log_progress("no background tracks available");
        return None;
    };

    let extension = Path::new(&key)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mp3");
    let local = scratch.join(format!("background.{}", extension));

    match download_to_file(ctx.store.as_ref(), bucket, &key, &local).await {
        Ok(()) => {
            logger.log_progress(&format!("using background track {}", key));
            Some(local)
        }
        Err(e) => {
            logger.log_warning(&format!("could not download background track {}: {}", key, e));
            None
        }
    }
}
