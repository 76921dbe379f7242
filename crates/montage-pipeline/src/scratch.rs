//! Per-run scratch directories.

use std::path::Path;

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};

/// Create a uniquely named scratch directory for one stage run.
///
/// The directory and everything in it is removed when the guard drops.
pub fn create_scratch(work_dir: &Path, stage: &str) -> PipelineResult<TempDir> {
    std::fs::create_dir_all(work_dir)
        .map_err(|e| PipelineError::fatal(format!("create work dir {}", work_dir.display()), e))?;

    let dir = tempfile::Builder::new()
        .prefix(&format!("{stage}-"))
        .tempdir_in(work_dir)
        .map_err(|e| PipelineError::fatal("create scratch directory", e))?;

    debug!(path = %dir.path().display(), "Created scratch directory");
    Ok(dir)
}

/// Remove a scratch directory now, logging instead of failing.
pub fn release_scratch(dir: TempDir) {
    let path = dir.path().to_path_buf();
    if let Err(e) = dir.close() {
        warn!(path = %path.display(), "Failed to remove scratch directory: {}", e);
    }
}
