//! Filesystem helpers for scratch media files.

use std::path::Path;
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Copy `src` to `dst`, creating the destination directory if needed.
pub async fn copy_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if !src.exists() {
        return Err(MediaError::FileNotFound(src.to_path_buf()));
    }

    if let Some(parent) = dst.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    fs::copy(src, dst).await?;
    Ok(())
}

/// Remove a file, logging instead of failing.
///
/// A file that is already gone counts as removed. Returns whether the file is
/// absent afterwards.
pub async fn remove_file_quietly(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    match fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Removed scratch file");
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to remove scratch file: {}", e);
            false
        }
    }
}

/// Remove every file in `paths`, best-effort.
pub async fn remove_files_quietly<I, P>(paths: I)
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for path in paths {
        remove_file_quietly(path).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copy_file_into_new_directory() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("final_0.mp4");
        let dst = dir.path().join("out").join("composite.mp4");

        fs::write(&src, b"clip").await.unwrap();
        copy_file(&src, &dst).await.unwrap();

        assert!(src.exists(), "Source must be left in place");
        assert_eq!(fs::read(&dst).await.unwrap(), b"clip");
    }

    #[tokio::test]
    async fn test_copy_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = copy_file(dir.path().join("missing.mp4"), dir.path().join("x.mp4")).await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_quietly_tolerates_missing_files() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("clip_0.mp4");
        fs::write(&present, b"x").await.unwrap();

        remove_files_quietly([present.clone(), dir.path().join("never_written.mp3")]).await;

        assert!(!present.exists());
        assert!(remove_file_quietly(dir.path().join("never_written.mp3")).await);
    }
}
