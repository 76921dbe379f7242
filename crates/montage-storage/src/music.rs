//! Background track selection.
//!
//! Selection is two-stage: a listing page is chosen uniformly among the
//! non-empty pages, then a key uniformly within that page. A key's
//! probability is therefore `1 / (pages * page_len)`, which favours keys on
//! short pages when page sizes differ.

use rand::Rng;
use tracing::debug;

use crate::error::StorageResult;
use crate::store::ObjectStore;

/// Default key prefix holding background tracks.
pub const DEFAULT_MUSIC_PREFIX: &str = "music/";

/// List candidate tracks under `prefix`, page by page.
///
/// Folder markers (keys ending in `/`) are dropped and pages left empty are
/// removed.
pub async fn list_track_pages(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
) -> StorageResult<Vec<Vec<String>>> {
    let pages: Vec<Vec<String>> = store
        .list(bucket, prefix)
        .await?
        .into_iter()
        .map(|page| page.into_iter().filter(|k| !k.ends_with('/')).collect::<Vec<_>>())
        .filter(|page| !page.is_empty())
        .collect();

    debug!(
        pages = pages.len(),
        tracks = pages.iter().map(Vec::len).sum::<usize>(),
        "Listed background tracks"
    );
    Ok(pages)
}

/// Pick a track from listing pages, or `None` if there is nothing to pick.
pub fn pick_track<R: Rng>(pages: &[Vec<String>], rng: &mut R) -> Option<String> {
    let candidates: Vec<&Vec<String>> = pages.iter().filter(|p| !p.is_empty()).collect();
    if candidates.is_empty() {
        return None;
    }

    let page = candidates[rng.random_range(0..candidates.len())];
    Some(page[rng.random_range(0..page.len())].clone())
}
