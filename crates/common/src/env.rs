//! Environment/runtime helpers
//!
//! Sanity checks to ensure the picture seed file is usable at startup.

use std::path::Path;

use tracing::warn;

/// Check the seed file exists; when write-back is enabled also make sure its
/// parent directory exists so the first save does not fail.
pub async fn ensure_seed_file(seed_path: &Path, persist: bool) -> anyhow::Result<()> {
    if tokio::fs::metadata(seed_path).await.is_err() {
        warn!(path = %seed_path.display(), "picture seed file not found; starting with an empty collection");
    }
    if persist {
        if let Some(parent) = seed_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
