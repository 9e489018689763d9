use std::path::Path;

use log::debug;

use super::{read_thumbnail_metadata, thumbnail_path};
use crate::config::SizeTier;

/// When an existing thumbnail counts as fresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FreshnessPolicy {
    /// The file exists for every tier. A source edited in place keeps its
    /// old thumbnails until a forced run.
    #[default]
    Exists,
    /// The file exists for every tier and its `Thumb::MTime` matches the source.
    MTime,
}

/// True when every enabled tier already has a thumbnail for `key`.
pub fn thumbnails_fresh(
    source_mtime: u64,
    output_base: &Path,
    key: &str,
    tiers: &[SizeTier],
    policy: FreshnessPolicy,
) -> bool {
    tiers.iter().filter(|t| t.enabled).all(|tier| {
        let path = thumbnail_path(output_base, &tier.name, key);
        if !path.exists() {
            debug!("Thumbnail does not exist: {}", path.display());
            return false;
        }

        match policy {
            FreshnessPolicy::Exists => true,
            FreshnessPolicy::MTime => match read_thumbnail_metadata(&path) {
                Ok(meta) if meta.mtime == Some(source_mtime) => true,
                Ok(meta) => {
                    debug!(
                        "Thumb::MTime mismatch for {}: thumbnail={:?} source={}",
                        path.display(),
                        meta.mtime,
                        source_mtime
                    );
                    false
                }
                Err(e) => {
                    debug!("Unreadable thumbnail {}: {:#}", path.display(), e);
                    false
                }
            },
        }
    })
}
