use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};

use super::{ImageKind, extension_of};
use crate::cache::compute_cache_key;

/// A source file and the attributes the pipeline derives from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Path as given by the collector
    pub path: PathBuf,
    /// `file://` URI of the canonical path
    pub uri: String,
    /// Cache key derived from `uri`
    pub key: String,
    /// Modification time in whole seconds since the epoch
    pub mtime: u64,
    /// Lowercase extension without the dot
    pub extension: String,
    pub kind: ImageKind,
}

impl SourceImage {
    pub fn open(path: &Path) -> Result<Self> {
        let (uri, key) = compute_cache_key(path)?;

        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .with_context(|| format!("failed to read modification time of {}", path.display()))?;
        // Pre-epoch timestamps clamp to zero
        let mtime = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let extension = extension_of(path).unwrap_or_default();
        let kind = ImageKind::from_extension(&extension);

        Ok(Self {
            path: path.to_path_buf(),
            uri,
            key,
            mtime,
            extension,
            kind,
        })
    }

    /// Text drawn in the thumbnail's format label, e.g. `.cr3`.
    pub fn label_text(&self) -> String {
        format!(".{}", self.extension)
    }
}
