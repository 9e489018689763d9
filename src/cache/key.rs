use std::path::{Path, PathBuf};

use anyhow::Result;
use url::Url;

use crate::error::ThumbError;

/// Compute the canonical `file://` URI of `path` and its cache key.
///
/// The path is resolved (symlinks, `..`, relative components) first, so every
/// spelling of the same file maps to the same key.
pub fn compute_cache_key(path: &Path) -> Result<(String, String)> {
    let resolved = path
        .canonicalize()
        .map_err(|e| ThumbError::decode(path, format!("cannot resolve path: {}", e)))?;

    let uri = Url::from_file_path(&resolved)
        .map_err(|()| ThumbError::decode(path, "path cannot be expressed as a file URI"))?
        .to_string();
    let key = cache_key_for_uri(&uri);

    Ok((uri, key))
}

/// Lowercase hex MD5 of the URI, as the freedesktop thumbnail cache names files.
pub fn cache_key_for_uri(uri: &str) -> String {
    format!("{:x}", md5::compute(uri.as_bytes()))
}

/// `<output_base>/<tier>/<key>.png`
pub fn thumbnail_path(output_base: &Path, tier: &str, key: &str) -> PathBuf {
    output_base.join(tier).join(format!("{}.png", key))
}
