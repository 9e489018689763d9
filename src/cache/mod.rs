mod freshness;
mod key;
mod metadata;

pub use freshness::{FreshnessPolicy, thumbnails_fresh};
pub use key::{cache_key_for_uri, compute_cache_key, thumbnail_path};
pub use metadata::{SOFTWARE, THUMB_MTIME, THUMB_URI, ThumbnailMetadata, read_thumbnail_metadata};
