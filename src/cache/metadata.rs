use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

/// tEXt keyword holding the source URI
pub const THUMB_URI: &str = "Thumb::URI";
/// tEXt keyword holding the source mtime in seconds
pub const THUMB_MTIME: &str = "Thumb::MTime";
/// tEXt keyword naming the generator
pub const SOFTWARE: &str = "Software";

/// Provenance fields embedded in a cached thumbnail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbnailMetadata {
    pub uri: Option<String>,
    pub mtime: Option<u64>,
    pub software: Option<String>,
}

/// Read the provenance tEXt chunks of a thumbnail PNG.
///
/// Only chunks ahead of the image data are inspected, which is where
/// thumbnails written by this crate place them.
pub fn read_thumbnail_metadata(path: &Path) -> Result<ThumbnailMetadata> {
    let file = File::open(path)
        .with_context(|| format!("failed to open thumbnail {}", path.display()))?;
    let reader = png::Decoder::new(BufReader::new(file))
        .read_info()
        .with_context(|| format!("failed to read PNG header of {}", path.display()))?;

    let mut metadata = ThumbnailMetadata::default();
    for chunk in &reader.info().uncompressed_latin1_text {
        match chunk.keyword.as_str() {
            THUMB_URI => metadata.uri = Some(chunk.text.clone()),
            THUMB_MTIME => metadata.mtime = chunk.text.trim().parse().ok(),
            SOFTWARE => metadata.software = Some(chunk.text.clone()),
            _ => {}
        }
    }

    Ok(metadata)
}
