mod collector;
mod source;

use std::path::Path;

pub use collector::collect_image_paths;
pub use source::SourceImage;

/// Extensions the pipeline accepts, lowercase.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "cr2", "cr3", "arw"];

/// RAW containers whose embedded preview is decoded instead of the sensor data.
pub const RAW_EXTENSIONS: &[&str] = &["cr2", "cr3", "arw"];

/// Extensions that get a format label drawn on their thumbnails.
pub const LABELED_EXTENSIONS: &[&str] = SUPPORTED_EXTENSIONS;

/// How a source file is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Camera RAW, decoded through its embedded preview
    Raw,
    /// JPEG or PNG, decoded natively
    Standard,
}

impl ImageKind {
    pub fn from_extension(extension: &str) -> Self {
        if RAW_EXTENSIONS.contains(&extension) {
            ImageKind::Raw
        } else {
            ImageKind::Standard
        }
    }
}

pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

pub fn is_supported_image(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn is_labeled(extension: &str) -> bool {
    LABELED_EXTENSIONS.contains(&extension)
}
