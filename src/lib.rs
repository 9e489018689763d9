pub mod cache;
pub mod cli;
pub mod config;
pub mod decode;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod source;

pub use cache::{FreshnessPolicy, compute_cache_key, thumbnails_fresh};
pub use cli::{CliArgs, CompressionLevel};
pub use config::{SizeTier, ThumbConfig};
pub use decode::{Decoder, ExifToolExtractor, PreviewExtractor};
pub use error::ThumbError;
pub use pipeline::{BatchReport, ErrorReport, Pipeline, WorkItem, process_batch};
pub use render::Renderer;
pub use source::{SourceImage, collect_image_paths};
