use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use log::debug;

use crate::cache::{FreshnessPolicy, thumbnails_fresh};
use crate::config::ThumbConfig;
use crate::decode::{Decoder, ExifToolExtractor, PreviewExtractor};
use crate::render::Renderer;
use crate::source::SourceImage;

/// Everything a worker needs, shared read-only across the pool.
#[derive(Clone)]
pub struct Pipeline {
    pub decoder: Decoder,
    pub renderer: Renderer,
    pub freshness: FreshnessPolicy,
}

impl Pipeline {
    /// Standard pipeline: exiftool for RAW previews, font loaded from the config.
    pub fn new(config: &ThumbConfig) -> Result<Self> {
        config.validate()?;
        let extractor = ExifToolExtractor::new(&config.exiftool, config.exiftool_timeout);
        Ok(Self {
            decoder: Decoder::new(Arc::new(extractor)),
            renderer: Renderer::new(config)?,
            freshness: config.freshness,
        })
    }

    /// Pipeline with a custom preview source and an explicit renderer.
    pub fn with_parts(
        extractor: Arc<dyn PreviewExtractor>,
        renderer: Renderer,
        freshness: FreshnessPolicy,
    ) -> Self {
        Self {
            decoder: Decoder::new(extractor),
            renderer,
            freshness,
        }
    }
}

/// One file to thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub path: PathBuf,
    pub output_base: PathBuf,
    pub overwrite: bool,
}

/// What happened to a work item that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkOutcome {
    /// Thumbnails written for this many tiers
    Generated { tiers: usize },
    /// Every tier was already fresh; nothing written
    Fresh,
    /// The batch was cancelled before this item started
    Cancelled,
}

/// Run the full pipeline for one file: freshness check, decode, render, write.
pub fn generate_thumbnails(item: &WorkItem, pipeline: &Pipeline) -> Result<WorkOutcome> {
    let source = SourceImage::open(&item.path)?;

    if !item.overwrite
        && thumbnails_fresh(
            source.mtime,
            &item.output_base,
            &source.key,
            pipeline.renderer.tiers(),
            pipeline.freshness,
        )
    {
        debug!("All thumbnails already exist for: {}", item.path.display());
        return Ok(WorkOutcome::Fresh);
    }

    let image = pipeline.decoder.decode(&source)?;
    let written = pipeline
        .renderer
        .render_to_disk(&image, &source, &item.output_base)?;
    debug!(
        "Generated {} thumbnails for {}",
        written.len(),
        item.path.display()
    );

    Ok(WorkOutcome::Generated {
        tiers: written.len(),
    })
}
