use std::path::{Path, PathBuf};

use anyhow::Result;
use image::DynamicImage;
use log::debug;
use rayon::prelude::*;

use super::{LabelFont, draw_label, encode_png, resize_to_tier, write_atomic};
use crate::cache::{SOFTWARE, THUMB_MTIME, THUMB_URI, thumbnail_path};
use crate::cli::CompressionLevel;
use crate::config::{SizeTier, ThumbConfig};
use crate::source::{SourceImage, is_labeled};

/// One encoded thumbnail, ready to be written.
#[derive(Debug, Clone)]
pub struct RenderedThumbnail {
    pub tier: String,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Produces the per-tier PNGs for a decoded image.
#[derive(Debug, Clone)]
pub struct Renderer {
    tiers: Vec<SizeTier>,
    font: Option<LabelFont>,
    software: String,
    compress: Option<CompressionLevel>,
}

impl Renderer {
    /// Build a renderer, loading the label font when labels are enabled.
    pub fn new(config: &ThumbConfig) -> Result<Self> {
        let font = if config.label {
            let font = LabelFont::load(&config.font)?;
            debug!("Loaded label font {}", font.path().display());
            Some(font)
        } else {
            None
        };
        Ok(Self::with_font(config, font))
    }

    /// Build a renderer with an already loaded font; `None` disables labels.
    pub fn with_font(config: &ThumbConfig, font: Option<LabelFont>) -> Self {
        Self {
            tiers: config.active_tiers().cloned().collect(),
            font,
            software: config.software.clone(),
            compress: config.compress,
        }
    }

    pub fn tiers(&self) -> &[SizeTier] {
        &self.tiers
    }

    /// Render every enabled tier. Tiers are independent and rendered in parallel;
    /// the result keeps the configured tier order.
    pub fn render(
        &self,
        image: &DynamicImage,
        source: &SourceImage,
    ) -> Result<Vec<RenderedThumbnail>> {
        let text = [
            (THUMB_URI, source.uri.clone()),
            (THUMB_MTIME, source.mtime.to_string()),
            (SOFTWARE, self.software.clone()),
        ];

        self.tiers
            .par_iter()
            .map(|tier| self.render_tier(image, tier, source, &text))
            .collect()
    }

    /// Render every tier and write it under `output_base`.
    pub fn render_to_disk(
        &self,
        image: &DynamicImage,
        source: &SourceImage,
        output_base: &Path,
    ) -> Result<Vec<PathBuf>> {
        self.render(image, source)?
            .into_iter()
            .map(|thumb| {
                let path = thumbnail_path(output_base, &thumb.tier, &source.key);
                write_atomic(&path, &thumb.png)?;
                debug!(
                    "Wrote {} ({}x{})",
                    path.display(),
                    thumb.width,
                    thumb.height
                );
                Ok(path)
            })
            .collect()
    }

    fn render_tier(
        &self,
        image: &DynamicImage,
        tier: &SizeTier,
        source: &SourceImage,
        text: &[(&str, String)],
    ) -> Result<RenderedThumbnail> {
        let mut thumb = resize_to_tier(image, tier);

        if let Some(font) = &self.font {
            if is_labeled(&source.extension) {
                thumb = draw_label(
                    thumb,
                    &source.label_text(),
                    font,
                    tier.font_size,
                    tier.label_padding(),
                );
            }
        }

        let png = encode_png(&thumb, text, self.compress, &source.path)?;

        Ok(RenderedThumbnail {
            tier: tier.name.clone(),
            width: thumb.width(),
            height: thumb.height(),
            png,
        })
    }
}
