use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use anyhow::Result;
use image::{DynamicImage, Rgb, Rgba};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::error::ThumbError;

/// Font used for format labels, loaded once per run.
#[derive(Clone)]
pub struct LabelFont {
    font: FontArc,
    path: PathBuf,
}

impl LabelFont {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| ThumbError::FontLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| ThumbError::FontLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Self {
            font,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFont").field("path", &self.path).finish()
    }
}

/// Size of the label box for text of the given extent.
///
/// The box starts at the image corner and extends `padding` past the text on
/// the right and bottom.
pub fn label_box(text_width: u32, text_height: u32, padding: u32) -> (u32, u32) {
    (
        (text_width + padding).max(1),
        (text_height + padding).max(1),
    )
}

/// Draw white `text` on an opaque black box in the top-left corner.
pub fn draw_label(
    image: DynamicImage,
    text: &str,
    font: &LabelFont,
    font_size: u32,
    padding: u32,
) -> DynamicImage {
    let scale = PxScale::from(font_size as f32);
    let (text_width, text_height) = text_size(scale, &font.font, text);
    let (box_width, box_height) = label_box(text_width, text_height, padding);
    let rect = Rect::at(0, 0).of_size(box_width, box_height);

    match image {
        DynamicImage::ImageRgb8(mut canvas) => {
            draw_filled_rect_mut(&mut canvas, rect, Rgb([0, 0, 0]));
            draw_text_mut(&mut canvas, Rgb([255, 255, 255]), 0, 0, scale, &font.font, text);
            DynamicImage::ImageRgb8(canvas)
        }
        other => {
            let mut canvas = other.into_rgba8();
            draw_filled_rect_mut(&mut canvas, rect, Rgba([0, 0, 0, 255]));
            draw_text_mut(
                &mut canvas,
                Rgba([255, 255, 255, 255]),
                0,
                0,
                scale,
                &font.font,
                text,
            );
            DynamicImage::ImageRgba8(canvas)
        }
    }
}
