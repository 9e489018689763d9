use std::io::Write;
use std::path::Path;

use anyhow::Result;
use image::DynamicImage;

use crate::cli::CompressionLevel;
use crate::error::ThumbError;

/// Encode a thumbnail as 8-bit PNG with tEXt chunks, optionally compressed.
///
/// `path` is only used in error messages.
pub fn encode_png(
    image: &DynamicImage,
    text: &[(&str, String)],
    compress: Option<CompressionLevel>,
    path: &Path,
) -> Result<Vec<u8>> {
    let (color, pixels) = match image {
        DynamicImage::ImageRgb8(buf) => (png::ColorType::Rgb, buf.as_raw().clone()),
        DynamicImage::ImageRgba8(buf) => (png::ColorType::Rgba, buf.as_raw().clone()),
        other if other.color().has_alpha() => (png::ColorType::Rgba, other.to_rgba8().into_raw()),
        other => (png::ColorType::Rgb, other.to_rgb8().into_raw()),
    };

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, image.width(), image.height());
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        for (keyword, value) in text {
            encoder
                .add_text_chunk((*keyword).to_string(), value.clone())
                .map_err(|e| ThumbError::render(path, e))?;
        }

        let mut writer = encoder
            .write_header()
            .map_err(|e| ThumbError::render(path, e))?;
        writer
            .write_image_data(&pixels)
            .map_err(|e| ThumbError::render(path, e))?;
        writer.finish().map_err(|e| ThumbError::render(path, e))?;
    }

    let output_data = if let Some(level) = compress {
        // Compress with oxipng, keeping the metadata chunks
        let mut opts = match level {
            CompressionLevel::Level(n) => oxipng::Options::from_preset(n),
            CompressionLevel::Max => oxipng::Options::max_compression(),
        };
        opts.strip = oxipng::StripChunks::None;
        oxipng::optimize_from_memory(&png_data, &opts)
            .map_err(|e| ThumbError::render(path, format!("PNG compression failed: {}", e)))?
    } else {
        png_data
    };

    Ok(output_data)
}

/// Write `data` to `path` through a temp file in the same directory.
///
/// Readers see either the previous file or the complete new one. Parent
/// directories are created as needed; an existing directory is not an error.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| ThumbError::OutputWrite {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let output_error = |e: std::io::Error| ThumbError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".thumb-")
        .suffix(".png.tmp")
        .tempfile_in(dir)
        .map_err(output_error)?;
    tmp.write_all(data).map_err(output_error)?;
    tmp.as_file().sync_all().map_err(output_error)?;
    tmp.persist(path).map_err(|e| output_error(e.error))?;

    Ok(())
}
