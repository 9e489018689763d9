use std::io::{BufRead, Cursor, Seek};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, Limits};
use log::{debug, warn};

use super::{PreviewExtractor, RawRotation};
use crate::error::ThumbError;
use crate::source::{ImageKind, SourceImage};

/// Largest accepted source dimension
const MAX_SOURCE_DIM: u32 = 65_535;
/// Decoder allocation ceiling
const MAX_DECODE_BYTES: u64 = 1024 * 1024 * 1024;

/// Turns a source file into an upright 8-bit RGB or RGBA image.
#[derive(Clone)]
pub struct Decoder {
    extractor: Arc<dyn PreviewExtractor>,
}

impl Decoder {
    pub fn new(extractor: Arc<dyn PreviewExtractor>) -> Self {
        Self { extractor }
    }

    pub fn decode(&self, source: &SourceImage) -> Result<DynamicImage> {
        let image = match source.kind {
            ImageKind::Raw => self.decode_raw(&source.path)?,
            ImageKind::Standard => decode_standard(&source.path)?,
        };
        debug!(
            "Decoded {} ({}x{})",
            source.path.display(),
            image.width(),
            image.height()
        );
        Ok(normalize(image))
    }

    /// Decode the embedded preview and rotate it by the extractor's orientation tag.
    ///
    /// The preview's own EXIF orientation is not consulted.
    fn decode_raw(&self, path: &Path) -> Result<DynamicImage> {
        let preview = self.extractor.extract_preview(path)?;

        let tag = match self.extractor.read_orientation(path) {
            Ok(tag) => tag,
            Err(e) => {
                warn!(
                    "Could not read orientation of {}, assuming none: {:#}",
                    path.display(),
                    e
                );
                None
            }
        };
        let rotation = RawRotation::from_tag(tag.as_deref());

        let reader = ImageReader::new(Cursor::new(preview))
            .with_guessed_format()
            .map_err(|e| ThumbError::decode(path, e))?;
        let (image, _) = decode_reader(reader, path)?;

        Ok(rotation.apply(image))
    }
}

/// Decode a JPEG or PNG and apply its embedded EXIF orientation.
fn decode_standard(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)
        .map_err(|e| ThumbError::decode(path, e))?
        .with_guessed_format()
        .map_err(|e| ThumbError::decode(path, e))?;

    let (mut image, orientation) = decode_reader(reader, path)?;
    image.apply_orientation(orientation);
    Ok(image)
}

fn decode_reader<R: BufRead + Seek>(
    mut reader: ImageReader<R>,
    path: &Path,
) -> Result<(DynamicImage, Orientation)> {
    reader.limits(decode_limits());

    let mut decoder = reader
        .into_decoder()
        .map_err(|e| ThumbError::decode(path, e))?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let image = DynamicImage::from_decoder(decoder).map_err(|e| ThumbError::decode(path, e))?;

    Ok((image, orientation))
}

fn decode_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_SOURCE_DIM);
    limits.max_image_height = Some(MAX_SOURCE_DIM);
    limits.max_alloc = Some(MAX_DECODE_BYTES);
    limits
}

/// Collapse every pixel format to 8-bit RGB, or RGBA when there is alpha.
fn normalize(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.into_rgba8()),
        other => DynamicImage::ImageRgb8(other.into_rgb8()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::fs;

    /// Preview extractor serving canned bytes.
    pub(crate) struct FakeExtractor {
        pub preview: Option<Vec<u8>>,
        pub orientation: Option<String>,
    }

    impl PreviewExtractor for FakeExtractor {
        fn extract_preview(&self, path: &Path) -> Result<Vec<u8>> {
            self.preview.clone().ok_or_else(|| {
                ThumbError::Subprocess {
                    program: "fake".to_string(),
                    path: path.to_path_buf(),
                    stderr: "no preview".to_string(),
                }
                .into()
            })
        }

        fn read_orientation(&self, _path: &Path) -> Result<Option<String>> {
            Ok(self.orientation.clone())
        }
    }

    pub(crate) fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([40, 120, 200]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
        out.into_inner()
    }

    /// JPEG with an APP1 EXIF segment carrying the given orientation value.
    pub(crate) fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
        let plain = jpeg_bytes(width, height);

        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"MM\x00\x2a\x00\x00\x00\x08");
        tiff.extend_from_slice(&1u16.to_be_bytes());
        tiff.extend_from_slice(&0x0112u16.to_be_bytes());
        tiff.extend_from_slice(&3u16.to_be_bytes());
        tiff.extend_from_slice(&1u32.to_be_bytes());
        tiff.extend_from_slice(&orientation.to_be_bytes());
        tiff.extend_from_slice(&[0, 0]);
        tiff.extend_from_slice(&0u32.to_be_bytes());

        let mut app1 = vec![0xff, 0xe1];
        let len = u16::try_from(2 + 6 + tiff.len()).unwrap();
        app1.extend_from_slice(&len.to_be_bytes());
        app1.extend_from_slice(b"Exif\x00\x00");
        app1.extend_from_slice(&tiff);

        let mut out = plain[..2].to_vec();
        out.extend_from_slice(&app1);
        out.extend_from_slice(&plain[2..]);
        out
    }

    fn no_raw() -> Decoder {
        Decoder::new(Arc::new(FakeExtractor {
            preview: None,
            orientation: None,
        }))
    }

    #[test]
    fn test_decode_plain_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        fs::write(&path, jpeg_bytes(50, 30)).unwrap();

        let source = SourceImage::open(&path).unwrap();
        let image = no_raw().decode(&source).unwrap();
        assert_eq!((image.width(), image.height()), (50, 30));
        assert!(matches!(image, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn test_exif_rotation_swaps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotated.jpg");
        // 6 = rotate 90 degrees clockwise
        fs::write(&path, jpeg_with_orientation(50, 30, 6)).unwrap();

        let source = SourceImage::open(&path).unwrap();
        let image = no_raw().decode(&source).unwrap();
        assert_eq!((image.width(), image.height()), (30, 50));
    }

    #[test]
    fn test_sixteen_bit_png_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.png");
        let img = image::ImageBuffer::<Rgba<u16>, _>::from_pixel(8, 4, Rgba([65535, 0, 0, 32768]));
        DynamicImage::ImageRgba16(img).save(&path).unwrap();

        let source = SourceImage::open(&path).unwrap();
        let image = no_raw().decode(&source).unwrap();
        assert!(matches!(image, DynamicImage::ImageRgba8(_)));
        assert_eq!((image.width(), image.height()), (8, 4));
    }

    #[test]
    fn test_grayscale_png_becomes_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        image::GrayImage::new(5, 5).save(&path).unwrap();

        let source = SourceImage::open(&path).unwrap();
        let image = no_raw().decode(&source).unwrap();
        assert!(matches!(image, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn test_corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"definitely not a jpeg").unwrap();

        let source = SourceImage::open(&path).unwrap();
        let err = no_raw().decode(&source).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ThumbError>(),
            Some(ThumbError::Decode { .. })
        ));
    }

    #[test]
    fn test_raw_preview_is_rotated_by_tag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0001.CR3");
        fs::write(&path, b"raw container").unwrap();

        let decoder = Decoder::new(Arc::new(FakeExtractor {
            preview: Some(jpeg_bytes(60, 40)),
            orientation: Some("Rotate 90 CW".to_string()),
        }));
        let source = SourceImage::open(&path).unwrap();
        let image = decoder.decode(&source).unwrap();
        assert_eq!((image.width(), image.height()), (40, 60));
    }

    #[test]
    fn test_raw_preview_ignores_embedded_exif() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0002.arw");
        fs::write(&path, b"raw container").unwrap();

        let decoder = Decoder::new(Arc::new(FakeExtractor {
            preview: Some(jpeg_with_orientation(60, 40, 6)),
            orientation: Some("Horizontal (normal)".to_string()),
        }));
        let source = SourceImage::open(&path).unwrap();
        let image = decoder.decode(&source).unwrap();
        assert_eq!((image.width(), image.height()), (60, 40));
    }

    #[test]
    fn test_raw_extraction_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0003.cr2");
        fs::write(&path, b"raw container").unwrap();

        let source = SourceImage::open(&path).unwrap();
        let err = no_raw().decode(&source).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ThumbError>(),
            Some(ThumbError::Subprocess { .. })
        ));
    }

    #[test]
    fn test_raw_garbage_preview_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0004.cr3");
        fs::write(&path, b"raw container").unwrap();

        let decoder = Decoder::new(Arc::new(FakeExtractor {
            preview: Some(b"garbage".to_vec()),
            orientation: None,
        }));
        let source = SourceImage::open(&path).unwrap();
        let err = decoder.decode(&source).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ThumbError>(),
            Some(ThumbError::Decode { .. })
        ));
    }

    #[test]
    fn test_rgba_passthrough() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
        assert!(matches!(normalize(img), DynamicImage::ImageRgba8(_)));
    }
}
