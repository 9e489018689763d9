use image::{DynamicImage, imageops::FilterType};

use crate::config::SizeTier;

/// Target size for a `width`x`height` image inside a `max_width`x`max_height` box.
///
/// Aspect ratio is preserved, neither side exceeds the box, images that
/// already fit keep their size, and no side drops below one pixel.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "scaled sides are clamped to the u32 box"
)]
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 || (width <= max_width && height <= max_height) {
        return (width, height);
    }

    let scale = (f64::from(max_width) / f64::from(width))
        .min(f64::from(max_height) / f64::from(height));

    let new_width = ((f64::from(width) * scale).round() as u32).clamp(1, max_width);
    let new_height = ((f64::from(height) * scale).round() as u32).clamp(1, max_height);
    (new_width, new_height)
}

/// Downscale a copy of `image` into the tier's bounding box with Lanczos3.
pub fn resize_to_tier(image: &DynamicImage, tier: &SizeTier) -> DynamicImage {
    let (width, height) = fit_within(image.width(), image.height(), tier.width, tier.height);
    if (width, height) == (image.width(), image.height()) {
        return image.clone();
    }
    image.resize_exact(width, height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_fit_landscape() {
        assert_eq!(fit_within(500, 300, 128, 128), (128, 77));
        assert_eq!(fit_within(500, 300, 256, 256), (256, 154));
        assert_eq!(fit_within(500, 300, 512, 512), (500, 300));
    }

    #[test]
    fn test_fit_portrait() {
        assert_eq!(fit_within(300, 600, 128, 128), (64, 128));
    }

    #[test]
    fn test_fit_never_upscales() {
        assert_eq!(fit_within(40, 20, 128, 128), (40, 20));
    }

    #[test]
    fn test_fit_extreme_aspect_keeps_one_pixel() {
        assert_eq!(fit_within(10_000, 10, 128, 128), (128, 1));
    }

    #[test]
    fn test_fit_non_square_box() {
        assert_eq!(fit_within(1000, 1000, 200, 100), (100, 100));
    }

    #[test]
    fn test_resize_to_tier_preserves_aspect() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(600, 400));
        let tier = SizeTier::new("normal", 128, 128, 20);

        let thumb = resize_to_tier(&image, &tier);
        assert_eq!((thumb.width(), thumb.height()), (128, 85));
    }

    #[test]
    fn test_resize_small_image_is_copied() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(64, 32));
        let tier = SizeTier::new("normal", 128, 128, 20);

        let thumb = resize_to_tier(&image, &tier);
        assert_eq!((thumb.width(), thumb.height()), (64, 32));
    }
}
