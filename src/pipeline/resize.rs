//! Fit an image inside a square bounding box, downscale only.

use crate::config::ResizeFilter;
use crate::model::NormalizedImage;
use crate::pipeline::codec::ImageCodec;
use tracing::debug;

/// Target dimensions for fitting `width` × `height` inside `max` × `max`.
///
/// Images already inside the box keep their size. Otherwise the longer side
/// becomes `max` and the shorter side is scaled by the same ratio, rounded
/// down and never below 1.
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }

    let (longer, shorter) = if width > height {
        (width, height)
    } else {
        (height, width)
    };
    let (l, s, m) = (u64::from(longer), u64::from(shorter), u64::from(max));
    // s * m < 2^64, and s <= l keeps the quotient within m
    let scaled = ((s * m / l) as u32).max(1);

    if width > height {
        (max, scaled)
    } else {
        (scaled, max)
    }
}

/// Downscale `image` to fit `max_dimension`, or return it untouched.
pub fn resize(
    image: NormalizedImage,
    max_dimension: u32,
    filter: ResizeFilter,
    codec: &dyn ImageCodec,
) -> NormalizedImage {
    let (width, height) = (image.width(), image.height());
    let (new_width, new_height) = fit_within(width, height, max_dimension);
    if (new_width, new_height) == (width, height) {
        return image;
    }

    debug!(
        "Resizing {}x{} → {}x{} ({:?})",
        width, height, new_width, new_height, filter
    );
    let resized = codec.resample(image.pixels(), new_width, new_height, filter);
    NormalizedImage::new(image.mode(), resized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CanonicalMode;
    use crate::pipeline::codec::ImageCrateCodec;
    use image::{DynamicImage, Rgb, RgbImage};

    #[test]
    fn inside_the_box_is_untouched() {
        assert_eq!(fit_within(1000, 1000, 1000), (1000, 1000));
        assert_eq!(fit_within(640, 480, 1000), (640, 480));
        assert_eq!(fit_within(1, 1, 1000), (1, 1));
    }

    #[test]
    fn landscape_and_portrait() {
        assert_eq!(fit_within(2000, 1000, 1000), (1000, 500));
        assert_eq!(fit_within(1000, 3000, 1000), (333, 1000));
        assert_eq!(fit_within(1500, 1500, 1000), (1000, 1000));
    }

    #[test]
    fn shorter_side_rounds_down() {
        // 999 * 1000 / 1001 = 998.0…
        assert_eq!(fit_within(1001, 999, 1000), (1000, 998));
        // 2000 * 1000 / 3000 = 666.67
        assert_eq!(fit_within(3000, 2000, 1000), (1000, 666));
        // 5 * 1000 / 2000 = 2.5
        assert_eq!(fit_within(2000, 5, 1000), (1000, 2));
        assert_eq!(fit_within(1999, 3000, 1000), (666, 1000));
    }

    #[test]
    fn extreme_dimensions_do_not_overflow() {
        assert_eq!(
            fit_within(u32::MAX, u32::MAX - 1, u32::MAX - 1),
            (u32::MAX - 1, u32::MAX - 2)
        );
        assert_eq!(fit_within(u32::MAX, u32::MAX, 1), (1, 1));
    }

    #[test]
    fn degenerate_aspect_clamps_to_one_pixel() {
        assert_eq!(fit_within(5000, 1, 1000), (1000, 1));
        assert_eq!(fit_within(1, 100_000, 1000), (1, 1000));
    }

    #[test]
    fn only_one_side_over_the_limit() {
        assert_eq!(fit_within(1200, 10, 1000), (1000, 8));
        assert_eq!(fit_within(10, 1001, 1000), (10, 1000));
    }

    #[test]
    fn resize_produces_fitted_buffer() {
        let img = NormalizedImage::new(
            CanonicalMode::Rgb,
            DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 120, Rgb([50, 60, 70]))),
        );
        let out = resize(img, 100, ResizeFilter::Lanczos3, &ImageCrateCodec);
        assert_eq!((out.width(), out.height()), (100, 40));
        assert_eq!(out.mode(), CanonicalMode::Rgb);
    }

    #[test]
    fn resize_is_noop_inside_box() {
        let img = NormalizedImage::new(
            CanonicalMode::Rgb,
            DynamicImage::ImageRgb8(RgbImage::from_pixel(30, 12, Rgb([50, 60, 70]))),
        );
        let out = resize(img.clone(), 100, ResizeFilter::Lanczos3, &ImageCrateCodec);
        assert_eq!(out.pixels(), img.pixels());
    }
}
