//! Transparency detection.
//!
//! "Has an alpha channel" and "has transparency" are different questions: an
//! RGBA screenshot whose alpha is 255 everywhere is opaque and belongs in a
//! JPEG. Only a pixel strictly below the fully-opaque value counts, and the
//! whole channel is scanned since one such pixel anywhere is enough.

use crate::model::{CanonicalMode, ColorMode, DecodedImage};
use crate::pipeline::codec::ImageCodec;
use image::DynamicImage;
use tracing::warn;

/// Decide whether `image` carries meaningful transparency.
///
/// Palette images declaring a transparent index answer `true` without a
/// scan. Palette images without that flag are expanded to RGBA through the
/// codec and scanned; if the codec cannot expand them the image is treated
/// as opaque and the failure is logged.
pub fn has_transparency(image: &DecodedImage, codec: &dyn ImageCodec) -> bool {
    match image.mode() {
        ColorMode::Rgba | ColorMode::GrayAlpha | ColorMode::PaletteAlpha => {
            alpha_below_opaque(image.pixels())
        }
        ColorMode::Palette => {
            if image.palette_transparency() {
                return true;
            }
            match codec.convert_mode(image, CanonicalMode::Rgba) {
                Ok(rgba) => alpha_below_opaque(rgba.pixels()),
                Err(e) => {
                    warn!("RGBA view of palette image unavailable, treating as opaque: {e}");
                    false
                }
            }
        }
        _ => false,
    }
}

/// Full scan: is any alpha sample below the type's opaque maximum?
///
/// Buffers without an alpha channel are opaque by definition.
pub fn alpha_below_opaque(pixels: &DynamicImage) -> bool {
    match pixels {
        DynamicImage::ImageLumaA8(buf) => buf.pixels().any(|p| p.0[1] < u8::MAX),
        DynamicImage::ImageRgba8(buf) => buf.pixels().any(|p| p.0[3] < u8::MAX),
        DynamicImage::ImageLumaA16(buf) => buf.pixels().any(|p| p.0[1] < u16::MAX),
        DynamicImage::ImageRgba16(buf) => buf.pixels().any(|p| p.0[3] < u16::MAX),
        DynamicImage::ImageRgba32F(buf) => buf.pixels().any(|p| p.0[3] < 1.0),
        other if other.color().has_alpha() => other.to_rgba8().pixels().any(|p| p.0[3] < u8::MAX),
        _ => false,
    }
}
