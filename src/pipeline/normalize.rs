//! Colour-mode normalization: every source layout collapses to RGB or RGBA.
//!
//! Rules, first match wins:
//!
//! | Source mode              | Result                                  |
//! |--------------------------|-----------------------------------------|
//! | `P`, `PA`                | RGBA if transparent, else RGB           |
//! | `LA`                     | RGBA if transparent, else RGB           |
//! | `L`, `1`                 | RGB                                     |
//! | `CMYK`                   | RGB                                     |
//! | anything else but RGB(A) | RGBA if the name has `A` or transparent, else RGB; RGB if RGBA fails |
//! | `RGB`, `RGBA`            | unchanged                               |

use crate::error::ItemError;
use crate::model::{CanonicalMode, ColorMode, DecodedImage, NormalizedImage};
use crate::pipeline::codec::ImageCodec;
use crate::pipeline::transparency::has_transparency;
use tracing::{debug, warn};

/// Reduce `image` to one of the two canonical layouts.
pub fn normalize_mode(
    image: DecodedImage,
    codec: &dyn ImageCodec,
) -> Result<NormalizedImage, ItemError> {
    let target = match image.mode() {
        ColorMode::Rgb => return Ok(NormalizedImage::new(CanonicalMode::Rgb, image.into_pixels())),
        ColorMode::Rgba => {
            return Ok(NormalizedImage::new(CanonicalMode::Rgba, image.into_pixels()))
        }
        ColorMode::Palette | ColorMode::PaletteAlpha | ColorMode::GrayAlpha => {
            transparency_target(&image, codec)
        }
        ColorMode::Gray | ColorMode::Bilevel | ColorMode::Cmyk => CanonicalMode::Rgb,
        ColorMode::Other(_) => return normalize_other(image, codec),
    };

    debug!("Normalizing {} → {}", image.mode(), target);
    let converted = codec.convert_mode(&image, target)?;
    Ok(NormalizedImage::new(target, converted.into_pixels()))
}

fn transparency_target(image: &DecodedImage, codec: &dyn ImageCodec) -> CanonicalMode {
    if has_transparency(image, codec) {
        CanonicalMode::Rgba
    } else {
        CanonicalMode::Rgb
    }
}

/// Exotic decoder modes: prefer RGBA when alpha is plausible, and settle for
/// RGB when the codec cannot deliver it.
fn normalize_other(
    image: DecodedImage,
    codec: &dyn ImageCodec,
) -> Result<NormalizedImage, ItemError> {
    if image.mode().name_signals_alpha() || has_transparency(&image, codec) {
        match codec.convert_mode(&image, CanonicalMode::Rgba) {
            Ok(rgba) => {
                debug!("Normalizing {} → RGBA", image.mode());
                return Ok(NormalizedImage::new(CanonicalMode::Rgba, rgba.into_pixels()));
            }
            Err(e) => warn!("{} → RGBA failed, falling back to RGB: {e}", image.mode()),
        }
    }

    debug!("Normalizing {} → RGB", image.mode());
    let rgb = codec.convert_mode(&image, CanonicalMode::Rgb)?;
    Ok(NormalizedImage::new(CanonicalMode::Rgb, rgb.into_pixels()))
}
