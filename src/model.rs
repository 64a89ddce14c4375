//! In-memory image types passed between pipeline stages.
//!
//! A [`DecodedImage`] is what the codec hands us: pixels plus the colour mode
//! the *container* declared, which is often richer than the pixel buffer
//! itself (a palette PNG is expanded to RGB/RGBA by the decoder, a CMYK JPEG
//! is already converted to RGB). The normalizer decides on the declared mode
//! and only ever produces a [`NormalizedImage`] in one of two layouts.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel layout reported by the decoder for the source container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    /// Indexed palette without per-pixel alpha.
    Palette,
    /// Indexed palette with per-pixel alpha.
    PaletteAlpha,
    /// Grayscale.
    Gray,
    /// Grayscale with alpha.
    GrayAlpha,
    /// 1-bit black and white.
    Bilevel,
    Rgb,
    Rgba,
    /// Four-channel print layout.
    Cmyk,
    /// Anything else the decoder reports (16-bit, float, BGR, alpha-only …).
    Other(String),
}

impl ColorMode {
    /// Short label used in logs and in the CLI report.
    pub fn label(&self) -> &str {
        match self {
            ColorMode::Palette => "P",
            ColorMode::PaletteAlpha => "PA",
            ColorMode::Gray => "L",
            ColorMode::GrayAlpha => "LA",
            ColorMode::Bilevel => "1",
            ColorMode::Rgb => "RGB",
            ColorMode::Rgba => "RGBA",
            ColorMode::Cmyk => "CMYK",
            ColorMode::Other(name) => name,
        }
    }

    /// Whether the decoder promises a per-pixel alpha channel for this mode.
    pub fn has_alpha_channel(&self) -> bool {
        matches!(
            self,
            ColorMode::Rgba | ColorMode::GrayAlpha | ColorMode::PaletteAlpha
        )
    }

    /// Whether the mode *name* advertises an alpha channel.
    ///
    /// Only consulted for [`ColorMode::Other`]; names are upper-case so an
    /// `A` anywhere means alpha (`RGBA16`, `LA16`, `BGRA8`, `A8`).
    pub fn name_signals_alpha(&self) -> bool {
        self.label().contains('A')
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The two layouts every image is reduced to before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalMode {
    Rgb,
    Rgba,
}

impl CanonicalMode {
    pub fn as_color_mode(self) -> ColorMode {
        match self {
            CanonicalMode::Rgb => ColorMode::Rgb,
            CanonicalMode::Rgba => ColorMode::Rgba,
        }
    }
}

impl fmt::Display for CanonicalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_color_mode().label())
    }
}

/// Container format of an encoded result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => ".jpg",
            OutputFormat::Png => ".png",
        }
    }

    /// The only layout this format is ever written from.
    pub fn canonical_mode(self) -> CanonicalMode {
        match self {
            OutputFormat::Jpeg => CanonicalMode::Rgb,
            OutputFormat::Png => CanonicalMode::Rgba,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Jpeg => f.write_str("JPEG"),
            OutputFormat::Png => f.write_str("PNG"),
        }
    }
}

/// A decoded image together with the metadata the normalizer decides on.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    mode: ColorMode,
    pixels: DynamicImage,
    palette_transparency: bool,
}

impl DecodedImage {
    pub fn new(mode: ColorMode, pixels: DynamicImage) -> Self {
        Self {
            mode,
            pixels,
            palette_transparency: false,
        }
    }

    /// Mark the palette as declaring a transparent index.
    pub fn with_palette_transparency(mut self, declared: bool) -> Self {
        self.palette_transparency = declared;
        self
    }

    pub fn mode(&self) -> &ColorMode {
        &self.mode
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> DynamicImage {
        self.pixels
    }

    pub fn palette_transparency(&self) -> bool {
        self.palette_transparency
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// An image reduced to RGB or RGBA. Only the pipeline constructs these.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    mode: CanonicalMode,
    pixels: DynamicImage,
}

impl NormalizedImage {
    /// Wrap pixels already laid out as `mode`.
    ///
    /// The buffer is coerced to the 8-bit layout matching `mode` so the
    /// encoder never sees anything else.
    pub(crate) fn new(mode: CanonicalMode, pixels: DynamicImage) -> Self {
        let pixels = match (mode, pixels) {
            (CanonicalMode::Rgb, p @ DynamicImage::ImageRgb8(_)) => p,
            (CanonicalMode::Rgba, p @ DynamicImage::ImageRgba8(_)) => p,
            (CanonicalMode::Rgb, p) => DynamicImage::ImageRgb8(p.to_rgb8()),
            (CanonicalMode::Rgba, p) => DynamicImage::ImageRgba8(p.to_rgba8()),
        };
        Self { mode, pixels }
    }

    pub fn mode(&self) -> CanonicalMode {
        self.mode
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Hand the pixels back to the codec for another mode conversion.
    pub(crate) fn into_decoded(self) -> DecodedImage {
        DecodedImage::new(self.mode.as_color_mode(), self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{RgbImage, RgbaImage};

    #[test]
    fn other_mode_alpha_from_name() {
        assert!(ColorMode::Other("RGBA16".into()).name_signals_alpha());
        assert!(ColorMode::Other("LA16".into()).name_signals_alpha());
        assert!(!ColorMode::Other("RGB32F".into()).name_signals_alpha());
        assert!(!ColorMode::Other("L16".into()).name_signals_alpha());
    }

    #[test]
    fn output_format_pairs_with_one_mode() {
        assert_eq!(OutputFormat::Png.canonical_mode(), CanonicalMode::Rgba);
        assert_eq!(OutputFormat::Jpeg.canonical_mode(), CanonicalMode::Rgb);
        assert_eq!(OutputFormat::Jpeg.extension(), ".jpg");
    }

    #[test]
    fn normalized_coerces_buffer_layout() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
        let n = NormalizedImage::new(CanonicalMode::Rgb, rgba);
        assert!(matches!(n.pixels(), DynamicImage::ImageRgb8(_)));

        let rgb = DynamicImage::ImageRgb8(RgbImage::new(3, 1));
        let n = NormalizedImage::new(CanonicalMode::Rgba, rgb);
        assert!(matches!(n.pixels(), DynamicImage::ImageRgba8(_)));
        assert_eq!((n.width(), n.height()), (3, 1));
    }
}
