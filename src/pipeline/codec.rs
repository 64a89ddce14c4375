//! The codec boundary: decode, convert, resample and encode.
//!
//! Everything the pipeline needs from an imaging library goes through
//! [`ImageCodec`], so the decision logic in the other stages can be tested
//! against a codec that misbehaves on purpose. [`ImageCrateCodec`] is the
//! production implementation on top of the `image` crate.
//!
//! ## Palette detection
//!
//! The `image` decoders expand indexed images to RGB/RGBA and do not report
//! the palette. The header is read a second time with the format's own crate:
//! `png` for the IHDR colour type and `tRNS`, `gif` for the first frame's
//! transparent index. GIFs are always palette based.

use crate::config::{ResizeFilter, JPEG_QUALITY};
use crate::error::ItemError;
use crate::formats::SourceFormat;
use crate::model::{CanonicalMode, ColorMode, DecodedImage, NormalizedImage, OutputFormat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageFormat, ImageReader};
use std::io::Cursor;
use tracing::debug;

/// Imaging operations the normalizer relies on.
pub trait ImageCodec: Send + Sync {
    /// Decode `bytes`; `hint` is used when the content cannot be sniffed.
    fn decode(&self, bytes: &[u8], hint: Option<SourceFormat>) -> Result<DecodedImage, ItemError>;

    /// Produce a copy of `image` in the requested canonical layout.
    fn convert_mode(
        &self,
        image: &DecodedImage,
        target: CanonicalMode,
    ) -> Result<DecodedImage, ItemError>;

    /// Resample to exactly `width` × `height`.
    fn resample(
        &self,
        pixels: &DynamicImage,
        width: u32,
        height: u32,
        filter: ResizeFilter,
    ) -> DynamicImage;

    /// Serialise a normalized image.
    fn encode(&self, image: &NormalizedImage, format: OutputFormat) -> Result<Vec<u8>, ItemError>;
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateCodec;

impl ImageCodec for ImageCrateCodec {
    fn decode(&self, bytes: &[u8], hint: Option<SourceFormat>) -> Result<DecodedImage, ItemError> {
        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| decode_error(e.to_string()))?;

        if reader.format().is_none() {
            if let Some(format) = hint.and_then(SourceFormat::image_format) {
                reader.set_format(format);
            }
        }
        let format = reader
            .format()
            .ok_or_else(|| decode_error("unrecognised image format".to_string()))?;

        let decoder = reader
            .into_decoder()
            .map_err(|e| decode_error(e.to_string()))?;
        let mut mode = mode_from_color_type(decoder.original_color_type());
        let pixels = DynamicImage::from_decoder(decoder).map_err(|e| decode_error(e.to_string()))?;

        let palette = match format {
            ImageFormat::Png => png_palette_info(bytes),
            ImageFormat::Gif => Some(gif_palette_info(bytes)),
            _ => None,
        };
        let mut palette_transparency = false;
        if let Some(info) = palette.filter(|p| p.indexed) {
            mode = ColorMode::Palette;
            palette_transparency = info.transparent_index;
        }

        debug!(
            "Decoded {:?} {}x{} mode={} palette_transparency={}",
            format,
            pixels.width(),
            pixels.height(),
            mode,
            palette_transparency
        );

        Ok(DecodedImage::new(mode, pixels).with_palette_transparency(palette_transparency))
    }

    fn convert_mode(
        &self,
        image: &DecodedImage,
        target: CanonicalMode,
    ) -> Result<DecodedImage, ItemError> {
        let pixels = match target {
            CanonicalMode::Rgb => DynamicImage::ImageRgb8(image.pixels().to_rgb8()),
            CanonicalMode::Rgba => DynamicImage::ImageRgba8(image.pixels().to_rgba8()),
        };
        Ok(DecodedImage::new(target.as_color_mode(), pixels))
    }

    fn resample(
        &self,
        pixels: &DynamicImage,
        width: u32,
        height: u32,
        filter: ResizeFilter,
    ) -> DynamicImage {
        pixels.resize_exact(width, height, filter.filter_type())
    }

    fn encode(&self, image: &NormalizedImage, format: OutputFormat) -> Result<Vec<u8>, ItemError> {
        if format.canonical_mode() != image.mode() {
            return Err(encode_error(
                format,
                format!("{} images are never written as {}", image.mode(), format),
            ));
        }

        let (width, height) = (image.width(), image.height());
        let mut buf = Vec::new();
        match format {
            OutputFormat::Jpeg => {
                let rgb = image
                    .pixels()
                    .as_rgb8()
                    .ok_or_else(|| encode_error(format, "expected an 8-bit RGB buffer".into()))?;
                JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
                    .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                    .map_err(|e| encode_error(format, e.to_string()))?;
            }
            OutputFormat::Png => {
                let rgba = image
                    .pixels()
                    .as_rgba8()
                    .ok_or_else(|| encode_error(format, "expected an 8-bit RGBA buffer".into()))?;
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive)
                    .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
                    .map_err(|e| encode_error(format, e.to_string()))?;
            }
        }

        debug!("Encoded {} {}x{} → {} bytes", format, width, height, buf.len());
        Ok(buf)
    }
}

fn decode_error(detail: String) -> ItemError {
    ItemError::Decode { detail }
}

fn encode_error(format: OutputFormat, detail: String) -> ItemError {
    ItemError::Encode {
        format: format.to_string(),
        detail,
    }
}

/// Map the decoder's view of the source layout onto [`ColorMode`].
fn mode_from_color_type(color: ExtendedColorType) -> ColorMode {
    use ExtendedColorType as E;
    match color {
        E::L1 => ColorMode::Bilevel,
        E::L2 | E::L4 | E::L8 => ColorMode::Gray,
        E::La1 | E::La2 | E::La4 | E::La8 => ColorMode::GrayAlpha,
        E::Rgb1 | E::Rgb2 | E::Rgb4 | E::Rgb8 => ColorMode::Rgb,
        E::Rgba1 | E::Rgba2 | E::Rgba4 | E::Rgba8 => ColorMode::Rgba,
        E::Cmyk8 => ColorMode::Cmyk,
        other => ColorMode::Other(format!("{other:?}").to_ascii_uppercase()),
    }
}

#[derive(Debug, PartialEq, Eq)]
struct PaletteInfo {
    indexed: bool,
    transparent_index: bool,
}

/// IHDR colour type and `tRNS` presence, read without decoding pixels.
///
/// `read_info` stops at the first `IDAT`, and `tRNS` must precede it.
fn png_palette_info(bytes: &[u8]) -> Option<PaletteInfo> {
    let reader = png::Decoder::new(Cursor::new(bytes)).read_info().ok()?;
    let info = reader.info();
    let indexed = info.color_type == png::ColorType::Indexed;
    Some(PaletteInfo {
        indexed,
        transparent_index: indexed && info.trns.is_some(),
    })
}

/// Transparent index of the first frame's graphic control extension.
///
/// Every GIF is indexed; an unreadable header only loses the flag.
fn gif_palette_info(bytes: &[u8]) -> PaletteInfo {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let transparent_index = options
        .read_info(Cursor::new(bytes))
        .ok()
        .is_some_and(|mut decoder| {
            let declared =
                matches!(decoder.next_frame_info(), Ok(Some(frame)) if frame.transparent.is_some());
            declared
        });
    PaletteInfo {
        indexed: true,
        transparent_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, LumaA, Rgb, RgbImage, Rgba, RgbaImage};

    fn encode_with(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format)
            .expect("encode fixture");
        buf
    }

    #[test]
    fn decodes_rgba_png() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 3, Rgba([1, 2, 3, 4])));
        let decoded = ImageCrateCodec
            .decode(&encode_with(&img, ImageFormat::Png), None)
            .expect("decode");
        assert_eq!(decoded.mode(), &ColorMode::Rgba);
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
        assert!(!decoded.palette_transparency());
    }

    #[test]
    fn decodes_gray_alpha_png() {
        let img = DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(2, 2, LumaA([9, 255])));
        let decoded = ImageCrateCodec
            .decode(&encode_with(&img, ImageFormat::Png), None)
            .expect("decode");
        assert_eq!(decoded.mode(), &ColorMode::GrayAlpha);
    }

    #[test]
    fn sixteen_bit_is_other() {
        assert_eq!(
            mode_from_color_type(ExtendedColorType::Rgba16),
            ColorMode::Other("RGBA16".into())
        );
        assert_eq!(mode_from_color_type(ExtendedColorType::L1), ColorMode::Bilevel);
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = ImageCrateCodec.decode(b"definitely not pixels", None).unwrap_err();
        assert!(matches!(err, ItemError::Decode { .. }));
    }

    #[test]
    fn truncated_png_is_decode_error() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([5, 5, 5])));
        let bytes = encode_with(&img, ImageFormat::Png);
        let err = ImageCrateCodec
            .decode(&bytes[..bytes.len() / 2], None)
            .unwrap_err();
        assert!(matches!(err, ItemError::Decode { .. }));
    }

    fn indexed_png(trns: Option<&[u8]>) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, 2, 2);
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_palette(vec![0, 0, 0, 255, 255, 255]);
            if let Some(alpha) = trns {
                encoder.set_trns(alpha.to_vec());
            }
            let mut writer = encoder.write_header().expect("png header");
            writer.write_image_data(&[0, 1, 1, 0]).expect("png data");
        }
        out
    }

    fn indexed_gif(transparent: Option<u8>) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let palette = [0, 0, 0, 255, 255, 255];
            let mut encoder = gif::Encoder::new(&mut out, 2, 2, &palette).expect("gif header");
            let frame = gif::Frame {
                width: 2,
                height: 2,
                buffer: std::borrow::Cow::Borrowed(&[0u8, 1, 1, 0][..]),
                transparent,
                ..gif::Frame::default()
            };
            encoder.write_frame(&frame).expect("gif frame");
        }
        out
    }

    #[test]
    fn png_header_of_truecolor() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        let info = png_palette_info(&encode_with(&img, ImageFormat::Png)).expect("png");
        assert_eq!(
            info,
            PaletteInfo {
                indexed: false,
                transparent_index: false
            }
        );
        assert_eq!(png_palette_info(b"GIF89a"), None);
    }

    #[test]
    fn indexed_png_reports_trns() {
        let decoded = ImageCrateCodec.decode(&indexed_png(Some(&[0])), None).expect("decode");
        assert_eq!(decoded.mode(), &ColorMode::Palette);
        assert!(decoded.palette_transparency());

        let decoded = ImageCrateCodec.decode(&indexed_png(None), None).expect("decode");
        assert_eq!(decoded.mode(), &ColorMode::Palette);
        assert!(!decoded.palette_transparency());
    }

    #[test]
    fn gif_transparent_index_is_declared() {
        let decoded = ImageCrateCodec.decode(&indexed_gif(Some(0)), None).expect("decode");
        assert_eq!(decoded.mode(), &ColorMode::Palette);
        assert!(decoded.palette_transparency());

        let decoded = ImageCrateCodec.decode(&indexed_gif(None), None).expect("decode");
        assert_eq!(decoded.mode(), &ColorMode::Palette);
        assert!(!decoded.palette_transparency());
    }

    #[test]
    fn encode_refuses_mismatched_layout() {
        let rgba = NormalizedImage::new(
            CanonicalMode::Rgba,
            DynamicImage::ImageRgba8(RgbaImage::new(1, 1)),
        );
        let err = ImageCrateCodec.encode(&rgba, OutputFormat::Jpeg).unwrap_err();
        assert!(matches!(err, ItemError::Encode { .. }));
    }

    #[test]
    fn encodes_jpeg_and_png_magic() {
        let rgb = NormalizedImage::new(
            CanonicalMode::Rgb,
            DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, Rgb([200, 10, 10]))),
        );
        let jpeg = ImageCrateCodec.encode(&rgb, OutputFormat::Jpeg).expect("jpeg");
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let rgba = NormalizedImage::new(
            CanonicalMode::Rgba,
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 0]))),
        );
        let png = ImageCrateCodec.encode(&rgba, OutputFormat::Png).expect("png");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
