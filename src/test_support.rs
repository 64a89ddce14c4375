//! Codecs with deliberate failures, for exercising the fallback paths.

use crate::config::ResizeFilter;
use crate::error::ItemError;
use crate::formats::SourceFormat;
use crate::model::{CanonicalMode, DecodedImage, NormalizedImage, OutputFormat};
use crate::pipeline::codec::{ImageCodec, ImageCrateCodec};
use image::DynamicImage;

/// Behaves like [`ImageCrateCodec`] except that it cannot produce RGBA.
pub struct RefusingCodec;

impl ImageCodec for RefusingCodec {
    fn decode(&self, bytes: &[u8], hint: Option<SourceFormat>) -> Result<DecodedImage, ItemError> {
        ImageCrateCodec.decode(bytes, hint)
    }

    fn convert_mode(
        &self,
        image: &DecodedImage,
        target: CanonicalMode,
    ) -> Result<DecodedImage, ItemError> {
        match target {
            CanonicalMode::Rgba => Err(ItemError::ModeConversion {
                from: image.mode().to_string(),
                to: target.to_string(),
                detail: "refused".into(),
            }),
            CanonicalMode::Rgb => ImageCrateCodec.convert_mode(image, target),
        }
    }

    fn resample(
        &self,
        pixels: &DynamicImage,
        width: u32,
        height: u32,
        filter: ResizeFilter,
    ) -> DynamicImage {
        ImageCrateCodec.resample(pixels, width, height, filter)
    }

    fn encode(&self, image: &NormalizedImage, format: OutputFormat) -> Result<Vec<u8>, ItemError> {
        ImageCrateCodec.encode(image, format)
    }
}

/// Decodes fine but every encode fails.
pub struct BrokenEncoder;

impl ImageCodec for BrokenEncoder {
    fn decode(&self, bytes: &[u8], hint: Option<SourceFormat>) -> Result<DecodedImage, ItemError> {
        ImageCrateCodec.decode(bytes, hint)
    }

    fn convert_mode(
        &self,
        image: &DecodedImage,
        target: CanonicalMode,
    ) -> Result<DecodedImage, ItemError> {
        ImageCrateCodec.convert_mode(image, target)
    }

    fn resample(
        &self,
        pixels: &DynamicImage,
        width: u32,
        height: u32,
        filter: ResizeFilter,
    ) -> DynamicImage {
        ImageCrateCodec.resample(pixels, width, height, filter)
    }

    fn encode(&self, _image: &NormalizedImage, format: OutputFormat) -> Result<Vec<u8>, ItemError> {
        Err(ItemError::Encode {
            format: format.to_string(),
            detail: "disk full".into(),
        })
    }
}
