//! Output selection: PNG for transparent images, JPEG for everything else.
//!
//! Transparency is checked again on the final, resized buffer. An RGBA image
//! whose alpha turned out to be fully opaque is flattened to RGB and written
//! as JPEG; RGB never gains an alpha channel.

use crate::error::ItemError;
use crate::model::{CanonicalMode, NormalizedImage, OutputFormat};
use crate::pipeline::codec::ImageCodec;
use crate::pipeline::transparency::alpha_below_opaque;
use std::path::Path;
use tracing::debug;

/// Encoded bytes plus what the selector decided.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

/// Pick the container from the image's transparency and encode it.
pub fn select_and_encode(
    image: NormalizedImage,
    codec: &dyn ImageCodec,
) -> Result<EncodedImage, ItemError> {
    let transparent = match image.mode() {
        CanonicalMode::Rgba => alpha_below_opaque(image.pixels()),
        CanonicalMode::Rgb => false,
    };
    let format = if transparent {
        OutputFormat::Png
    } else {
        OutputFormat::Jpeg
    };

    let target = format.canonical_mode();
    let image = if image.mode() == target {
        image
    } else {
        debug!("Reconverting {} → {} for {}", image.mode(), target, format);
        let converted = codec.convert_mode(&image.into_decoded(), target)?;
        NormalizedImage::new(target, converted.into_pixels())
    };

    let data = codec.encode(&image, format)?;
    Ok(EncodedImage {
        data,
        format,
        width: image.width(),
        height: image.height(),
    })
}

/// Stem of `original` (directories and last extension dropped) plus the
/// extension of `format`.
///
/// Both `/` and `\` count as separators, since upload names may come from
/// any platform.
pub fn output_filename(original: &str, format: OutputFormat) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("{stem}{}", format.extension())
}
