//! Optional enhancement step run before normalization.
//!
//! The batch driver calls the configured [`Upscaler`] on the raw input bytes
//! and feeds its output to the normalizer; the normalizer itself never knows
//! an upscaler exists. Remote super-resolution services and neural models
//! plug in by implementing the trait. [`ResampleUpscaler`] is the local,
//! dependency-free implementation shipped with the crate.

use crate::error::UpscaleError;
use image::imageops::FilterType;
use image::ImageFormat;
use std::io::Cursor;
use tracing::debug;

/// Enlarges an encoded image.
pub trait Upscaler: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Return an encoded image `scale_factor` times larger than `bytes`.
    fn enhance(&self, bytes: &[u8], scale_factor: u32) -> Result<Vec<u8>, UpscaleError>;
}

/// Lanczos3 enlargement, re-encoded as PNG.
#[derive(Debug, Clone)]
pub struct ResampleUpscaler {
    /// Upper bound on the pixel count of the enlarged image.
    pub max_output_pixels: u64,
}

impl Default for ResampleUpscaler {
    fn default() -> Self {
        Self {
            max_output_pixels: 64_000_000,
        }
    }
}

impl Upscaler for ResampleUpscaler {
    fn name(&self) -> &str {
        "resample"
    }

    fn enhance(&self, bytes: &[u8], scale_factor: u32) -> Result<Vec<u8>, UpscaleError> {
        if !(2..=8).contains(&scale_factor) {
            return Err(UpscaleError::UnsupportedFactor(scale_factor));
        }

        let img = image::load_from_memory(bytes).map_err(|e| UpscaleError::Decode(e.to_string()))?;
        let width = u64::from(img.width()) * u64::from(scale_factor);
        let height = u64::from(img.height()) * u64::from(scale_factor);
        let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(UpscaleError::TooLarge { width, height });
        };
        if width.saturating_mul(height) > self.max_output_pixels {
            return Err(UpscaleError::TooLarge { width, height });
        }

        let enlarged = img.resize_exact(w, h, FilterType::Lanczos3);
        debug!(
            "Upscaled {}x{} → {}x{}",
            img.width(),
            img.height(),
            width,
            height
        );

        let mut buf = Vec::new();
        enlarged
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| UpscaleError::Encode(e.to_string()))?;
        Ok(buf)
    }
}
