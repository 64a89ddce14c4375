//! Configuration types for image normalization.
//!
//! Every knob lives in [`NormalizeConfig`], built through its
//! [`NormalizeConfigBuilder`]. The config is request-scoped: the pipeline
//! never reads global state, so two batches with different configs can run
//! side by side.

use crate::error::NormalizeError;
use crate::progress::ProgressCallback;
use crate::upscale::Upscaler;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default bound on the longer side of every output image.
pub const DEFAULT_MAX_DIMENSION: u32 = 1000;

/// JPEG quality used for every opaque output.
pub const JPEG_QUALITY: u8 = 95;

/// Configuration for a normalization run.
///
/// Built via [`NormalizeConfig::builder()`] or using
/// [`NormalizeConfig::default()`].
///
/// # Example
/// ```rust
/// use image_normalize::{NormalizeConfig, ResizeFilter};
///
/// let config = NormalizeConfig::builder()
///     .max_dimension(1600)
///     .resize_filter(ResizeFilter::CatmullRom)
///     .concurrency(2)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_dimension, 1600);
/// ```
#[derive(Clone)]
pub struct NormalizeConfig {
    /// Bound on the longer side, in pixels. Default: 1000.
    ///
    /// Images already inside the box are left at their original size;
    /// larger ones are scaled down so the longer side equals this value.
    pub max_dimension: u32,

    /// Resampling filter for downscaling. Default: [`ResizeFilter::Lanczos3`].
    pub resize_filter: ResizeFilter,

    /// Images processed at once by the async drivers. Default: 4.
    ///
    /// Ignored by the synchronous [`crate::convert::convert_batch`].
    pub concurrency: usize,

    /// Optional enhancement step applied to the raw input before decoding.
    pub upscaler: Option<Arc<dyn Upscaler>>,

    /// Factor passed to the upscaler. Range: 2–8. Default: 2.
    pub upscale_factor: u32,

    /// Download timeout for URL inputs in seconds. Default: 60.
    pub download_timeout_secs: u64,

    /// Per-image progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            resize_filter: ResizeFilter::default(),
            concurrency: 4,
            upscaler: None,
            upscale_factor: 2,
            download_timeout_secs: 60,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for NormalizeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizeConfig")
            .field("max_dimension", &self.max_dimension)
            .field("resize_filter", &self.resize_filter)
            .field("concurrency", &self.concurrency)
            .field("upscaler", &self.upscaler.as_ref().map(|u| u.name()))
            .field("upscale_factor", &self.upscale_factor)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl NormalizeConfig {
    /// Create a new builder for `NormalizeConfig`.
    pub fn builder() -> NormalizeConfigBuilder {
        NormalizeConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`NormalizeConfig`].
pub struct NormalizeConfigBuilder {
    config: NormalizeConfig,
}

impl NormalizeConfigBuilder {
    pub fn max_dimension(mut self, px: u32) -> Self {
        self.config.max_dimension = px;
        self
    }

    pub fn resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.config.resize_filter = filter;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn upscaler(mut self, upscaler: Arc<dyn Upscaler>) -> Self {
        self.config.upscaler = Some(upscaler);
        self
    }

    pub fn upscale_factor(mut self, factor: u32) -> Self {
        self.config.upscale_factor = factor;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<NormalizeConfig, NormalizeError> {
        let c = &self.config;
        if c.max_dimension == 0 {
            return Err(NormalizeError::InvalidConfig(
                "max dimension must be ≥ 1".into(),
            ));
        }
        if !(2..=8).contains(&c.upscale_factor) {
            return Err(NormalizeError::InvalidConfig(format!(
                "upscale factor must be 2–8, got {}",
                c.upscale_factor
            )));
        }
        if c.download_timeout_secs == 0 {
            return Err(NormalizeError::InvalidConfig(
                "download timeout must be ≥ 1s".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Resampling filter used when an image is scaled down.
///
/// Nearest-neighbour is deliberately absent: it aliases badly on downscale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResizeFilter {
    /// Windowed sinc, three lobes. (default)
    #[default]
    Lanczos3,
    /// Cubic, slightly softer than Lanczos.
    CatmullRom,
    /// Gaussian blur kernel; smoothest.
    Gaussian,
    /// Linear tent filter.
    Triangle,
}

impl ResizeFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Triangle => FilterType::Triangle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = NormalizeConfig::default();
        assert_eq!(c.max_dimension, 1000);
        assert_eq!(c.resize_filter, ResizeFilter::Lanczos3);
        assert!(c.upscaler.is_none());
    }

    #[test]
    fn zero_dimension_rejected() {
        let err = NormalizeConfig::builder().max_dimension(0).build().unwrap_err();
        assert!(err.to_string().contains("max dimension"));
    }

    #[test]
    fn upscale_factor_range() {
        assert!(NormalizeConfig::builder().upscale_factor(1).build().is_err());
        assert!(NormalizeConfig::builder().upscale_factor(9).build().is_err());
        assert!(NormalizeConfig::builder().upscale_factor(4).build().is_ok());
    }

    #[test]
    fn concurrency_clamped() {
        let c = NormalizeConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn debug_hides_trait_objects() {
        let c = NormalizeConfig::builder()
            .upscaler(Arc::new(crate::upscale::ResampleUpscaler::default()))
            .build()
            .unwrap();
        let s = format!("{c:?}");
        assert!(s.contains("resample"), "got: {s}");
    }
}
