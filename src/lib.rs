//! # image-normalize
//!
//! Turn arbitrary user-supplied images into a predictable form: RGB or RGBA
//! pixels, no side longer than a configured maximum (1000 px by default),
//! encoded as JPEG when opaque and PNG when transparent.
//!
//! ## Pipeline Overview
//!
//! ```text
//! bytes
//!  │
//!  ├─ 1. Input      read a file or download a URL
//!  ├─ 2. Upscale    optional enlargement before anything else
//!  ├─ 3. Decode     sniff the container, record the declared colour mode
//!  ├─ 4. Normalize  palette/gray/CMYK/… → RGB or RGBA
//!  ├─ 5. Resize     longer side ≤ max_dimension, aspect preserved
//!  └─ 6. Encode     PNG if any pixel is translucent, else JPEG (q95)
//! ```
//!
//! A failure in any step affects only that image; batches always produce one
//! [`ConversionOutcome`] per input, in input order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use image_normalize::{convert_batch, InputImage, NormalizeConfig};
//!
//! let config = NormalizeConfig::builder().max_dimension(800).build().unwrap();
//! let inputs = vec![InputImage::new("cat.webp", std::fs::read("cat.webp").unwrap())];
//! let output = convert_batch(&inputs, &config);
//! for img in output.converted() {
//!     println!("{} → {} {}x{}", img.source_name, img.filename, img.width, img.height);
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `imgnorm` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! image-normalize = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod formats;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;
pub mod upscale;

#[cfg(test)]
mod test_support;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{NormalizeConfig, NormalizeConfigBuilder, ResizeFilter, DEFAULT_MAX_DIMENSION};
pub use convert::{
    convert_batch, convert_batch_async, convert_batch_with_codec, convert_sources,
    convert_sources_sync, process, process_with_codec, write_outcomes,
};
pub use error::{ItemError, NormalizeError, UpscaleError};
pub use formats::SourceFormat;
pub use model::{CanonicalMode, ColorMode, DecodedImage, NormalizedImage, OutputFormat};
pub use output::{BatchOutput, BatchStats, ConversionOutcome, ConvertedImage, FailedImage};
pub use pipeline::codec::{ImageCodec, ImageCrateCodec};
pub use pipeline::input::{expand_inputs, InputImage, InputSource};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_images_stream, convert_stream, OutcomeStream};
pub use upscale::{ResampleUpscaler, Upscaler};
