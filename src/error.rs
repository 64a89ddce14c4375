//! Error types for the image-normalize library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`NormalizeError`]: **Fatal**: the batch cannot proceed at all
//!   (invalid configuration, nothing to convert, output directory not
//!   writable). Returned as `Err(NormalizeError)`.
//!
//! * [`ItemError`]: **Non-fatal**: a single image failed (undecodable bytes,
//!   a conversion the codec refuses, an encoder error) but every other image
//!   is fine. Turned into a [`crate::output::ConversionOutcome::Failed`] so
//!   callers see partial success instead of losing the batch to one bad file.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the image-normalize library.
///
/// Per-image failures use [`ItemError`] and are reported inside
/// [`crate::output::ConversionOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum NormalizeError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The batch contained nothing to convert.
    #[error("No input images were given")]
    NoInputs,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// An input directory could not be listed.
    #[error("Cannot read input directory '{path}': {source}")]
    InputDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write a converted file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single image.
///
/// The batch continues with the next image; the message ends up in
/// [`crate::output::FailedImage::error`].
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ItemError {
    /// The bytes are not a recognisable or decodable image.
    #[error("cannot decode image: {detail}")]
    Decode { detail: String },

    /// The codec cannot produce the requested pixel layout.
    #[error("cannot convert {from} to {to}: {detail}")]
    ModeConversion {
        from: String,
        to: String,
        detail: String,
    },

    /// The encoder rejected the normalized buffer.
    #[error("cannot encode {format}: {detail}")]
    Encode { format: String, detail: String },

    /// The configured upscaler failed on this image.
    #[error("upscaling failed: {0}")]
    Upscale(String),

    /// A local input could not be read.
    #[error("cannot read input: {detail}")]
    Read { detail: String },

    /// A URL input could not be downloaded.
    #[error("download failed: {detail}")]
    Download { detail: String },

    /// The worker converting this image panicked.
    #[error("conversion task panicked: {0}")]
    Panicked(String),
}

/// Error returned by an [`crate::upscale::Upscaler`].
#[derive(Debug, Error)]
pub enum UpscaleError {
    /// The upscaler does not support the requested factor.
    #[error("unsupported scale factor {0}")]
    UnsupportedFactor(u32),

    /// The input could not be decoded by the upscaler.
    #[error("cannot decode input: {0}")]
    Decode(String),

    /// The enlarged result would exceed the upscaler's pixel budget.
    #[error("result of {width}x{height} exceeds the upscaler's limit")]
    TooLarge { width: u64, height: u64 },

    /// The enlarged image could not be re-encoded.
    #[error("cannot encode result: {0}")]
    Encode(String),
}

impl From<UpscaleError> for ItemError {
    fn from(e: UpscaleError) -> Self {
        ItemError::Upscale(e.to_string())
    }
}
