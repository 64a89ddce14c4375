//! Progress-callback trait for per-image conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::NormalizeConfigBuilder::progress_callback`] to receive
//! events as the batch driver works through its inputs.
//!
//! # Example
//!
//! ```rust
//! use image_normalize::{ConversionProgressCallback, ConvertedImage, NormalizeConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_image_complete(&self, index: usize, total: usize, image: &ConvertedImage) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{}/{} {} ({done} done)", index + 1, total, image.filename);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = NormalizeConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ConvertedImage;
use std::sync::Arc;

/// Called by the batch drivers as each image is processed.
///
/// All methods default to no-ops. With the async drivers, image events may
/// arrive concurrently from several threads and out of input order.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first image.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before an image is decoded.
    ///
    /// `index` is the 0-based position of the image in the batch.
    fn on_image_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when an image converted successfully.
    fn on_image_complete(&self, index: usize, total: usize, image: &ConvertedImage) {
        let _ = (index, total, image);
    }

    /// Called when an image failed.
    fn on_image_error(&self, index: usize, total: usize, name: &str, error: &str) {
        let _ = (index, total, name, error);
    }

    /// Called once after every image has been attempted.
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation; the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::NormalizeConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
