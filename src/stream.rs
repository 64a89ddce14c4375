//! Streaming conversion API: emit outcomes as images finish.
//!
//! Unlike [`crate::convert::convert_sources`], which returns only after the
//! whole batch is done, the functions here yield each
//! [`ConversionOutcome`] as soon as its image completes. Completion order is
//! not input order; every item carries its input index so callers can sort.

use crate::config::NormalizeConfig;
use crate::convert::{load_and_convert, spawn_item};
use crate::error::NormalizeError;
use crate::output::ConversionOutcome;
use crate::pipeline::input::{InputImage, InputSource};
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of `(input index, outcome)` pairs.
pub type OutcomeStream = Pin<Box<dyn Stream<Item = (usize, ConversionOutcome)> + Send>>;

/// Read/download and convert `sources`, yielding outcomes as they finish.
///
/// At most `config.concurrency` images are in flight. Progress callbacks
/// fire per image; batch start/complete are left to the caller, who decides
/// when the stream is done.
///
/// # Errors
/// [`NormalizeError::NoInputs`] when `sources` is empty.
pub fn convert_stream(
    sources: Vec<InputSource>,
    config: &NormalizeConfig,
) -> Result<OutcomeStream, NormalizeError> {
    if sources.is_empty() {
        return Err(NormalizeError::NoInputs);
    }
    info!("Starting streaming conversion of {} images", sources.len());

    let total = sources.len();
    let cfg = config.clone();
    let s = stream::iter(sources.into_iter().enumerate().map(move |(index, source)| {
        let cfg = cfg.clone();
        async move { (index, load_and_convert(index, total, source, cfg).await.0) }
    }))
    .buffer_unordered(config.concurrency);

    Ok(Box::pin(s))
}

/// Like [`convert_stream`] for images already in memory.
pub fn convert_images_stream(
    images: Vec<InputImage>,
    config: &NormalizeConfig,
) -> Result<OutcomeStream, NormalizeError> {
    if images.is_empty() {
        return Err(NormalizeError::NoInputs);
    }

    let total = images.len();
    let cfg = config.clone();
    let s = stream::iter(images.into_iter().enumerate().map(move |(index, image)| {
        let cfg = cfg.clone();
        async move { (index, spawn_item(index, total, image, cfg).await) }
    }))
    .buffer_unordered(config.concurrency);

    Ok(Box::pin(s))
}
