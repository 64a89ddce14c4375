//! Conversion entry points.
//!
//! [`process`] is the per-image core: decode → normalize mode → resize →
//! select format and encode. It never fails; every error becomes a
//! [`ConversionOutcome::Failed`] carrying the input's name.
//!
//! The batch drivers wrap it with per-image isolation:
//!
//! * [`convert_batch`]: synchronous, one image after another.
//! * [`convert_batch_async`]: each image on `spawn_blocking`, at most
//!   `config.concurrency` in flight, outcomes in input order.
//! * [`convert_sources`]: as above, but reads files and downloads URLs
//!   first. This is what the CLI uses.
//!
//! Use [`crate::stream::convert_stream`] to receive outcomes as they finish.

use crate::config::NormalizeConfig;
use crate::error::{ItemError, NormalizeError};
use crate::output::{BatchOutput, BatchStats, ConversionOutcome, ConvertedImage};
use crate::pipeline::codec::{ImageCodec, ImageCrateCodec};
use crate::pipeline::encode::{output_filename, select_and_encode};
use crate::pipeline::input::{self, InputImage, InputSource};
use crate::pipeline::normalize::normalize_mode;
use crate::pipeline::resize::resize;
use futures::stream::{self, StreamExt};
use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert one image with the built-in codec.
///
/// # Arguments
/// * `filename`: the input's display name; its stem names the output and
///   its extension helps formats without magic bytes
/// * `bytes`: the encoded input
/// * `config`: only `max_dimension` and `resize_filter` matter here
///
/// # Example
/// ```rust,no_run
/// use image_normalize::{process, ConversionOutcome, NormalizeConfig};
///
/// let bytes = std::fs::read("holiday.webp").unwrap();
/// match process("holiday.webp", &bytes, &NormalizeConfig::default()) {
///     ConversionOutcome::Converted(img) => std::fs::write(&img.filename, &img.data).unwrap(),
///     ConversionOutcome::Failed(f) => eprintln!("{}: {}", f.source_name, f.message()),
/// }
/// ```
pub fn process(filename: &str, bytes: &[u8], config: &NormalizeConfig) -> ConversionOutcome {
    process_with_codec(filename, bytes, config, &ImageCrateCodec)
}

/// [`process`] against a caller-supplied codec.
pub fn process_with_codec(
    filename: &str,
    bytes: &[u8],
    config: &NormalizeConfig,
    codec: &dyn ImageCodec,
) -> ConversionOutcome {
    match run_pipeline(filename, bytes, config, codec) {
        Ok(converted) => ConversionOutcome::Converted(converted),
        Err(e) => {
            warn!("Failed to convert {}: {}", filename, e);
            ConversionOutcome::failed(filename, e)
        }
    }
}

fn run_pipeline(
    filename: &str,
    bytes: &[u8],
    config: &NormalizeConfig,
    codec: &dyn ImageCodec,
) -> Result<ConvertedImage, ItemError> {
    let start = Instant::now();
    let hint = crate::formats::SourceFormat::from_filename(filename);

    let decoded = codec.decode(bytes, hint)?;
    let source_mode = decoded.mode().clone();
    let (source_width, source_height) = (decoded.width(), decoded.height());

    let normalized = normalize_mode(decoded, codec)?;
    let resized = resize(normalized, config.max_dimension, config.resize_filter, codec);
    let encoded = select_and_encode(resized, codec)?;

    info!(
        "{}: {} {}x{} → {} {}x{} ({} bytes, {}ms)",
        filename,
        source_mode,
        source_width,
        source_height,
        encoded.format,
        encoded.width,
        encoded.height,
        encoded.data.len(),
        start.elapsed().as_millis()
    );

    Ok(ConvertedImage {
        source_name: filename.to_string(),
        source_mode,
        filename: output_filename(filename, encoded.format),
        format: encoded.format,
        width: encoded.width,
        height: encoded.height,
        size_bytes: encoded.data.len(),
        data: encoded.data,
    })
}

/// Run the configured upscaler (if any), then [`process_with_codec`], and
/// report progress for this item.
pub(crate) fn process_item(
    index: usize,
    total: usize,
    input: &InputImage,
    config: &NormalizeConfig,
    codec: &dyn ImageCodec,
) -> ConversionOutcome {
    if let Some(ref cb) = config.progress_callback {
        cb.on_image_start(index, total, &input.name);
    }

    let outcome = match upscaled(input, config) {
        Ok(bytes) => process_with_codec(&input.name, &bytes, config, codec),
        Err(e) => {
            warn!("Failed to upscale {}: {}", input.name, e);
            ConversionOutcome::failed(input.name.clone(), e)
        }
    };

    report(config, index, total, &outcome);
    outcome
}

fn upscaled<'a>(input: &'a InputImage, config: &NormalizeConfig) -> Result<Cow<'a, [u8]>, ItemError> {
    match config.upscaler {
        Some(ref upscaler) => {
            debug!(
                "Upscaling {} ×{} with {}",
                input.name,
                config.upscale_factor,
                upscaler.name()
            );
            Ok(Cow::Owned(upscaler.enhance(&input.bytes, config.upscale_factor)?))
        }
        None => Ok(Cow::Borrowed(&input.bytes)),
    }
}

pub(crate) fn report(config: &NormalizeConfig, index: usize, total: usize, outcome: &ConversionOutcome) {
    if let Some(ref cb) = config.progress_callback {
        match outcome {
            ConversionOutcome::Converted(c) => cb.on_image_complete(index, total, c),
            ConversionOutcome::Failed(f) => {
                cb.on_image_error(index, total, &f.source_name, &f.message())
            }
        }
    }
}

/// Convert every input in order on the calling thread.
///
/// A failing image never stops the batch; it shows up as a `Failed` outcome
/// at its position.
pub fn convert_batch(inputs: &[InputImage], config: &NormalizeConfig) -> BatchOutput {
    convert_batch_with_codec(inputs, config, &ImageCrateCodec)
}

/// [`convert_batch`] against a caller-supplied codec.
pub fn convert_batch_with_codec(
    inputs: &[InputImage],
    config: &NormalizeConfig,
    codec: &dyn ImageCodec,
) -> BatchOutput {
    let start = Instant::now();
    let total = inputs.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let outcomes: Vec<ConversionOutcome> = inputs
        .iter()
        .enumerate()
        .map(|(index, input)| process_item(index, total, input, config, codec))
        .collect();

    let input_bytes = inputs.iter().map(|i| i.bytes.len() as u64).sum();
    finish(outcomes, input_bytes, start, config)
}

/// Convert inputs on the blocking thread pool with bounded concurrency.
///
/// Outcomes come back in input order regardless of completion order.
pub async fn convert_batch_async(inputs: Vec<InputImage>, config: &NormalizeConfig) -> BatchOutput {
    let start = Instant::now();
    let total = inputs.len();
    let input_bytes = inputs.iter().map(|i| i.bytes.len() as u64).sum();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let outcomes: Vec<ConversionOutcome> = stream::iter(inputs.into_iter().enumerate().map(
        |(index, input)| {
            let cfg = config.clone();
            async move { spawn_item(index, total, input, cfg).await }
        },
    ))
    .buffered(config.concurrency)
    .collect()
    .await;

    finish(outcomes, input_bytes, start, config)
}

/// Read/download each source, then convert it as in [`convert_batch_async`].
///
/// # Errors
/// [`NormalizeError::NoInputs`] when `sources` is empty. Everything else is
/// reported per image.
pub async fn convert_sources(
    sources: &[InputSource],
    config: &NormalizeConfig,
) -> Result<BatchOutput, NormalizeError> {
    if sources.is_empty() {
        return Err(NormalizeError::NoInputs);
    }

    let start = Instant::now();
    let total = sources.len();
    info!("Starting conversion of {} images", total);
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let results: Vec<(ConversionOutcome, u64)> =
        stream::iter(sources.iter().cloned().enumerate().map(|(index, source)| {
            load_and_convert(index, total, source, config.clone())
        }))
        .buffered(config.concurrency)
        .collect()
        .await;

    let input_bytes = results.iter().map(|(_, len)| len).sum();
    let outcomes = results.into_iter().map(|(o, _)| o).collect();
    Ok(finish(outcomes, input_bytes, start, config))
}

/// Load one source and convert it; returns the outcome and the number of
/// input bytes read.
pub(crate) async fn load_and_convert(
    index: usize,
    total: usize,
    source: InputSource,
    config: NormalizeConfig,
) -> (ConversionOutcome, u64) {
    match input::load_input(&source, config.download_timeout_secs).await {
        Ok(image) => {
            let len = image.bytes.len() as u64;
            (spawn_item(index, total, image, config).await, len)
        }
        Err(e) => {
            let name = source.display_name();
            warn!("Failed to load {}: {}", name, e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_image_start(index, total, &name);
            }
            let outcome = ConversionOutcome::failed(name, e);
            report(&config, index, total, &outcome);
            (outcome, 0)
        }
    }
}

/// Synchronous wrapper around [`convert_sources`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sources_sync(
    sources: &[InputSource],
    config: &NormalizeConfig,
) -> Result<BatchOutput, NormalizeError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| NormalizeError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_sources(sources, config))
}

/// Convert one image on the blocking pool; a panic becomes a failed outcome.
pub(crate) async fn spawn_item(
    index: usize,
    total: usize,
    input: InputImage,
    config: NormalizeConfig,
) -> ConversionOutcome {
    let name = input.name.clone();
    let cfg = config.clone();
    match tokio::task::spawn_blocking(move || {
        process_item(index, total, &input, &cfg, &ImageCrateCodec)
    })
    .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            let outcome = ConversionOutcome::failed(name, ItemError::Panicked(e.to_string()));
            report(&config, index, total, &outcome);
            outcome
        }
    }
}

fn finish(
    outcomes: Vec<ConversionOutcome>,
    input_bytes: u64,
    start: Instant,
    config: &NormalizeConfig,
) -> BatchOutput {
    let stats = BatchStats::from_outcomes(&outcomes, input_bytes, start.elapsed().as_millis() as u64);
    info!(
        "Batch complete: {}/{} converted ({} PNG, {} JPEG), {}ms",
        stats.converted, stats.total, stats.png, stats.jpeg, stats.duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(stats.total, stats.converted);
    }
    BatchOutput { outcomes, stats }
}

/// Write every converted image into `dir`, creating it if needed.
///
/// Each file is written to a temporary name in `dir` and renamed into place,
/// so a crash never leaves a half-written image. Outputs sharing a stem
/// overwrite each other in batch order. Returns the written paths.
pub fn write_outcomes(
    dir: impl AsRef<Path>,
    outcomes: &[ConversionOutcome],
) -> Result<Vec<PathBuf>, NormalizeError> {
    let dir = dir.as_ref();
    let write_failed = |path: &Path, source: std::io::Error| NormalizeError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(|e| write_failed(dir, e))?;

    let mut written = Vec::new();
    for image in outcomes.iter().filter_map(ConversionOutcome::converted) {
        let path = dir.join(&image.filename);
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| write_failed(&path, e))?;
        tmp.write_all(&image.data)
            .map_err(|e| write_failed(&path, e))?;
        tmp.persist(&path).map_err(|e| write_failed(&path, e.error))?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColorMode, OutputFormat};
    use crate::test_support::BrokenEncoder;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(img: DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode fixture");
        buf
    }

    fn opaque_rgba(w: u32, h: u32) -> Vec<u8> {
        png(DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([40, 50, 60, 255]))))
    }

    #[test]
    fn opaque_rgba_becomes_jpeg() {
        let outcome = process("shot.png", &opaque_rgba(20, 10), &NormalizeConfig::default());
        let img = outcome.into_result().expect("converted");
        assert_eq!(img.format, OutputFormat::Jpeg);
        assert_eq!(img.filename, "shot.jpg");
        assert_eq!(img.source_mode, ColorMode::Rgba);
        assert_eq!((img.width, img.height), (20, 10));
    }

    #[test]
    fn large_image_is_fitted() {
        let bytes = png(DynamicImage::ImageRgb8(RgbImage::from_pixel(2400, 600, Rgb([1, 1, 1]))));
        let img = process("wide.png", &bytes, &NormalizeConfig::default())
            .into_result()
            .expect("converted");
        assert_eq!((img.width, img.height), (1000, 250));
    }

    #[test]
    fn corrupt_input_fails_with_its_name() {
        let outcome = process("broken.jpg", b"\xFF\xD8\xFF garbage", &NormalizeConfig::default());
        let failed = outcome.into_result().unwrap_err();
        assert_eq!(failed.source_name, "broken.jpg");
        assert!(matches!(failed.error, ItemError::Decode { .. }));
    }

    #[test]
    fn encoder_failure_is_per_item() {
        let outcome = process_with_codec(
            "a.png",
            &opaque_rgba(2, 2),
            &NormalizeConfig::default(),
            &BrokenEncoder,
        );
        assert!(!outcome.is_converted());
    }

    #[test]
    fn batch_keeps_order_and_isolates_failures() {
        let inputs = vec![
            InputImage::new("one.png", opaque_rgba(3, 3)),
            InputImage::new("two.png", b"nope".to_vec()),
            InputImage::new("three.png", opaque_rgba(4, 4)),
        ];
        let out = convert_batch(&inputs, &NormalizeConfig::default());
        let names: Vec<&str> = out.outcomes.iter().map(ConversionOutcome::source_name).collect();
        assert_eq!(names, vec!["one.png", "two.png", "three.png"]);
        assert_eq!(out.stats.converted, 2);
        assert_eq!(out.stats.failed, 1);
        assert!(!out.outcomes[1].is_converted());
    }

    #[test]
    fn upscaler_runs_before_normalization() {
        let config = NormalizeConfig::builder()
            .upscaler(std::sync::Arc::new(crate::upscale::ResampleUpscaler::default()))
            .upscale_factor(3)
            .build()
            .expect("config");
        let input = InputImage::new("tiny.png", opaque_rgba(10, 5));
        let img = process_item(0, 1, &input, &config, &ImageCrateCodec)
            .into_result()
            .expect("converted");
        assert_eq!((img.width, img.height), (30, 15));
    }

    #[test]
    fn write_outcomes_overwrites_same_stem() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let inputs = vec![
            InputImage::new("dup.png", opaque_rgba(3, 3)),
            InputImage::new("dup.bmp", opaque_rgba(5, 5)),
            InputImage::new("bad.png", b"x".to_vec()),
        ];
        let out = convert_batch(&inputs, &NormalizeConfig::default());
        let written = write_outcomes(dir.path().join("out"), &out.outcomes).expect("write");
        assert_eq!(written.len(), 2);

        let last = image::open(dir.path().join("out/dup.jpg")).expect("open");
        assert_eq!((last.width(), last.height()), (5, 5));
        let entries = std::fs::read_dir(dir.path().join("out")).expect("ls").count();
        assert_eq!(entries, 1);
    }
}
