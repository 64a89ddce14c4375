//! CLI binary for image-normalize.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `NormalizeConfig`, writes the converted files and prints results.

use anyhow::{bail, Context, Result};
use clap::Parser;
use image_normalize::{
    convert_sources, expand_inputs, write_outcomes, ConversionProgressCallback, ConvertedImage,
    NormalizeConfig, ProgressCallback, ResampleUpscaler, ResizeFilter, SourceFormat,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// "name  MODE → FORMAT  WxH  N KB"
fn summary_line(image: &ConvertedImage) -> String {
    format!(
        "{}  {} → {}  {}x{}  {} KB",
        image.source_name,
        image.source_mode,
        image.format,
        image.width,
        image.height,
        image.size_bytes.div_ceil(1024)
    )
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live progress bar plus one log line per
/// image. Images may complete out of order.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} images  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total} images…"))
        ));
    }

    fn on_image_start(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_image_complete(&self, _index: usize, _total: usize, image: &ConvertedImage) {
        self.bar
            .println(format!("  {} {}", green("✓"), summary_line(image)));
        self.bar.inc(1);
    }

    fn on_image_error(&self, _index: usize, _total: usize, name: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(std::iter::once('…')).collect()
        } else {
            error.to_string()
        };

        self.bar
            .println(format!("  {} {}  {}", red("✗"), name, red(&msg)));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let failed = self.errors.load(Ordering::SeqCst);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} images converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} images converted  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a few files into ./converted
  imgnorm logo.gif photo.heic scan.tiff

  # A whole directory, capped at 800 px, into ./out
  imgnorm --max-dimension 800 -o out ~/Pictures/uploads

  # Enlarge 2x before normalizing
  imgnorm --upscale 2 thumbnail.png

  # Download and convert
  imgnorm https://example.com/banner.webp

  # Machine-readable report
  imgnorm --json photos/ > report.json

OUTPUT:
  Images with any translucent pixel are written as PNG (RGBA);
  everything else as JPEG (RGB, quality 95). The output name is the
  input stem with .png or .jpg.

ENVIRONMENT VARIABLES:
  IMGNORM_OUTPUT_DIR, IMGNORM_MAX_DIMENSION, IMGNORM_FILTER,
  IMGNORM_CONCURRENCY, IMGNORM_UPSCALE, IMGNORM_JSON, IMGNORM_NO_PROGRESS,
  IMGNORM_VERBOSE, IMGNORM_QUIET, IMGNORM_DOWNLOAD_TIMEOUT
  RUST_LOG overrides the log filter.
"#;

/// Normalize images to RGB JPEG or RGBA PNG within a maximum size.
#[derive(Parser, Debug)]
#[command(
    name = "imgnorm",
    version,
    about = "Normalize images to RGB JPEG or RGBA PNG within a maximum size",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image files, directories or HTTP/HTTPS URLs.
    #[arg(required_unless_present = "formats")]
    inputs: Vec<String>,

    /// Directory for converted files.
    #[arg(short, long, env = "IMGNORM_OUTPUT_DIR", default_value = "converted")]
    output_dir: PathBuf,

    /// Longest allowed side in pixels.
    #[arg(long, env = "IMGNORM_MAX_DIMENSION", default_value_t = image_normalize::DEFAULT_MAX_DIMENSION,
          value_parser = clap::value_parser!(u32).range(1..))]
    max_dimension: u32,

    /// Resampling filter used when shrinking.
    #[arg(long, env = "IMGNORM_FILTER", value_enum, default_value = "lanczos3")]
    filter: FilterArg,

    /// Number of images converted at once.
    #[arg(short, long, env = "IMGNORM_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Enlarge every input by this factor (2–8) before normalizing.
    #[arg(long, env = "IMGNORM_UPSCALE", value_name = "FACTOR",
          value_parser = clap::value_parser!(u32).range(2..=8))]
    upscale: Option<u32>,

    /// Print the batch report as JSON on stdout.
    #[arg(long, env = "IMGNORM_JSON")]
    json: bool,

    /// List recognised input formats and exit.
    #[arg(long)]
    formats: bool,

    /// Disable progress bar.
    #[arg(long, env = "IMGNORM_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMGNORM_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IMGNORM_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "IMGNORM_DOWNLOAD_TIMEOUT", default_value_t = 60)]
    download_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FilterArg {
    Lanczos3,
    CatmullRom,
    Gaussian,
    Triangle,
}

impl From<FilterArg> for ResizeFilter {
    fn from(v: FilterArg) -> Self {
        match v {
            FilterArg::Lanczos3 => ResizeFilter::Lanczos3,
            FilterArg::CatmullRom => ResizeFilter::CatmullRom,
            FilterArg::Gaussian => ResizeFilter::Gaussian,
            FilterArg::Triangle => ResizeFilter::Triangle,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless --verbose is given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.formats {
        print_formats();
        return Ok(());
    }

    // ── Resolve inputs ───────────────────────────────────────────────────
    let expanded = expand_inputs(&cli.inputs).context("Failed to resolve inputs")?;
    if !cli.quiet {
        for path in &expanded.skipped {
            eprintln!("{} skipped {}", dim("·"), path.display());
        }
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert_sources(&expanded.sources, &config)
        .await
        .context("Conversion failed")?;

    let written = write_outcomes(&cli.output_dir, &output.outcomes)
        .context("Failed to write converted images")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        if !show_progress {
            for image in output.converted() {
                eprintln!("{}", summary_line(image));
            }
            for failure in output.failures() {
                eprintln!("{}  {}", failure.source_name, red(&failure.message()));
            }
        }
        let stats = &output.stats;
        eprintln!(
            "{}  {}/{} images  ({} PNG, {} JPEG)  {}ms  →  {}",
            if stats.failed == 0 { green("✔") } else { cyan("⚠") },
            stats.converted,
            stats.total,
            stats.png,
            stats.jpeg,
            stats.duration_ms,
            bold(&cli.output_dir.display().to_string()),
        );
        eprintln!(
            "   {} files written  /  {} KB in  /  {} KB out",
            dim(&written.len().to_string()),
            dim(&stats.input_bytes.div_ceil(1024).to_string()),
            dim(&stats.output_bytes.div_ceil(1024).to_string()),
        );
    }

    if output.stats.converted == 0 {
        bail!("None of the {} inputs could be converted", output.stats.total);
    }

    Ok(())
}

/// Map CLI args to `NormalizeConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<NormalizeConfig> {
    let mut builder = NormalizeConfig::builder()
        .max_dimension(cli.max_dimension)
        .resize_filter(cli.filter.into())
        .concurrency(cli.concurrency)
        .download_timeout_secs(cli.download_timeout);

    if let Some(factor) = cli.upscale {
        builder = builder
            .upscaler(Arc::new(ResampleUpscaler::default()))
            .upscale_factor(factor);
    }

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_formats() {
    println!("{:<12} {:<9} EXTENSIONS", "FORMAT", "DECODED");
    for format in SourceFormat::all() {
        println!(
            "{:<12} {:<9} {}",
            format!("{format:?}"),
            if format.is_decodable() { "yes" } else { "no" },
            format.extensions().join(", ")
        );
    }
}
