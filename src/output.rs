//! Result types returned by the conversion entry points.

use crate::error::ItemError;
use crate::model::{ColorMode, OutputFormat};
use serde::Serialize;

/// One successfully converted image.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertedImage {
    /// Name of the input as given by the caller.
    pub source_name: String,
    /// Colour mode the source container declared.
    pub source_mode: ColorMode,
    /// Source stem plus `.jpg` or `.png`.
    pub filename: String,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    /// Length of [`Self::data`].
    pub size_bytes: usize,
    /// Encoded file contents.
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// An image that could not be converted.
#[derive(Debug, Clone, Serialize)]
pub struct FailedImage {
    /// Name of the input as given by the caller.
    pub source_name: String,
    pub error: ItemError,
}

impl FailedImage {
    /// Human-readable description of the failure.
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

/// Outcome for a single input: converted or failed, never both.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    Converted(ConvertedImage),
    Failed(FailedImage),
}

impl ConversionOutcome {
    pub fn failed(source_name: impl Into<String>, error: ItemError) -> Self {
        ConversionOutcome::Failed(FailedImage {
            source_name: source_name.into(),
            error,
        })
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionOutcome::Converted(_))
    }

    pub fn source_name(&self) -> &str {
        match self {
            ConversionOutcome::Converted(c) => &c.source_name,
            ConversionOutcome::Failed(f) => &f.source_name,
        }
    }

    pub fn converted(&self) -> Option<&ConvertedImage> {
        match self {
            ConversionOutcome::Converted(c) => Some(c),
            ConversionOutcome::Failed(_) => None,
        }
    }

    pub fn into_result(self) -> Result<ConvertedImage, FailedImage> {
        match self {
            ConversionOutcome::Converted(c) => Ok(c),
            ConversionOutcome::Failed(f) => Err(f),
        }
    }
}

/// Aggregate numbers for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub converted: usize,
    pub failed: usize,
    pub png: usize,
    pub jpeg: usize,
    /// Bytes read from inputs (before any upscaling).
    pub input_bytes: u64,
    /// Bytes of encoded output.
    pub output_bytes: u64,
    pub duration_ms: u64,
}

impl BatchStats {
    /// Tally the outcomes of a batch.
    pub fn from_outcomes(outcomes: &[ConversionOutcome], input_bytes: u64, duration_ms: u64) -> Self {
        let mut stats = BatchStats {
            total: outcomes.len(),
            input_bytes,
            duration_ms,
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                ConversionOutcome::Converted(c) => {
                    stats.converted += 1;
                    stats.output_bytes += c.size_bytes as u64;
                    match c.format {
                        OutputFormat::Png => stats.png += 1,
                        OutputFormat::Jpeg => stats.jpeg += 1,
                    }
                }
                ConversionOutcome::Failed(_) => stats.failed += 1,
            }
        }
        stats
    }
}

/// Everything a batch produced, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutput {
    pub outcomes: Vec<ConversionOutcome>,
    pub stats: BatchStats,
}

impl BatchOutput {
    pub fn converted(&self) -> impl Iterator<Item = &ConvertedImage> {
        self.outcomes.iter().filter_map(ConversionOutcome::converted)
    }

    pub fn failures(&self) -> impl Iterator<Item = &FailedImage> {
        self.outcomes.iter().filter_map(|o| match o {
            ConversionOutcome::Failed(f) => Some(f),
            ConversionOutcome::Converted(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converted(format: OutputFormat, size: usize) -> ConversionOutcome {
        ConversionOutcome::Converted(ConvertedImage {
            source_name: "in.png".into(),
            source_mode: ColorMode::Rgba,
            filename: "in.png".into(),
            format,
            width: 1,
            height: 1,
            size_bytes: size,
            data: vec![0; size],
        })
    }

    #[test]
    fn stats_tally() {
        let outcomes = vec![
            converted(OutputFormat::Png, 10),
            converted(OutputFormat::Jpeg, 5),
            ConversionOutcome::failed(
                "bad.gif",
                ItemError::Decode {
                    detail: "eof".into(),
                },
            ),
        ];
        let s = BatchStats::from_outcomes(&outcomes, 100, 7);
        assert_eq!(
            s,
            BatchStats {
                total: 3,
                converted: 2,
                failed: 1,
                png: 1,
                jpeg: 1,
                input_bytes: 100,
                output_bytes: 15,
                duration_ms: 7,
            }
        );
    }

    #[test]
    fn json_is_tagged_and_skips_payload() {
        let json = serde_json::to_value(converted(OutputFormat::Png, 3)).expect("json");
        assert_eq!(json["status"], "converted");
        assert_eq!(json["format"], "Png");
        assert!(json.get("data").is_none());

        let failed = ConversionOutcome::failed("x.bmp", ItemError::Upscale("boom".into()));
        let json = serde_json::to_value(&failed).expect("json");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["source_name"], "x.bmp");
    }

    #[test]
    fn outcome_accessors() {
        let ok = converted(OutputFormat::Jpeg, 1);
        assert!(ok.is_converted());
        assert_eq!(ok.source_name(), "in.png");
        assert!(ok.into_result().is_ok());
    }
}
