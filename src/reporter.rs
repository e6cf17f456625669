//! Report file generation.
//!
//! A `Reporter` renders one word batch into three artifacts that share a base
//! name and differ only by extension: plain text (`.txt`), SRT subtitles
//! (`.srt`), and a structured JSON array (`.json`). Generation is a pure
//! projection of the batch — same batch in, same bytes out — and each format
//! is an independent, equally-weighted export step: one format failing never
//! prevents or hides the others.

use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};
use crate::json_array_encoder::JsonArrayEncoder;
use crate::span_encoder::SpanEncoder;
use crate::srt_encoder::SrtEncoder;
use crate::text_encoder::TextEncoder;
use crate::words::WordBatch;

/// The supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// One `[start] word` line per span.
    Text,
    /// SubRip caption blocks.
    Subtitle,
    /// Pretty-printed JSON array of `{word, start, end}` objects.
    Structured,
}

impl ReportFormat {
    /// Every format, in the order `generate_all` runs them.
    pub const ALL: [ReportFormat; 3] = [
        ReportFormat::Text,
        ReportFormat::Subtitle,
        ReportFormat::Structured,
    ];

    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Subtitle => "srt",
            ReportFormat::Structured => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => f.write_str("text"),
            ReportFormat::Subtitle => f.write_str("subtitle"),
            ReportFormat::Structured => f.write_str("structured"),
        }
    }
}

/// Renders word batches into report files under a shared base path.
pub struct Reporter {
    /// Output base path without an extension, e.g. `data/output/recording`.
    base: PathBuf,
}

impl Reporter {
    /// Create a reporter writing next to `base` (extension-less output path).
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The file path a given format writes to.
    pub fn path_for(&self, format: ReportFormat) -> PathBuf {
        let mut path = self.base.clone().into_os_string();
        path.push(".");
        path.push(format.extension());
        PathBuf::from(path)
    }

    /// Generate the plain-text report. Overwrites any existing file.
    pub fn generate_text(&self, batch: &WordBatch) -> Result<PathBuf> {
        self.generate(ReportFormat::Text, batch)
    }

    /// Generate the SRT subtitle report. Overwrites any existing file.
    pub fn generate_subtitle(&self, batch: &WordBatch) -> Result<PathBuf> {
        self.generate(ReportFormat::Subtitle, batch)
    }

    /// Generate the structured JSON report. Overwrites any existing file.
    pub fn generate_structured(&self, batch: &WordBatch) -> Result<PathBuf> {
        self.generate(ReportFormat::Structured, batch)
    }

    /// Generate every format, returning one result per format.
    ///
    /// The formats are independent export steps, not a transaction: a failure
    /// in one is recorded in its slot while the remaining formats are still
    /// attempted.
    pub fn generate_all(&self, batch: &WordBatch) -> Vec<(ReportFormat, Result<PathBuf>)> {
        ReportFormat::ALL
            .into_iter()
            .map(|format| (format, self.generate(format, batch)))
            .collect()
    }

    fn generate(&self, format: ReportFormat, batch: &WordBatch) -> Result<PathBuf> {
        let path = self.path_for(format);

        self.write_report(format, batch, &path)
            .map_err(|err| Error::ReportWrite {
                format,
                source: err.into(),
            })?;

        info!(format = %format, path = %path.display(), "wrote report");
        Ok(path)
    }

    fn write_report(
        &self,
        format: ReportFormat,
        batch: &WordBatch,
        path: &Path,
    ) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let file = File::create(path)?;
        let writer = BufWriter::new(file);

        // Encoder selection stays explicit (no trait objects) to keep
        // lifetimes simple; all three share the same write/close protocol.
        match format {
            ReportFormat::Text => encode_batch(TextEncoder::new(writer), batch),
            ReportFormat::Subtitle => encode_batch(SrtEncoder::new(writer), batch),
            ReportFormat::Structured => encode_batch(JsonArrayEncoder::new(writer), batch),
        }
    }
}

fn encode_batch<E: SpanEncoder>(mut encoder: E, batch: &WordBatch) -> anyhow::Result<()> {
    for span in batch {
        encoder.write_span(span)?;
    }
    encoder.close()?;
    Ok(())
}
