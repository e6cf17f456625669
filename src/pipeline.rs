//! End-to-end orchestration: decode → recognize → persist → report.
//!
//! The pipeline is deliberately thin. It owns sequencing, the fatal /
//! recoverable split from the error taxonomy, and cleanup of the temporary
//! decoded WAV (removed on every exit path via an RAII guard). All the
//! interesting behavior lives in the modules it wires together.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::convert::convert_to_wav;
use crate::error::{Error, Result};
use crate::recognize::Recognizer;
use crate::reporter::{ReportFormat, Reporter};
use crate::store::ResultStore;
use crate::words::WordBatch;

/// What one pipeline run produced.
///
/// `run` returns `Err` only for fatal conditions; recoverable failures
/// (a failed save, a failed report format) are recorded here so callers can
/// surface them without aborting.
#[derive(Debug)]
pub struct RunSummary {
    /// Number of words recognized and normalized.
    pub words: usize,
    /// Path of the result store for this recording.
    pub store_path: PathBuf,
    /// Whether the batch was persisted successfully.
    pub store_saved: bool,
    /// Per-format report outcomes, in generation order.
    pub reports: Vec<(ReportFormat, Result<PathBuf>)>,
}

/// Sequences one recording through decode, recognition, persistence, and
/// report generation.
pub struct Pipeline<R: Recognizer> {
    recognizer: R,
    output_dir: PathBuf,
}

impl<R: Recognizer> Pipeline<R> {
    pub fn new(recognizer: R, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            recognizer,
            output_dir: output_dir.into(),
        }
    }

    /// Run the full pipeline for `input`.
    ///
    /// Fatal errors (missing input, decode failure, empty recognition,
    /// store open/migration failure) abort and propagate. A failed save or a
    /// failed report format is logged, recorded in the summary, and does not
    /// stop the remaining steps: reports are independent of persistence.
    pub fn run(&mut self, input: &Path) -> Result<RunSummary> {
        if !input.exists() {
            return Err(Error::InputNotFound(input.to_path_buf()));
        }

        let base_name = input
            .file_stem()
            .ok_or_else(|| Error::msg(format!("input path has no file name: {}", input.display())))?;
        let output_base = self.output_dir.join(base_name);
        fs::create_dir_all(&self.output_dir)?;

        // The decoded WAV is a temporary artifact; the guard removes it on
        // every exit path, fatal errors included.
        let decoded = DecodedAudio::new(convert_to_wav(input)?);

        let raw_words = self.recognizer.recognize(decoded.path())?;
        let batch = WordBatch::from_raw(raw_words);
        if batch.is_empty() {
            return Err(Error::RecognitionEmpty);
        }

        // Append rather than `with_extension` so base names containing dots
        // keep their full stem.
        let mut store_os = output_base.clone().into_os_string();
        store_os.push(".db");
        let store_path = PathBuf::from(store_os);
        let store_saved = self.persist(&store_path, &batch)?;

        let reporter = Reporter::new(&output_base);
        let reports = reporter.generate_all(&batch);
        for (format, result) in &reports {
            if let Err(err) = result {
                warn!(format = %format, error = %err, "report generation failed");
            }
        }

        Ok(RunSummary {
            words: batch.len(),
            store_path,
            store_saved,
            reports,
        })
    }

    /// Open the store and save the batch.
    ///
    /// Open/migration failures are fatal and propagate. A save failure is
    /// recoverable: the store rolled back, we log and move on.
    fn persist(&self, store_path: &Path, batch: &WordBatch) -> Result<bool> {
        let mut store = ResultStore::open(store_path)?;

        let saved = match store.save(batch) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    path = %store_path.display(),
                    error = %err,
                    "saving word batch failed; store keeps its prior contents"
                );
                false
            }
        };

        if let Err(err) = store.close() {
            warn!(path = %store_path.display(), error = %err, "closing result store failed");
        }

        Ok(saved)
    }
}

/// RAII guard for the temporary decoded WAV file.
struct DecodedAudio {
    path: PathBuf,
}

impl DecodedAudio {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DecodedAudio {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed temporary decoded audio"),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to remove temporary decoded audio");
            }
        }
    }
}
