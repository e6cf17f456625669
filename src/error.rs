use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

use crate::reporter::ReportFormat;

/// Verbatim's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Verbatim's crate-wide error type.
///
/// The variants mirror the pipeline's failure points so callers can tell
/// fatal conditions apart from ones the run recovers from locally (see
/// [`Error::is_fatal`]). The type is intentionally decoupled from `anyhow`
/// so downstream libraries aren't forced to adopt `anyhow` in their own
/// public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// The referenced input audio file does not exist.
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The decode step could not produce a usable WAV file.
    #[error("failed to decode audio: {0}")]
    Decode(String),

    /// The recognizer returned no usable words.
    #[error("recognition produced no usable words")]
    RecognitionEmpty,

    /// The result store could not be opened or created.
    #[error("failed to open result store")]
    StoreConnection(#[source] rusqlite::Error),

    /// The result store's schema could not be brought to the current version.
    #[error("failed to migrate result store schema")]
    StoreMigration(#[source] rusqlite_migration::Error),

    /// Saving a word batch failed after the store was opened successfully.
    /// The store is left at its prior contents.
    #[error("failed to save words to result store")]
    StoreSave(#[source] rusqlite::Error),

    /// Reading stored words back failed.
    #[error("failed to read words from result store")]
    StoreQuery(#[source] rusqlite::Error),

    /// A single report format failed to write. Other formats are unaffected.
    #[error("failed to write {format} report")]
    ReportWrite {
        format: ReportFormat,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Whether this error aborts a pipeline run.
    ///
    /// Save and report-write failures are recovered locally: the run logs
    /// them and continues with the remaining independent steps. Everything
    /// else is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::StoreSave(_) | Self::ReportWrite { .. })
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
