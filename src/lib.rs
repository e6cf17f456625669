//! `verbatim` — word-level audio transcription with durable storage and report export.
//!
//! This crate provides:
//! - A time-aligned word model (`WordSpan` / `WordBatch`) with normalization rules
//! - Durable persistence with replace-all semantics and versioned schema migration
//! - Deterministic multi-format report generation (plain text, SRT subtitles, JSON)
//! - Audio decoding to the recognizer's expected WAV format
//! - A pluggable recognition seam with a built-in Whisper implementation
//!
//! The library is designed so the CLI stays a thin shell: everything with
//! non-trivial behavior lives here, behind testable seams.

// Crate-wide error taxonomy.
pub mod error;

// Word model and batch normalization.
pub mod words;

// Durable persistence of transcription results.
pub mod store;

// Output encoder interface.
pub mod span_encoder;

// Output encoders that serialize word spans into various formats.
pub mod json_array_encoder;
pub mod srt_encoder;
pub mod text_encoder;

// Report file generation (all formats, shared base name).
pub mod reporter;

// Audio decoding and WAV loading.
pub mod convert;
pub mod wav;

// Recognition seam and the built-in Whisper implementation.
pub mod recognize;
pub mod whisper;

// End-to-end orchestration: decode → recognize → persist → report.
pub mod pipeline;

// Logging configuration for binaries.
#[cfg(feature = "logging")]
pub mod logging;

pub use error::{Error, Result};
