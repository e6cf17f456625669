use std::path::Path;

use crate::Result;
use crate::words::RawWord;

/// Pluggable speech-recognition seam.
///
/// A recognizer takes a decoded audio file (mono WAV at the target sample
/// rate) and returns the recognized words in chronological order. Word text
/// may carry surrounding whitespace and an empty result is valid output —
/// normalization and the empty-result policy belong to the caller, not the
/// recognizer.
///
/// The trait exists so the pipeline can be exercised end-to-end without a
/// model on disk (tests plug in a fake), and so alternative engines can slot
/// in behind the same boundary.
pub trait Recognizer {
    /// Recognize speech in the WAV file at `wav_path`.
    ///
    /// Takes `&mut self` because engine state (e.g. a whisper inference
    /// state) may require mutable access.
    fn recognize(&mut self, wav_path: &Path) -> Result<Vec<RawWord>>;
}
