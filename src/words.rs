//! Time-aligned word model.
//!
//! The recognizer hands us raw word records that may carry surrounding
//! whitespace. Normalization happens exactly once, in [`WordBatch::from_raw`]:
//! words are trimmed, spans that become empty are dropped, and chronological
//! order is preserved. Everything downstream (the store, every report format)
//! treats the resulting batch as a read-only value.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// An untrimmed word record as emitted by a recognition collaborator.
#[derive(Debug, Clone)]
pub struct RawWord {
    /// The recognized word, possibly padded with whitespace.
    pub word: String,
    /// Start offset in seconds within the source audio.
    pub start: f64,
    /// End offset in seconds within the source audio.
    pub end: f64,
}

/// One recognized word with its start/end timeline offsets.
///
/// Invariants (established by [`WordBatch::from_raw`]):
/// - `word` is non-empty and carries no surrounding whitespace
/// - `end == start` is tolerated; negative starts and spans with
///   `end < start` are passed through but flagged as data-quality anomalies
///   at construction time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordSpan {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// The complete ordered transcription result for one audio file.
///
/// The sequence order is chronological and is the only ordering signal carried
/// forward: there is no explicit sequence-index field, so the store and every
/// report format must preserve it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordBatch {
    spans: Vec<WordSpan>,
}

impl WordBatch {
    /// Normalize raw recognizer output into a batch.
    ///
    /// Each word is trimmed; records whose word becomes empty are dropped
    /// entirely (never persisted or emitted). Records with `end < start` are
    /// kept as-is — we flag them rather than silently "fixing" what the
    /// recognizer emitted.
    pub fn from_raw(raw: impl IntoIterator<Item = RawWord>) -> Self {
        let mut spans = Vec::new();

        for record in raw {
            let word = record.word.trim();
            if word.is_empty() {
                continue;
            }

            if record.start < 0.0 {
                warn!(
                    word,
                    start = record.start,
                    "word span starts before zero; keeping recognizer output as-is"
                );
            }

            if record.end < record.start {
                warn!(
                    word,
                    start = record.start,
                    end = record.end,
                    "word span ends before it starts; keeping recognizer output as-is"
                );
            }

            spans.push(WordSpan {
                word: word.to_owned(),
                start: record.start,
                end: record.end,
            });
        }

        Self { spans }
    }

    /// Build a batch from spans that are already normalized (e.g. read back
    /// from the store).
    pub fn from_spans(spans: Vec<WordSpan>) -> Self {
        Self { spans }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WordSpan> {
        self.spans.iter()
    }

    pub fn spans(&self) -> &[WordSpan] {
        &self.spans
    }
}

impl<'a> IntoIterator for &'a WordBatch {
    type Item = &'a WordSpan;
    type IntoIter = std::slice::Iter<'a, WordSpan>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(word: &str, start: f64, end: f64) -> RawWord {
        RawWord {
            word: word.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn from_raw_trims_surrounding_whitespace() {
        let batch = WordBatch::from_raw(vec![raw(" Hello", 0.0, 0.5), raw("world \t", 0.5, 1.2)]);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.spans()[0].word, "Hello");
        assert_eq!(batch.spans()[1].word, "world");
    }

    #[test]
    fn from_raw_drops_whitespace_only_words() {
        let batch = WordBatch::from_raw(vec![
            raw("   ", 0.0, 0.1),
            raw("kept", 0.1, 0.2),
            raw("\n", 0.2, 0.3),
        ]);

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.spans()[0].word, "kept");
    }

    #[test]
    fn from_raw_preserves_order() {
        let batch = WordBatch::from_raw(vec![
            raw("one", 0.0, 0.2),
            raw("two", 0.2, 0.4),
            raw("three", 0.4, 0.6),
        ]);

        let words: Vec<&str> = batch.iter().map(|s| s.word.as_str()).collect();
        assert_eq!(words, vec!["one", "two", "three"]);
    }

    #[test]
    fn from_raw_keeps_inverted_spans_unmodified() {
        let batch = WordBatch::from_raw(vec![raw("odd", 1.0, 0.5)]);

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.spans()[0].start, 1.0);
        assert_eq!(batch.spans()[0].end, 0.5);
    }

    #[test]
    fn from_raw_keeps_negative_starts_unmodified() {
        let batch = WordBatch::from_raw(vec![raw("early", -0.25, 0.1)]);

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.spans()[0].start, -0.25);
        assert_eq!(batch.spans()[0].end, 0.1);
    }

    #[test]
    fn from_raw_tolerates_zero_length_spans() {
        let batch = WordBatch::from_raw(vec![raw("tick", 2.0, 2.0)]);
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn empty_input_yields_empty_batch() {
        let batch = WordBatch::from_raw(Vec::new());
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }
}
