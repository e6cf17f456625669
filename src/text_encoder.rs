use std::io::Write;

use crate::span_encoder::SpanEncoder;
use crate::words::WordSpan;
use crate::{Error, Result};

/// A `SpanEncoder` that writes the plain-text report format.
///
/// One line per word span: `[<start to 2 decimal places>] <word>`, in batch
/// order, newline-terminated. An empty batch produces an empty file.
pub struct TextEncoder<W: Write> {
    /// The underlying writer we stream lines into.
    w: W,

    /// Whether the encoder has been closed.
    closed: bool,
}

impl<W: Write> TextEncoder<W> {
    /// Create a new text encoder that writes to the provided writer.
    pub fn new(w: W) -> Self {
        Self { w, closed: false }
    }
}

impl<W: Write> SpanEncoder for TextEncoder<W> {
    fn write_span(&mut self, span: &WordSpan) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write span: encoder is already closed"));
        }

        writeln!(&mut self.w, "[{:.2}] {}", span.start, span.word)?;
        Ok(())
    }

    /// Flush the underlying writer. This is idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(word: &str, start: f64, end: f64) -> WordSpan {
        WordSpan {
            word: word.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn close_without_spans_emits_nothing() -> Result<()> {
        let mut out = Vec::new();
        let mut enc = TextEncoder::new(&mut out);
        enc.close()?;
        assert_eq!(out, b"");
        Ok(())
    }

    #[test]
    fn writes_one_bracketed_line_per_span() -> Result<()> {
        let mut out = Vec::new();
        let mut enc = TextEncoder::new(&mut out);

        enc.write_span(&span("Hello", 0.0, 0.5))?;
        enc.write_span(&span("world", 0.5, 1.2))?;
        enc.close()?;

        assert_eq!(
            std::str::from_utf8(&out).unwrap(),
            "[0.00] Hello\n[0.50] world\n"
        );
        Ok(())
    }

    #[test]
    fn start_times_round_to_two_decimals() -> Result<()> {
        let mut out = Vec::new();
        let mut enc = TextEncoder::new(&mut out);

        enc.write_span(&span("word", 1.2345, 2.0))?;
        enc.close()?;

        assert_eq!(std::str::from_utf8(&out).unwrap(), "[1.23] word\n");
        Ok(())
    }

    #[test]
    fn write_after_close_errors() -> Result<()> {
        let mut out = Vec::new();
        let mut enc = TextEncoder::new(&mut out);
        enc.close()?;

        let err = enc.write_span(&span("nope", 0.0, 1.0)).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
