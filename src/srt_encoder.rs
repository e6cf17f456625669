use std::io::Write;

use crate::span_encoder::SpanEncoder;
use crate::words::WordSpan;
use crate::{Error, Result};

/// A `SpanEncoder` that writes SubRip (SRT) caption blocks.
///
/// Each span becomes one block: a 1-based sequential index line, a
/// `start --> end` timing line, the word, then a blank separator line. The
/// index matches the span's position in the batch. An empty batch produces an
/// empty file (zero blocks), which players accept.
pub struct SrtEncoder<W: Write> {
    /// The underlying writer we stream blocks into.
    w: W,

    /// Index assigned to the next caption block (SRT indices start at 1).
    next_index: u64,

    /// Whether the encoder has been closed.
    closed: bool,
}

impl<W: Write> SrtEncoder<W> {
    /// Create a new SRT encoder that writes to the provided writer.
    pub fn new(w: W) -> Self {
        Self {
            w,
            next_index: 1,
            closed: false,
        }
    }
}

impl<W: Write> SpanEncoder for SrtEncoder<W> {
    /// Write a single caption block.
    fn write_span(&mut self, span: &WordSpan) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write span: encoder is already closed"));
        }

        let start = format_timestamp_srt(span.start);
        let end = format_timestamp_srt(span.end);

        writeln!(&mut self.w, "{}", self.next_index)?;
        writeln!(&mut self.w, "{start} --> {end}")?;
        writeln!(&mut self.w, "{}", span.word)?;
        writeln!(&mut self.w)?;

        self.next_index += 1;
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

/// Format seconds into an SRT timestamp (`HH:MM:SS,mmm`).
///
/// Rounding policy:
/// - The millisecond field is **truncated** from the fractional second, never
///   rounded up, so a timestamp decodes back to the original value at
///   millisecond precision.
/// - Hours are zero-padded to two digits but have no upper bound.
fn format_timestamp_srt(seconds: f64) -> String {
    let total = seconds.floor() as u64;
    let millis = ((seconds - seconds.floor()) * 1000.0).floor() as u64;

    let sec = total % 60;
    let minutes = total / 60;

    let min = minutes % 60;
    let hours = minutes / 60;

    format!("{hours:02}:{min:02}:{sec:02},{millis:03}")
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
        let mut enc = SrtEncoder::new(&mut out);
        enc.close()?;
        assert_eq!(out, b"");
        Ok(())
    }

    #[test]
    fn writes_indexed_blocks_in_order() -> Result<()> {
        let mut out = Vec::new();
        let mut enc = SrtEncoder::new(&mut out);

        enc.write_span(&span("Hello", 0.0, 0.5))?;
        enc.write_span(&span("world", 0.5, 1.2))?;
        enc.close()?;

        let s = std::str::from_utf8(&out).unwrap();
        assert_eq!(
            s,
            "1\n00:00:00,000 --> 00:00:00,500\nHello\n\n\
             2\n00:00:00,500 --> 00:00:01,200\nworld\n\n"
        );
        Ok(())
    }

    #[test]
    fn write_after_close_errors() -> Result<()> {
        let mut out = Vec::new();
        let mut enc = SrtEncoder::new(&mut out);
        enc.close()?;

        let err = enc.write_span(&span("nope", 0.0, 1.0)).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }

    #[test]
    fn timestamp_truncates_milliseconds() {
        // 1.9999s is 1s + 999.9ms; truncation keeps 999, never rounds to 2s.
        assert_eq!(format_timestamp_srt(1.9999), "00:00:01,999");
        assert_eq!(format_timestamp_srt(0.0004), "00:00:00,000");
        assert_eq!(format_timestamp_srt(0.5), "00:00:00,500");
    }

    #[test]
    fn timestamp_splits_hours_minutes_seconds() {
        assert_eq!(format_timestamp_srt(0.0), "00:00:00,000");
        assert_eq!(format_timestamp_srt(65.123), "00:01:05,123");
        assert_eq!(format_timestamp_srt(3661.5), "01:01:01,500");
        // Hours overflow past two digits naturally.
        assert_eq!(format_timestamp_srt(360_000.0), "100:00:00,000");
    }

    #[test]
    fn timestamp_round_trips_at_millisecond_precision() {
        let pattern = |s: &str| {
            let bytes = s.as_bytes();
            s.len() >= 12
                && bytes[s.len() - 4] == b','
                && s[..s.len() - 4].split(':').count() == 3
        };

        for &seconds in &[0.0, 0.001, 0.5, 1.9999, 59.999, 61.25, 3599.001, 86_400.5] {
            let formatted = format_timestamp_srt(seconds);
            assert!(pattern(&formatted), "unexpected shape: {formatted}");

            let (hms, millis) = formatted.split_at(formatted.len() - 4);
            let millis: f64 = millis[1..].parse().unwrap();
            let parts: Vec<f64> = hms.split(':').map(|p| p.parse().unwrap()).collect();
            let decoded = parts[0] * 3600.0 + parts[1] * 60.0 + parts[2] + millis / 1000.0;

            // Millisecond truncation as the formatter defines it: whole
            // seconds plus the truncated fractional part.
            let truncated =
                seconds.floor() + ((seconds - seconds.floor()) * 1000.0).floor() / 1000.0;
            assert!(
                (decoded - truncated).abs() < 1e-9,
                "{seconds} -> {formatted} decoded to {decoded}, expected {truncated}"
            );
        }
    }
}
