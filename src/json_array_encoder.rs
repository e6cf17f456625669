use std::io::Write;

use crate::span_encoder::SpanEncoder;
use crate::words::WordSpan;
use crate::{Error, Result};

/// A `SpanEncoder` that writes word spans as a pretty-printed JSON array.
///
/// Design:
/// - We stream output directly to a `Write` implementation so the whole batch
///   never needs to be buffered for serialization.
/// - The encoder is stateful so we can emit a well-formed array incrementally.
/// - Output is byte-identical to `serde_json::to_string_pretty` of the full
///   span list: elements indented two spaces, non-ASCII characters preserved
///   literally (serde_json does not escape them).
///
/// Example output:
/// ```json
/// [
///   {
///     "word": "Hello",
///     "start": 0.0,
///     "end": 0.5
///   }
/// ]
/// ```
pub struct JsonArrayEncoder<W: Write> {
    /// The underlying writer we stream JSON into.
    w: W,

    /// Whether we have written the opening `[` of the JSON array.
    started: bool,

    /// Whether the next element will be the first element in the array.
    /// This lets us correctly place commas between elements.
    first: bool,

    /// Whether the encoder has been closed.
    /// Once closed, no further writes are allowed.
    closed: bool,
}

impl<W: Write> JsonArrayEncoder<W> {
    /// Create a new JSON array encoder that writes to the given writer.
    ///
    /// The array is opened lazily so that an empty batch still results in
    /// valid JSON (`[]`) without emitting partial output up front.
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            first: true,
            closed: false,
        }
    }

    /// Write the opening of the JSON array if we have not already done so.
    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(b"[")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> SpanEncoder for JsonArrayEncoder<W> {
    /// Serialize a single span and append it to the JSON array.
    fn write_span(&mut self, span: &WordSpan) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write span: encoder is already closed"));
        }

        self.start_if_needed()?;

        // Comma before every element except the first.
        if !self.first {
            self.w.write_all(b",")?;
        }
        self.first = false;

        // Pretty-print the element on its own, then re-indent its lines one
        // level so the stream matches a pretty-printed array.
        let element = serde_json::to_string_pretty(span)?;
        for line in element.lines() {
            self.w.write_all(b"\n  ")?;
            self.w.write_all(line.as_bytes())?;
        }

        Ok(())
    }

    /// Finalize the JSON array and flush the underlying writer.
    ///
    /// This method is idempotent:
    /// - Calling `close()` multiple times is safe.
    /// - After closing, no further spans may be written.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        // Ensure we still output a valid JSON array even if no spans were written.
        self.start_if_needed()?;

        if !self.first {
            self.w.write_all(b"\n")?;
        }
        self.w.write_all(b"]")?;
        self.w.flush()?;

        self.closed = true;
        Ok(())
    }
}
