use crate::Result;
use crate::words::WordSpan;

/// Streaming encoder for time-aligned word spans.
///
/// Implementations write one span at a time so reports can be produced
/// without buffering the whole batch, and `close` finalizes the output
/// (trailing structure, flush). `close` is idempotent; writing after
/// `close` is an error.
pub trait SpanEncoder {
    fn write_span(&mut self, span: &WordSpan) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
