use std::io::{Read, Write};

use crate::error::Result;
use crate::format::Encoding;

/// Payload encoding abstraction.
///
/// Each `Codec` implementation:
/// - Is identified by the [`Encoding`] it handles, which must match the
///   header's `encoding` field before the reader will use it.
/// - Turns the byte stream following the header into decoded payload bytes,
///   and back again for the writer.
/// - Owns any decompression state only for the duration of one call, so
///   filter chains are dropped on every exit path, errors included.
pub trait Codec: Send + Sync {
    /// The header encoding this codec decodes.
    fn encoding(&self) -> Encoding;

    /// Human-readable codec name for CLI display.
    fn name(&self) -> &'static str;

    /// Read the payload from `input`.
    ///
    /// Binary codecs return exactly `expected_len` decoded bytes (trailing
    /// decoded bytes are dropped) or fail with `TruncatedPayload`. Text codecs
    /// return the remainder of the stream and leave token counting to the
    /// decoder; for them `expected_len` is only a capacity hint.
    fn read_payload(&self, input: &mut dyn Read, expected_len: usize) -> Result<Vec<u8>>;

    /// Encode already-serialized payload bytes into `out`.
    fn write_payload(&self, raw: &[u8], out: &mut dyn Write) -> Result<()>;
}
