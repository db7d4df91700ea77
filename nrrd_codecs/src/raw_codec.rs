use std::io::{Read, Write};

use nrrd_core::codec::Codec;
use nrrd_core::error::{NrrdError, Result};
use nrrd_core::format::Encoding;

/// Uncompressed binary payload: elements stored back to back in host order.
///
/// Reads exactly the bytes the size vector implies and nothing more, so any
/// trailing data in the stream is left untouched.
pub struct RawCodec;

impl Codec for RawCodec {
    fn encoding(&self) -> Encoding {
        Encoding::Raw
    }

    fn name(&self) -> &'static str {
        "raw"
    }

    fn read_payload(&self, input: &mut dyn Read, expected_len: usize) -> Result<Vec<u8>> {
        let mut raw = Vec::new();
        input.take(expected_len as u64).read_to_end(&mut raw)?;
        if raw.len() < expected_len {
            return Err(NrrdError::TruncatedPayload {
                expected: expected_len,
                got: raw.len(),
            });
        }
        Ok(raw)
    }

    fn write_payload(&self, raw: &[u8], out: &mut dyn Write) -> Result<()> {
        out.write_all(raw)?;
        Ok(())
    }
}
