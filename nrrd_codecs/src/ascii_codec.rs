use std::io::{Read, Write};

use nrrd_core::codec::Codec;
use nrrd_core::error::Result;
use nrrd_core::format::Encoding;

/// Whitespace-separated decimal numbers.
///
/// The codec only hands over the text; the decoder counts and parses tokens.
pub struct AsciiCodec;

impl Codec for AsciiCodec {
    fn encoding(&self) -> Encoding {
        Encoding::Ascii
    }

    fn name(&self) -> &'static str {
        "ascii"
    }

    fn read_payload(&self, input: &mut dyn Read, _expected_len: usize) -> Result<Vec<u8>> {
        let mut text = Vec::new();
        input.read_to_end(&mut text)?;
        Ok(text)
    }

    fn write_payload(&self, raw: &[u8], out: &mut dyn Write) -> Result<()> {
        out.write_all(raw)?;
        Ok(())
    }
}
