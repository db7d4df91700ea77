use std::io::{Read, Write};

use bzip2::read::MultiBzDecoder;
use bzip2::write::BzEncoder;
use bzip2::Compression;
use log::trace;

use nrrd_core::codec::Codec;
use nrrd_core::error::{NrrdError, Result};
use nrrd_core::format::Encoding;

use crate::take_expected;

/// Bzip2 payload codec. Same contract as [`crate::GzipCodec`].
pub struct Bzip2Codec {
    /// Block size level used when writing (1..=9).
    pub level: u32,
}

impl Default for Bzip2Codec {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl Bzip2Codec {
    /// Levels are clamped to 1..=9.
    pub fn new(level: u32) -> Self {
        Self {
            level: level.clamp(1, 9),
        }
    }
}

impl Codec for Bzip2Codec {
    fn encoding(&self) -> Encoding {
        Encoding::Bzip2
    }

    fn name(&self) -> &'static str {
        "bzip2"
    }

    fn read_payload(&self, input: &mut dyn Read, expected_len: usize) -> Result<Vec<u8>> {
        let mut decompressed = Vec::new();
        let mut decoder = MultiBzDecoder::new(input);
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| NrrdError::Decompression(format!("bzip2: {}", e)))?;
        trace!("bzip2 decompressed {} bytes", decompressed.len());
        take_expected(decompressed, expected_len)
    }

    fn write_payload(&self, raw: &[u8], out: &mut dyn Write) -> Result<()> {
        let mut encoder = BzEncoder::new(out, Compression::new(self.level));
        encoder.write_all(raw)?;
        encoder.finish()?;
        Ok(())
    }
}
