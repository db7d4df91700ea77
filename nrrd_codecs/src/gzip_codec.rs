use std::io::{Read, Write};

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::trace;

use nrrd_core::codec::Codec;
use nrrd_core::error::{NrrdError, Result};
use nrrd_core::format::Encoding;

use crate::take_expected;

/// Gzip payload codec.
///
/// The remainder of the stream is decompressed fully into memory, then cut
/// to the expected length. Concatenated gzip members are decoded as one.
pub struct GzipCodec {
    /// Compression level used when writing (0 = store, 9 = smallest).
    pub level: u32,
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl GzipCodec {
    /// Levels above 9 are clamped to 9.
    pub fn new(level: u32) -> Self {
        Self { level: level.min(9) }
    }
}

impl Codec for GzipCodec {
    fn encoding(&self) -> Encoding {
        Encoding::Gzip
    }

    fn name(&self) -> &'static str {
        "gzip"
    }

    fn read_payload(&self, input: &mut dyn Read, expected_len: usize) -> Result<Vec<u8>> {
        let mut decompressed = Vec::new();
        let mut decoder = MultiGzDecoder::new(input);
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| NrrdError::Decompression(format!("gzip: {}", e)))?;
        trace!("gzip decompressed {} bytes", decompressed.len());
        take_expected(decompressed, expected_len)
    }

    fn write_payload(&self, raw: &[u8], out: &mut dyn Write) -> Result<()> {
        let mut encoder = GzEncoder::new(out, Compression::new(self.level));
        encoder.write_all(raw)?;
        encoder.finish()?;
        Ok(())
    }
}
