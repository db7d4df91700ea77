mod ascii_codec;
mod bzip2_codec;
mod gzip_codec;
mod raw_codec;

pub use ascii_codec::AsciiCodec;
pub use bzip2_codec::Bzip2Codec;
pub use gzip_codec::GzipCodec;
pub use raw_codec::RawCodec;

use std::io::BufRead;
use std::path::Path;

use log::debug;
use nrrd_core::error::{NrrdError, Result};
use nrrd_core::{Codec, Encoding, Reader, Volume};

/// Resolve the codec for a header `encoding`.
///
/// Called after a first-pass header read, so the reader can be driven with
/// the right codec automatically.
pub fn codec_for(encoding: Encoding) -> Box<dyn Codec> {
    match encoding {
        Encoding::Raw => Box::new(RawCodec),
        Encoding::Gzip => Box::new(GzipCodec::default()),
        Encoding::Bzip2 => Box::new(Bzip2Codec::default()),
        Encoding::Ascii => Box::new(AsciiCodec),
    }
}

/// Read a whole volume from `input`: header, payload, planes.
///
/// This is the one-call pipeline consumers use; on error no planes are
/// returned and the stream is dropped.
pub fn read_volume<R: BufRead>(input: R) -> Result<Volume> {
    let reader = Reader::new(input)?;
    let codec = codec_for(reader.encoding());
    debug!("resolved codec {} for encoding {:?}", codec.name(), reader.encoding());
    reader.read_volume(codec.as_ref())
}

/// [`read_volume`] on a file path.
pub fn open_volume(path: impl AsRef<Path>) -> Result<Volume> {
    let reader = Reader::open(path)?;
    let codec = codec_for(reader.encoding());
    debug!("resolved codec {} for encoding {:?}", codec.name(), reader.encoding());
    reader.read_volume(codec.as_ref())
}

/// Cut a fully decompressed payload down to `expected_len` bytes.
pub(crate) fn take_expected(mut decompressed: Vec<u8>, expected_len: usize) -> Result<Vec<u8>> {
    if decompressed.len() < expected_len {
        return Err(NrrdError::TruncatedPayload {
            expected: expected_len,
            got: decompressed.len(),
        });
    }
    decompressed.truncate(expected_len);
    Ok(decompressed)
}
