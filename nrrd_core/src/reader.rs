use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};

use crate::codec::Codec;
use crate::decoder::{self, FlatBuffer};
use crate::error::{NrrdError, Result};
use crate::format::{ElementKind, Encoding};
use crate::header::{parse_header, Header};
use crate::reshape::{self, Plane, Shape};

/// A fully decoded volume: the parsed header plus its planes in slice order.
#[derive(Debug, Clone)]
pub struct Volume {
    pub header: Header,
    pub planes: Vec<Plane>,
}

/// Header-first reader for NRRD streams.
///
/// # Open sequence
/// 1. Parse and validate the text header (magic, required fields, dimension).
/// 2. Resolve `type`, `encoding` and `sizes` into an element kind, an
///    encoding and a volume shape. Unsupported names fail here, before any
///    payload byte is touched.
///
/// The caller then picks a codec for [`Reader::encoding`] (see
/// `nrrd_codecs::codec_for`) and calls [`Reader::read_volume`], which decodes
/// the whole payload in one pass.
pub struct Reader<R> {
    input: R,
    header: Header,
    payload_offset: u64,
    kind: ElementKind,
    encoding: Encoding,
    shape: Shape,
}

impl Reader<BufReader<File>> {
    /// Open an NRRD file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening NRRD file: {}", path.display());
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: BufRead> Reader<R> {
    /// Parse the header from `input`, leaving it positioned at the payload.
    pub fn new(mut input: R) -> Result<Self> {
        let (header, payload_offset) = parse_header(&mut input)?;

        let kind = header.element_kind()?;
        let encoding = header.encoding()?;
        let shape = header.shape()?;

        if let Some(endian) = header.get("endian") {
            let host = if cfg!(target_endian = "big") { "big" } else { "little" };
            if endian != host {
                warn!(
                    "header declares {} endian data but values are read in host ({}) order",
                    endian, host
                );
            }
        }

        Ok(Self {
            input,
            header,
            payload_offset,
            kind,
            encoding,
            shape,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Byte offset of the first payload byte.
    pub fn payload_offset(&self) -> u64 {
        self.payload_offset
    }

    pub fn element_kind(&self) -> ElementKind {
        self.kind
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Decode the payload into a flat buffer without reshaping.
    ///
    /// `codec` must decode the header's encoding.
    pub fn read_buffer(&mut self, codec: &dyn Codec) -> Result<FlatBuffer> {
        if codec.encoding() != self.encoding {
            return Err(NrrdError::CodecMismatch {
                header: self.encoding.name(),
                codec: codec.encoding().name(),
            });
        }
        decoder::decode(
            &mut self.input,
            codec,
            self.kind,
            self.shape.element_count(),
        )
    }

    /// Decode the payload and split it into planes.
    ///
    /// Consumes the reader; the underlying stream is dropped on return,
    /// whether decoding succeeded or not.
    pub fn read_volume(mut self, codec: &dyn Codec) -> Result<Volume> {
        let buffer = self.read_buffer(codec)?;
        let planes = reshape::reshape(&buffer, self.shape)?;
        info!(
            "decoded {} planes of {}x{} ({:?}, {})",
            planes.len(),
            self.shape.width,
            self.shape.height,
            self.kind,
            self.encoding.name()
        );
        Ok(Volume {
            header: self.header,
            planes,
        })
    }
}
