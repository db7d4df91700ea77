//! Error type shared by every stage of the decode pipeline.

use thiserror::Error;

/// Every way reading (or writing) an NRRD volume can fail.
///
/// All variants are terminal for the current file: no partial plane sequence
/// is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum NrrdError {
    /// The underlying stream could not be opened or read.
    #[error("file unreadable: {0}")]
    FileUnreadable(#[from] std::io::Error),

    /// The first line does not carry the `NRRD` marker.
    #[error("invalid NRRD magic string, found {0:?}")]
    InvalidMagic(String),

    /// A header line is neither a comment nor a `key: value` pair.
    #[error("malformed header field: {0:?}")]
    MalformedField(String),

    /// One of `dimension`, `type`, `encoding`, `sizes` is absent.
    #[error("required field ({0}) not found")]
    MissingField(String),

    /// `dimension` disagrees with the number of tokens in `sizes`.
    #[error("mismatch between dimension ({expected}) and sizes ({found} values)")]
    DimensionMismatch { expected: usize, found: usize },

    /// `dimension` is well formed but the plane shape needs exactly three axes.
    #[error("unsupported dimension {0}: only slice x width x height volumes are supported")]
    UnsupportedDimension(usize),

    #[error("unsupported data type {0:?}")]
    UnsupportedType(String),

    #[error("unsupported encoding {0:?}")]
    UnsupportedEncoding(String),

    /// The payload holds fewer bytes (binary codecs) or tokens (text codec)
    /// than the size vector implies.
    #[error("truncated payload: expected {expected}, got {got}")]
    TruncatedPayload { expected: usize, got: usize },

    /// A numeric token in `sizes`, `dimension`, or a text payload failed to parse.
    #[error("malformed numeric token {0:?}")]
    MalformedToken(String),

    /// The gzip or bzip2 stream itself is corrupt.
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// The writer was given no planes.
    #[error("volume has no planes")]
    EmptyVolume,

    /// Row-major data whose length is not `rows * cols`.
    #[error("plane of {rows}x{cols} expected {} values, found {found}", .rows * .cols)]
    PlaneDataLength {
        rows: usize,
        cols: usize,
        found: usize,
    },

    /// Planes handed to the writer do not share one extent.
    #[error("plane shape mismatch: expected {expected:?}, found {found:?}")]
    PlaneShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// The codec handed to the reader does not decode the header's encoding.
    #[error("codec mismatch: header declares {header} but codec decodes {codec}")]
    CodecMismatch {
        header: &'static str,
        codec: &'static str,
    },
}

/// A convenience `Result` alias using [`NrrdError`].
pub type Result<T> = std::result::Result<T, NrrdError>;
