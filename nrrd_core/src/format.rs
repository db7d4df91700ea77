use crate::error::{NrrdError, Result};

/// Marker every NRRD file starts with. The characters that follow on the same
/// line (e.g. `0004`) are the format revision and are kept verbatim.
pub const MAGIC: &str = "NRRD";

/// Magic line emitted by [`crate::Writer`].
pub const WRITE_MAGIC: &str = "NRRD0004";

/// Fields every header must carry.
pub const REQUIRED_FIELDS: [&str; 4] = ["dimension", "type", "encoding", "sizes"];

/// Number of axes in a decodable volume: slice count, width, height.
pub const VOLUME_DIMENSION: usize = 3;

// ── Element kinds ───────────────────────────────────────────────────────────

/// Numeric type of each payload value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    U8,
    I16,
    F32,
}

impl ElementKind {
    /// Resolve a header `type` value.
    ///
    /// `"unsigned int"` maps to 16-bit signed, same as `"short"`.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "unsigned char" => Ok(ElementKind::U8),
            "unsigned int" | "short" | "int16" => Ok(ElementKind::I16),
            "float" => Ok(ElementKind::F32),
            other => Err(NrrdError::UnsupportedType(other.to_owned())),
        }
    }

    /// Canonical header spelling, used by the writer.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::U8 => "unsigned char",
            ElementKind::I16 => "short",
            ElementKind::F32 => "float",
        }
    }

    /// Bytes per element in a binary payload.
    pub fn width(&self) -> usize {
        match self {
            ElementKind::U8 => 1,
            ElementKind::I16 => 2,
            ElementKind::F32 => 4,
        }
    }
}

// ── Encodings ───────────────────────────────────────────────────────────────

/// How the payload bytes following the header are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Gzip,
    Bzip2,
    Raw,
    Ascii,
}

impl Encoding {
    /// Resolve a header `encoding` value, aliases included.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "gzip" | "gz" => Ok(Encoding::Gzip),
            "bzip2" | "bz2" => Ok(Encoding::Bzip2),
            "raw" => Ok(Encoding::Raw),
            "txt" | "text" | "ascii" => Ok(Encoding::Ascii),
            other => Err(NrrdError::UnsupportedEncoding(other.to_owned())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Gzip => "gzip",
            Encoding::Bzip2 => "bzip2",
            Encoding::Raw => "raw",
            Encoding::Ascii => "ascii",
        }
    }

    /// Text payloads are parsed token by token instead of reinterpreted.
    pub fn is_text(&self) -> bool {
        matches!(self, Encoding::Ascii)
    }
}
