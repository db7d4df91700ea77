//! NRRD header parsing.
//!
//! # Header structure
//! ```text
//! NRRD0004                  <- magic line, must start with "NRRD"
//! # comment                 <- skipped
//! type: short               <- key : value, flexible whitespace around ':'
//! dimension: 3
//! sizes: 4 64 48
//! encoding: gzip
//!                           <- blank line, payload starts right after it
//! ```

use std::collections::HashMap;
use std::io::BufRead;

use log::{debug, trace};

use crate::error::{NrrdError, Result};
use crate::format::{ElementKind, Encoding, MAGIC, REQUIRED_FIELDS, VOLUME_DIMENSION};
use crate::reshape::Shape;
use crate::tokenizer::{field_tokenizer, whitespace_tokenizer};

/// Field name to raw value mapping read from the text header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    magic: String,
    fields: HashMap<String, String>,
}

impl Header {
    /// An empty header carrying the given magic line.
    pub fn new(magic: impl Into<String>) -> Self {
        Self {
            magic: magic.into(),
            fields: HashMap::new(),
        }
    }

    /// The full magic line, e.g. `NRRD0004`.
    pub fn magic(&self) -> &str {
        &self.magic
    }

    /// Insert a field. A repeated key replaces the earlier value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Like [`Header::get`] but a missing key is [`NrrdError::MissingField`].
    pub fn required(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| NrrdError::MissingField(key.to_owned()))
    }

    /// All fields sorted by key, for stable display.
    pub fn fields(&self) -> Vec<(&str, &str)> {
        let mut fields: Vec<(&str, &str)> = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        fields.sort_unstable();
        fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Integer value of `dimension`.
    pub fn dimension(&self) -> Result<usize> {
        let raw = self.required("dimension")?;
        raw.parse()
            .map_err(|_| NrrdError::MalformedToken(raw.to_owned()))
    }

    /// The size vector. Every extent must be a positive integer.
    pub fn sizes(&self) -> Result<Vec<usize>> {
        whitespace_tokenizer().split_with(self.required("sizes")?, |token| {
            token.parse::<usize>().ok().filter(|&n| n > 0).ok_or(())
        })
    }

    /// Slice count, width and height from a three-entry size vector.
    ///
    /// The payload byte length at the declared element width must fit in a
    /// `usize`, otherwise the size vector is reported as malformed.
    pub fn shape(&self) -> Result<Shape> {
        let sizes = self.sizes()?;
        if sizes.len() != VOLUME_DIMENSION {
            return Err(NrrdError::UnsupportedDimension(sizes.len()));
        }
        let shape = Shape::new(sizes[0], sizes[1], sizes[2]);
        let width = self.element_kind()?.width();
        if shape.checked_byte_len(width).is_none() {
            return Err(NrrdError::MalformedToken(self.required("sizes")?.to_owned()));
        }
        Ok(shape)
    }

    pub fn element_kind(&self) -> Result<ElementKind> {
        ElementKind::from_name(self.required("type")?)
    }

    pub fn encoding(&self) -> Result<Encoding> {
        Encoding::from_name(self.required("encoding")?)
    }

    /// Check required fields and the `dimension`/`sizes` agreement.
    pub fn validate(&self) -> Result<()> {
        for key in REQUIRED_FIELDS {
            self.required(key)?;
        }

        let expected = self.dimension()?;
        let found = whitespace_tokenizer().split(self.required("sizes")?).len();
        if expected != found {
            return Err(NrrdError::DimensionMismatch { expected, found });
        }
        Ok(())
    }
}

/// Parse the header at the start of `input`.
///
/// Returns the validated header and the number of bytes consumed, which is the
/// payload offset. `input` is left positioned at the first payload byte, so
/// the payload decoder can keep reading from the same reader.
pub fn parse_header<R: BufRead>(input: &mut R) -> Result<(Header, u64)> {
    let mut consumed = 0u64;

    // Binary files passed by mistake must still surface as a bad magic.
    let mut first = Vec::new();
    consumed += input.read_until(b'\n', &mut first)? as u64;
    let magic = String::from_utf8_lossy(&first);
    let magic = strip_newline(&magic);
    if !first.starts_with(MAGIC.as_bytes()) {
        return Err(NrrdError::InvalidMagic(magic.to_owned()));
    }
    let mut header = Header::new(magic);

    let mut line = String::new();
    loop {
        line.clear();
        let n = input.read_line(&mut line)?;
        consumed += n as u64;

        let row = strip_newline(&line).trim();
        // EOF ends the header just like a blank line; validation catches the rest.
        if n == 0 || row.is_empty() {
            break;
        }
        if row.starts_with('#') {
            trace!("skipping comment: {}", row);
            continue;
        }

        let mut tokens = field_tokenizer().split(row);
        if tokens.len() != 2 {
            return Err(NrrdError::MalformedField(row.to_owned()));
        }
        let value = tokens.pop().unwrap_or_default();
        let key = tokens.pop().unwrap_or_default();
        trace!("field {:?} = {:?}", key, value);
        header.insert(key, value);
    }

    header.validate()?;
    debug!(
        "header parsed: magic={}, {} fields, payload at byte {}",
        header.magic(),
        header.len(),
        consumed
    );

    Ok((header, consumed))
}

fn strip_newline(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
