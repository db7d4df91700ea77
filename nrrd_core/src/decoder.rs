//! Payload decoding: codec bytes to typed elements.

use std::borrow::Cow;
use std::io::Read;

use byteorder::{ByteOrder, NativeEndian};
use log::{debug, trace};

use crate::codec::Codec;
use crate::error::{NrrdError, Result};
use crate::format::{ElementKind, Encoding};
use crate::tokenizer::whitespace_tokenizer;

/// Decoded payload elements in file order, typed by the header's element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatBuffer {
    U8(Vec<u8>),
    I16(Vec<i16>),
    F32(Vec<f32>),
}

impl FlatBuffer {
    /// Reinterpret the first `count` elements of `bytes` in host byte order.
    ///
    /// Bytes past `count * width` are ignored; fewer is `TruncatedPayload`.
    pub fn from_bytes(kind: ElementKind, bytes: &[u8], count: usize) -> Result<Self> {
        let expected = byte_len(kind, count)?;
        if bytes.len() < expected {
            return Err(NrrdError::TruncatedPayload {
                expected,
                got: bytes.len(),
            });
        }
        let bytes = &bytes[..expected];

        Ok(match kind {
            ElementKind::U8 => FlatBuffer::U8(bytes.to_vec()),
            ElementKind::I16 => {
                let mut values = vec![0i16; count];
                NativeEndian::read_i16_into(bytes, &mut values);
                FlatBuffer::I16(values)
            }
            ElementKind::F32 => {
                let mut values = vec![0f32; count];
                NativeEndian::read_f32_into(bytes, &mut values);
                FlatBuffer::F32(values)
            }
        })
    }

    /// Parse exactly `count` whitespace-separated numbers from `text`.
    ///
    /// Integer kinds use the integer grammar, `F32` the float grammar.
    /// Tokens after the first `count` are ignored.
    pub fn from_text(kind: ElementKind, text: &str, count: usize) -> Result<Self> {
        let tokens = whitespace_tokenizer();
        let buffer = match kind {
            ElementKind::U8 => FlatBuffer::U8(tokens.take_with(text, count, str::parse::<u8>)?),
            ElementKind::I16 => FlatBuffer::I16(tokens.take_with(text, count, str::parse::<i16>)?),
            ElementKind::F32 => FlatBuffer::F32(tokens.take_with(text, count, str::parse::<f32>)?),
        };
        if buffer.len() < count {
            return Err(NrrdError::TruncatedPayload {
                expected: count,
                got: buffer.len(),
            });
        }
        Ok(buffer)
    }

    /// Narrow `values` to `kind` with saturating `as` casts.
    pub fn from_values(kind: ElementKind, values: &[f64]) -> Self {
        match kind {
            ElementKind::U8 => FlatBuffer::U8(values.iter().map(|&v| v as u8).collect()),
            ElementKind::I16 => FlatBuffer::I16(values.iter().map(|&v| v as i16).collect()),
            ElementKind::F32 => FlatBuffer::F32(values.iter().map(|&v| v as f32).collect()),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            FlatBuffer::U8(_) => ElementKind::U8,
            FlatBuffer::I16(_) => ElementKind::I16,
            FlatBuffer::F32(_) => ElementKind::F32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FlatBuffer::U8(v) => v.len(),
            FlatBuffer::I16(v) => v.len(),
            FlatBuffer::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `idx` widened to `f64`, which holds every supported kind exactly.
    #[inline]
    pub fn get(&self, idx: usize) -> f64 {
        match self {
            FlatBuffer::U8(v) => v[idx] as f64,
            FlatBuffer::I16(v) => v[idx] as f64,
            FlatBuffer::F32(v) => v[idx] as f64,
        }
    }

    /// Serialize in host byte order, the inverse of [`FlatBuffer::from_bytes`].
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            FlatBuffer::U8(v) => v.clone(),
            FlatBuffer::I16(v) => {
                let mut buf = vec![0u8; v.len() * 2];
                NativeEndian::write_i16_into(v, &mut buf);
                buf
            }
            FlatBuffer::F32(v) => {
                let mut buf = vec![0u8; v.len() * 4];
                NativeEndian::write_f32_into(v, &mut buf);
                buf
            }
        }
    }

    /// One element per line, the inverse of [`FlatBuffer::from_text`].
    pub fn to_text(&self) -> String {
        fn join<T: ToString>(values: &[T]) -> String {
            let mut out = String::new();
            for v in values {
                out.push_str(&v.to_string());
                out.push('\n');
            }
            out
        }
        match self {
            FlatBuffer::U8(v) => join(v),
            FlatBuffer::I16(v) => join(v),
            FlatBuffer::F32(v) => join(v),
        }
    }
}

/// Decode `element_count` elements of `kind` from the payload stream.
///
/// The codec produces the payload bytes; text encodings are then tokenized,
/// binary ones reinterpreted at the element kind's width.
pub fn decode(
    input: &mut dyn Read,
    codec: &dyn Codec,
    kind: ElementKind,
    element_count: usize,
) -> Result<FlatBuffer> {
    let expected_len = byte_len(kind, element_count)?;
    debug!(
        "decoding {} x {:?} with {} codec ({} bytes expected)",
        element_count,
        kind,
        codec.name(),
        expected_len
    );

    let bytes = codec.read_payload(input, expected_len)?;
    trace!("codec produced {} bytes", bytes.len());

    decode_bytes(&bytes, codec.encoding(), kind, element_count)
}

fn byte_len(kind: ElementKind, count: usize) -> Result<usize> {
    count
        .checked_mul(kind.width())
        .ok_or_else(|| NrrdError::MalformedToken(count.to_string()))
}

/// Interpret payload bytes already produced by a codec.
pub fn decode_bytes(
    bytes: &[u8],
    encoding: Encoding,
    kind: ElementKind,
    element_count: usize,
) -> Result<FlatBuffer> {
    if encoding.is_text() {
        let text: Cow<str> = String::from_utf8_lossy(bytes);
        FlatBuffer::from_text(kind, &text, element_count)
    } else {
        FlatBuffer::from_bytes(kind, bytes, element_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reinterpret_i16_native() {
        let mut bytes = Vec::new();
        for v in [1i16, -2, 300] {
            bytes.extend_from_slice(&v.to_ne_bytes());
        }
        let buffer = FlatBuffer::from_bytes(ElementKind::I16, &bytes, 3).unwrap();
        assert_eq!(buffer, FlatBuffer::I16(vec![1, -2, 300]));
    }

    #[test]
    fn test_reinterpret_f32_ignores_trailing_bytes() {
        let mut bytes = Vec::new();
        for v in [0.5f32, -1.25] {
            bytes.extend_from_slice(&v.to_ne_bytes());
        }
        bytes.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        let buffer = FlatBuffer::from_bytes(ElementKind::F32, &bytes, 2).unwrap();
        assert_eq!(buffer, FlatBuffer::F32(vec![0.5, -1.25]));
    }

    #[test]
    fn test_short_binary_payload() {
        let err = FlatBuffer::from_bytes(ElementKind::I16, &[0u8; 7], 4).unwrap_err();
        assert!(matches!(
            err,
            NrrdError::TruncatedPayload { expected: 8, got: 7 }
        ));
    }

    #[test]
    fn test_byte_count_overflow() {
        let err = FlatBuffer::from_bytes(ElementKind::F32, &[0u8; 8], usize::MAX / 2).unwrap_err();
        assert!(matches!(err, NrrdError::MalformedToken(_)));
    }

    #[test]
    fn test_text_ignores_layout() {
        let compact = FlatBuffer::from_text(ElementKind::I16, "1 2 3 4", 4).unwrap();
        let spread = FlatBuffer::from_text(ElementKind::I16, "\n\n  1\t2\n3\r\n   4  \n", 4).unwrap();
        assert_eq!(compact, spread);
        assert_eq!(compact, FlatBuffer::I16(vec![1, 2, 3, 4]));
    }

    #[test]
    fn test_text_float_grammar() {
        let buffer = FlatBuffer::from_text(ElementKind::F32, "1.5 -2e1 3", 3).unwrap();
        assert_eq!(buffer, FlatBuffer::F32(vec![1.5, -20.0, 3.0]));
    }

    #[test]
    fn test_text_integer_rejects_float() {
        let err = FlatBuffer::from_text(ElementKind::U8, "1 2.5 3", 3).unwrap_err();
        assert!(matches!(err, NrrdError::MalformedToken(token) if token == "2.5"));
    }

    #[test]
    fn test_text_too_few_tokens() {
        let err = FlatBuffer::from_text(ElementKind::U8, "1 2 3", 5).unwrap_err();
        assert!(matches!(
            err,
            NrrdError::TruncatedPayload { expected: 5, got: 3 }
        ));
    }

    #[test]
    fn test_bytes_and_text_roundtrip() {
        let buffer = FlatBuffer::F32(vec![0.25, 7.0, -3.5]);
        assert_eq!(FlatBuffer::from_bytes(ElementKind::F32, &buffer.to_bytes(), 3).unwrap(), buffer);
        assert_eq!(FlatBuffer::from_text(ElementKind::F32, &buffer.to_text(), 3).unwrap(), buffer);
    }

    #[test]
    fn test_decode_bytes_dispatches_on_encoding() {
        let text = decode_bytes(b"7 8", Encoding::Ascii, ElementKind::U8, 2).unwrap();
        assert_eq!(text, FlatBuffer::U8(vec![7, 8]));
        let raw = decode_bytes(b"78", Encoding::Raw, ElementKind::U8, 2).unwrap();
        assert_eq!(raw, FlatBuffer::U8(vec![b'7', b'8']));
    }
}
