/// Integration tests: full header -> payload -> planes pipeline through the
/// bundled codecs, plus the error surface a consumer sees.
use std::io::{Cursor, Write};

use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;

use nrrd_codecs::{codec_for, open_volume, read_volume, AsciiCodec, Bzip2Codec, GzipCodec, RawCodec};
use nrrd_core::{Codec, ElementKind, Encoding, NrrdError, Plane, Reader, Shape, Writer};

// ── helpers ───────────────────────────────────────────────────────────────

fn header_text(kind: &str, encoding: &str, sizes: &str) -> String {
    format!(
        "NRRD0004\n# generated for tests\ntype: {}\ndimension: 3\nsizes: {}\nencoding: {}\n\n",
        kind, sizes, encoding
    )
}

fn file_bytes(header: &str, payload: &[u8]) -> Vec<u8> {
    let mut bytes = header.as_bytes().to_vec();
    bytes.extend_from_slice(payload);
    bytes
}

fn i16_payload(values: &[i16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

/// Deterministic planes with distinct values per slice/row/col.
fn sample_planes(slices: usize, rows: usize, cols: usize) -> Vec<Plane> {
    (0..slices)
        .map(|s| {
            let data = (0..rows * cols)
                .map(|i| (s * 1000 + i * 7) as f64 - 300.0)
                .collect();
            Plane::from_vec(rows, cols, data).unwrap()
        })
        .collect()
}

fn write_then_read(codec: Box<dyn Codec>, kind: ElementKind, planes: &[Plane]) -> Vec<Plane> {
    let mut bytes = Vec::new();
    Writer::new(codec, kind).write_volume(&mut bytes, planes).unwrap();
    read_volume(Cursor::new(bytes)).unwrap().planes
}

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("nrrd_test_{}.nrrd", name))
}

// ── round trips ───────────────────────────────────────────────────────────

#[test]
fn test_roundtrip_raw_is_pixel_identical() {
    let planes = sample_planes(3, 4, 5);
    let decoded = write_then_read(Box::new(RawCodec), ElementKind::I16, &planes);
    assert_eq!(decoded, planes);
}

#[test]
fn test_roundtrip_every_codec() {
    let planes = sample_planes(2, 3, 4);
    for encoding in [Encoding::Raw, Encoding::Gzip, Encoding::Bzip2, Encoding::Ascii] {
        let decoded = write_then_read(codec_for(encoding), ElementKind::F32, &planes);
        assert_eq!(decoded, planes, "{} round-trip should be exact", encoding.name());
    }
}

#[test]
fn test_roundtrip_u8_narrows() {
    let planes = vec![Plane::from_vec(2, 2, vec![0.0, 1.0, 254.0, 255.0]).unwrap()];
    let decoded = write_then_read(Box::new(GzipCodec::new(9)), ElementKind::U8, &planes);
    assert_eq!(decoded, planes);
}

// ── codecs against standard encoders ──────────────────────────────────────

#[test]
fn test_gzip_payload_from_flate2() {
    let values: Vec<i16> = (0..24).map(|v| v * 3 - 20).collect();
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&i16_payload(&values)).unwrap();
    let payload = encoder.finish().unwrap();

    let bytes = file_bytes(&header_text("short", "gzip", "2 3 4"), &payload);
    let reader = Reader::new(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.shape(), Shape::new(2, 3, 4));
    let volume = reader.read_volume(&GzipCodec::default()).unwrap();

    // slice 1, row 2, col 3 -> (3 * 3 + 2) * 2 + 1
    assert_eq!(volume.planes[1].get(2, 3), values[23] as f64);
    assert_eq!(volume.planes[0].get(0, 0), values[0] as f64);
}

#[test]
fn test_bzip2_payload_from_bzip2_crate() {
    let values: Vec<f32> = (0..8).map(|v| v as f32 * 0.5).collect();
    let raw: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
    let mut encoder = BzEncoder::new(Vec::new(), bzip2::Compression::best());
    encoder.write_all(&raw).unwrap();
    let payload = encoder.finish().unwrap();

    let bytes = file_bytes(&header_text("float", "bz2", "1 2 4"), &payload);
    let volume = read_volume(Cursor::new(bytes)).unwrap();
    assert_eq!(volume.planes.len(), 1);
    // row j, col k <- offset k * 2 + j
    assert_eq!(volume.planes[0].get(1, 3), values[7] as f64);
    assert_eq!(volume.planes[0].get(0, 1), values[2] as f64);
}

#[test]
fn test_gzip_trailing_bytes_ignored() {
    let mut raw = i16_payload(&[1, 2, 3, 4]);
    raw.extend_from_slice(&[9, 9, 9]);
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&raw).unwrap();

    let bytes = file_bytes(&header_text("int16", "gz", "1 2 2"), &encoder.finish().unwrap());
    let volume = read_volume(Cursor::new(bytes)).unwrap();
    assert_eq!(volume.planes[0].as_slice(), &[1.0, 3.0, 2.0, 4.0]);
}

#[test]
fn test_ascii_payload_with_irregular_whitespace() {
    let bytes = file_bytes(
        &header_text("unsigned char", "text", "1 2 2"),
        b"\n  10   20\n\n30\t40   \n50 60\n",
    );
    let volume = read_volume(Cursor::new(bytes)).unwrap();
    assert_eq!(volume.planes[0].as_slice(), &[10.0, 30.0, 20.0, 40.0]);
}

#[test]
fn test_header_retained_with_planes() {
    let bytes = file_bytes(
        &header_text("short", "raw", "1 1 2"),
        &i16_payload(&[7, 8]),
    );
    let volume = read_volume(Cursor::new(bytes)).unwrap();
    assert_eq!(volume.header.get("encoding"), Some("raw"));
    assert_eq!(volume.header.magic(), "NRRD0004");
    assert_eq!(volume.header.len(), 4);
}

// ── error surface ─────────────────────────────────────────────────────────

#[test]
fn test_truncated_raw_payload_exact_counts() {
    // 2 x 2 x 2 int16 = 16 bytes expected, 11 provided.
    let mut payload = i16_payload(&[1, 2, 3, 4, 5]);
    payload.push(0);
    let bytes = file_bytes(&header_text("short", "raw", "2 2 2"), &payload);
    let err = read_volume(Cursor::new(bytes)).unwrap_err();
    assert!(
        matches!(err, NrrdError::TruncatedPayload { expected: 16, got: 11 }),
        "got {:?}",
        err
    );
}

#[test]
fn test_truncated_gzip_payload() {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&[1, 2, 3]).unwrap();
    let bytes = file_bytes(&header_text("unsigned char", "gzip", "1 2 2"), &encoder.finish().unwrap());
    let err = read_volume(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, NrrdError::TruncatedPayload { expected: 4, got: 3 }));
}

#[test]
fn test_corrupt_gzip_payload() {
    let bytes = file_bytes(&header_text("unsigned char", "gzip", "1 2 2"), b"definitely not gzip");
    let err = read_volume(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, NrrdError::Decompression(_)), "got {:?}", err);
}

#[test]
fn test_corrupt_bzip2_payload() {
    let bytes = file_bytes(&header_text("short", "bzip2", "1 2 2"), b"BZh9 but not really bzip2");
    let err = read_volume(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, NrrdError::Decompression(_)), "got {:?}", err);
}

#[test]
fn test_sizes_overflowing_byte_count() {
    let bytes = file_bytes(&header_text("float", "raw", "4611686018427387904 1 1"), &[0; 16]);
    let err = read_volume(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, NrrdError::MalformedToken(_)), "got {:?}", err);

    let bytes = file_bytes(&header_text("unsigned char", "raw", "4294967296 4294967296 2"), &[0; 4]);
    let err = read_volume(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, NrrdError::MalformedToken(_)), "got {:?}", err);
}

#[test]
fn test_declared_volume_far_larger_than_payload() {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&[1, 2, 3, 4]).unwrap();
    let gzipped = encoder.finish().unwrap();

    let huge = "100000 100000 100000";
    for (encoding, payload) in [("raw", vec![1, 2, 3, 4]), ("gzip", gzipped)] {
        let bytes = file_bytes(&header_text("unsigned char", encoding, huge), &payload);
        let err = read_volume(Cursor::new(bytes)).unwrap_err();
        assert!(
            matches!(err, NrrdError::TruncatedPayload { expected: 1_000_000_000_000_000, got: 4 }),
            "{}: got {:?}",
            encoding,
            err
        );
    }
}

#[test]
fn test_binary_file_is_invalid_magic() {
    let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00".to_vec();
    let err = read_volume(Cursor::new(png)).unwrap_err();
    assert!(matches!(err, NrrdError::InvalidMagic(_)), "got {:?}", err);
}

#[test]
fn test_unknown_encoding() {
    let bytes = file_bytes(&header_text("short", "zlib", "1 1 1"), &[0, 0]);
    let err = read_volume(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, NrrdError::UnsupportedEncoding(name) if name == "zlib"));
}

#[test]
fn test_unknown_type() {
    let bytes = file_bytes(&header_text("double", "raw", "1 1 1"), &[0; 8]);
    let err = read_volume(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, NrrdError::UnsupportedType(name) if name == "double"));
}

#[test]
fn test_missing_sizes_field() {
    let text = "NRRD0004\ntype: short\ndimension: 3\nencoding: raw\n\n";
    let err = read_volume(Cursor::new(text.as_bytes())).unwrap_err();
    assert!(matches!(err, NrrdError::MissingField(name) if name == "sizes"));
}

#[test]
fn test_dimension_mismatch() {
    let text = "NRRD0004\ntype: short\ndimension: 4\nsizes: 1 2 3\nencoding: raw\n\n";
    let err = read_volume(Cursor::new(text.as_bytes())).unwrap_err();
    assert!(matches!(err, NrrdError::DimensionMismatch { expected: 4, found: 3 }));
}

#[test]
fn test_malformed_ascii_token() {
    let bytes = file_bytes(&header_text("short", "ascii", "1 1 3"), b"1 two 3");
    let err = read_volume(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, NrrdError::MalformedToken(token) if token == "two"));
}

#[test]
fn test_codec_mismatch_error() {
    let bytes = file_bytes(&header_text("short", "raw", "1 1 1"), &i16_payload(&[5]));
    let reader = Reader::new(Cursor::new(bytes)).unwrap();
    let err = reader.read_volume(&Bzip2Codec::default()).unwrap_err();
    assert!(
        matches!(err, NrrdError::CodecMismatch { header: "raw", codec: "bzip2" }),
        "got {:?}",
        err
    );
}

#[test]
fn test_invalid_magic_is_reported() {
    let err = read_volume(Cursor::new(b"P5\n2 2\n255\n".to_vec())).unwrap_err();
    assert!(matches!(err, NrrdError::InvalidMagic(found) if found == "P5"));
}

// ── files on disk ─────────────────────────────────────────────────────────

#[test]
fn test_file_roundtrip_ascii() {
    let planes = sample_planes(2, 2, 3);
    let path = temp_path("ascii_file");
    Writer::new(Box::new(AsciiCodec), ElementKind::I16)
        .create(&path, &planes)
        .unwrap();

    let volume = open_volume(&path).unwrap();
    assert_eq!(volume.planes, planes);
    assert_eq!(volume.header.get("sizes"), Some("2 2 3"));
}

#[test]
fn test_missing_file_is_unreadable() {
    let err = open_volume(temp_path("does_not_exist_ever")).unwrap_err();
    assert!(matches!(err, NrrdError::FileUnreadable(_)));
}
