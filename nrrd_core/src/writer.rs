use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::codec::Codec;
use crate::decoder::FlatBuffer;
use crate::error::Result;
use crate::format::{ElementKind, WRITE_MAGIC};
use crate::reshape::{self, Plane};

/// Writes planes as an attached-header NRRD volume.
///
/// # Layout written
/// ```text
/// NRRD0004
/// type: <kind>
/// dimension: 3
/// sizes: <slices> <width> <height>
/// encoding: <codec encoding>
///                                   <- blank line
/// [payload encoded by the codec]
/// ```
/// Plane values are narrowed to `kind` with `as` casts before encoding.
pub struct Writer {
    codec: Box<dyn Codec>,
    kind: ElementKind,
}

impl Writer {
    pub fn new(codec: Box<dyn Codec>, kind: ElementKind) -> Self {
        Self { codec, kind }
    }

    /// Create `path` (overwriting it) and write `planes` into it.
    pub fn create(&self, path: impl AsRef<Path>, planes: &[Plane]) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_volume(&mut out, planes)?;
        out.flush()?;
        Ok(())
    }

    /// Serialize header and payload into `out`.
    pub fn write_volume(&self, out: &mut dyn Write, planes: &[Plane]) -> Result<()> {
        let (shape, values) = reshape::flatten(planes)?;
        let buffer = FlatBuffer::from_values(self.kind, &values);

        writeln!(out, "{}", WRITE_MAGIC)?;
        writeln!(out, "type: {}", self.kind.name())?;
        writeln!(out, "dimension: 3")?;
        writeln!(out, "sizes: {} {} {}", shape.slices, shape.width, shape.height)?;
        writeln!(out, "encoding: {}", self.codec.encoding().name())?;
        writeln!(out)?;

        let raw = if self.codec.encoding().is_text() {
            buffer.to_text().into_bytes()
        } else {
            buffer.to_bytes()
        };
        debug!(
            "writing {} planes, {} payload bytes before {} encoding",
            shape.slices,
            raw.len(),
            self.codec.name()
        );
        self.codec.write_payload(&raw, out)
    }
}
