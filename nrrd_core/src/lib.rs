pub mod codec;
pub mod decoder;
pub mod error;
pub mod format;
pub mod header;
pub mod reader;
pub mod reshape;
pub mod tokenizer;
pub mod writer;

pub use codec::Codec;
pub use decoder::{decode, FlatBuffer};
pub use error::{NrrdError, Result};
pub use format::{ElementKind, Encoding, MAGIC};
pub use header::{parse_header, Header};
pub use reader::{Reader, Volume};
pub use reshape::{reshape, Plane, Shape};
pub use writer::Writer;
