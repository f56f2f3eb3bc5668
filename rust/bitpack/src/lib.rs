//! Sub-byte bit-packed vector storage.
//!
//! An [`Encoding`] defines how a single scalar maps to a `bits`-wide
//! integer field (`bits` in `[3,8]`, signed or unsigned). A
//! [`PackingStrategy`] defines how a sequence of such fields is laid out
//! in a byte buffer — [`Linear`] packs them back-to-back; [`Interleaved`]
//! groups them into cache-line-sized SIMD-friendly blocks. [`CompressedVector`]
//! and [`CompressedVectorMut`] are non-owning views over a byte buffer
//! combining an `Encoding` and a `PackingStrategy`.

mod encoding;
mod linear;
mod interleaved;
mod kind;
mod strategy;
mod vector;

pub use encoding::Encoding;
pub use interleaved::Interleaved;
pub use kind::PackingKind;
pub use linear::Linear;
pub use strategy::PackingStrategy;
pub use vector::{CompressedVector, CompressedVectorMut};

pub use vsearch_error::{ErrorCode, VectorSearchError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BitpackError {
    #[error("value {value} cannot be represented with {bits}-bit {signed} encoding")]
    OutOfRange {
        value: i64,
        bits: u8,
        signed: &'static str,
    },
    #[error("index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: usize, length: usize },
}

impl VectorSearchError for BitpackError {
    fn code(&self) -> ErrorCode {
        match self {
            BitpackError::OutOfRange { .. } => ErrorCode::OutOfRange,
            BitpackError::IndexOutOfBounds { .. } => ErrorCode::InvariantViolation,
        }
    }
}
