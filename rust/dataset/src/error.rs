use thiserror::Error;
use vsearch_error::{ErrorCode, VectorSearchError};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DatasetError {
    #[error("index {index} out of bounds for dataset of size {size}")]
    OutOfRange { index: usize, size: usize },
    #[error("expected {expected} packed bytes per vector, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("permutation length {actual} does not match dataset size {expected}")]
    PermutationLengthMismatch { expected: usize, actual: usize },
    #[error("io error: {0}")]
    Io(String),
}

impl VectorSearchError for DatasetError {
    fn code(&self) -> ErrorCode {
        match self {
            DatasetError::OutOfRange { .. } => ErrorCode::OutOfRange,
            DatasetError::DimensionMismatch { .. } => ErrorCode::DimensionMismatch,
            DatasetError::PermutationLengthMismatch { .. } => ErrorCode::InvariantViolation,
            DatasetError::Io(_) => ErrorCode::IOError,
        }
    }
}
