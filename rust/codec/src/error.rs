use thiserror::Error;
use vsearch_error::{ErrorCode, VectorSearchError};

#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("empty dataset cannot be compressed")]
    EmptyDataset,
    #[error("io error: {0}")]
    Io(String),
    #[error("expected schema {expected}, found {found}")]
    SchemaMismatch { expected: String, found: String },
    #[error("persisted version {found} is newer than supported version {max_supported}")]
    VersionMismatch { found: String, max_supported: String },
}

impl VectorSearchError for CompressionError {
    fn code(&self) -> ErrorCode {
        match self {
            CompressionError::DimensionMismatch { .. } => ErrorCode::DimensionMismatch,
            CompressionError::EmptyDataset => ErrorCode::InvariantViolation,
            CompressionError::Io(_) => ErrorCode::IOError,
            CompressionError::SchemaMismatch { .. } => ErrorCode::SchemaMismatch,
            CompressionError::VersionMismatch { .. } => ErrorCode::VersionMismatch,
        }
    }
}

/// Lowers an on-disk artifact failure to the matching `CompressionError`
/// variant instead of collapsing every cause into `EmptyDataset`.
impl From<vsearch_config::artifact::ArtifactError> for CompressionError {
    fn from(e: vsearch_config::artifact::ArtifactError) -> Self {
        use vsearch_config::artifact::ArtifactError;
        match e {
            ArtifactError::Io(io_err) => CompressionError::Io(io_err.to_string()),
            ArtifactError::Decode(err) => CompressionError::Io(err.to_string()),
            ArtifactError::Encode(err) => CompressionError::Io(err.to_string()),
            ArtifactError::MalformedVersion(s) => CompressionError::Io(s),
            ArtifactError::SchemaMismatch { expected, found } => CompressionError::SchemaMismatch { expected, found },
            ArtifactError::VersionMismatch { found, max_supported } => CompressionError::VersionMismatch {
                found: found.to_string(),
                max_supported: max_supported.to_string(),
            },
        }
    }
}
