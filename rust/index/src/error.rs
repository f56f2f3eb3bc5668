use thiserror::Error;
use vsearch_error::{ErrorCode, VectorSearchError};
use vsearch_types::PointId;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("point id {0} already present")]
    IdConflict(PointId),
    #[error("point id {0} not present")]
    IdMissing(PointId),
    #[error("expected {expected}-dimensional vector, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("no dispatch target for {0}")]
    UnimplementedSpecialization(String),
    #[error("graph error: {0}")]
    Graph(#[from] vsearch_graph::GraphError),
    #[error("dataset error: {0}")]
    Dataset(#[from] vsearch_dataset::DatasetError),
    #[error("centroid count must be positive")]
    InvalidCentroidCount,
    #[error("ivf index must be trained with centroids before points are added")]
    Untrained,
    #[error("index has no entry point yet (no points added)")]
    EmptyIndex,
    #[error("io error: {0}")]
    Io(String),
}

impl VectorSearchError for IndexError {
    fn code(&self) -> ErrorCode {
        match self {
            IndexError::IdConflict(_) => ErrorCode::IdConflict,
            IndexError::IdMissing(_) => ErrorCode::IdMissing,
            IndexError::DimensionMismatch { .. } => ErrorCode::DimensionMismatch,
            IndexError::UnimplementedSpecialization(_) => ErrorCode::UnimplementedSpecialization,
            IndexError::Graph(e) => e.code(),
            IndexError::Dataset(e) => e.code(),
            IndexError::InvalidCentroidCount => ErrorCode::InvariantViolation,
            IndexError::Untrained => ErrorCode::InvariantViolation,
            IndexError::EmptyIndex => ErrorCode::InvariantViolation,
            IndexError::Io(_) => ErrorCode::IOError,
        }
    }

    fn should_trace(&self) -> bool {
        // A clean, caller-driven id lookup miss is expected often enough
        // not to warrant a trace event every time.
        !matches!(self, IndexError::IdMissing(_))
    }
}
