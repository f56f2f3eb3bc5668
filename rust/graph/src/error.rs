use thiserror::Error;
use vsearch_error::{ErrorCode, VectorSearchError};

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("node {0} is out of range for a graph with {1} nodes")]
    NodeOutOfRange(u32, usize),
    #[error("search buffer total_capacity ({total_capacity}) must be >= window_size ({window_size})")]
    InvalidBufferConfig {
        window_size: usize,
        total_capacity: usize,
    },
    #[error("schedule scale_buffer_capacity ({buffer_capacity}) must be >= scale_search_window ({search_window})")]
    InvalidSchedule {
        buffer_capacity: usize,
        search_window: usize,
    },
    #[error("schedule batch_size_start must be >= 1, got {0}")]
    InvalidBatchSize(usize),
    #[error("calibrate() is not supported in this context: {0}")]
    CalibrationContext(String),
    #[error(transparent)]
    Artifact(#[from] vsearch_config::artifact::ArtifactError),
}

impl VectorSearchError for GraphError {
    fn code(&self) -> ErrorCode {
        match self {
            GraphError::NodeOutOfRange(..) => ErrorCode::OutOfRange,
            GraphError::InvalidBufferConfig { .. }
            | GraphError::InvalidSchedule { .. }
            | GraphError::InvalidBatchSize(_) => ErrorCode::InvariantViolation,
            GraphError::CalibrationContext(_) => ErrorCode::CalibrationContextError,
            GraphError::Artifact(e) => e.code(),
        }
    }
}
