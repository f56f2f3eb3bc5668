//! Shared error trait and error-code taxonomy.
//!
//! Every fallible operation in this workspace returns a crate-local error
//! enum (built with `thiserror`) that implements [`VectorSearchError`]. The
//! taxonomy in [`ErrorCode`] is closed and shared across crates so callers
//! can match on `code()` without caring which crate raised the error.

use std::error::Error;

/// Closed taxonomy of error kinds produced anywhere in this workspace.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum ErrorCode {
    /// A value cannot be represented in the target encoding.
    OutOfRange,
    /// Two shapes that must agree differ (e.g. query dim vs. index dim).
    DimensionMismatch,
    /// Insertion would violate external-ID uniqueness.
    IdConflict,
    /// Deletion referenced an ID that is not present.
    IdMissing,
    /// No dispatch target matches the requested specialization tuple.
    UnimplementedSpecialization,
    /// Persisted artifact version is newer than this build supports.
    VersionMismatch,
    /// Persisted artifact schema name does not match what was expected.
    SchemaMismatch,
    /// Underlying I/O failed.
    IOError,
    /// An internal invariant check failed.
    InvariantViolation,
    /// `calibrate` was invoked in a context that does not support it.
    CalibrationContextError,
    /// Anything not covered by the above.
    Internal,
}

impl ErrorCode {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::OutOfRange => "OutOfRange",
            ErrorCode::DimensionMismatch => "DimensionMismatch",
            ErrorCode::IdConflict => "IdConflict",
            ErrorCode::IdMissing => "IdMissing",
            ErrorCode::UnimplementedSpecialization => "UnimplementedSpecialization",
            ErrorCode::VersionMismatch => "VersionMismatch",
            ErrorCode::SchemaMismatch => "SchemaMismatch",
            ErrorCode::IOError => "IOError",
            ErrorCode::InvariantViolation => "InvariantViolation",
            ErrorCode::CalibrationContextError => "CalibrationContextError",
            ErrorCode::Internal => "Internal",
        }
    }
}

/// Implemented by every error enum raised from this workspace.
pub trait VectorSearchError: Error + Send + Sync {
    fn code(&self) -> ErrorCode;

    fn boxed(self) -> Box<dyn VectorSearchError>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }

    /// Whether this error should be logged at the point it's constructed
    /// (some errors, like a clean `IdMissing` on a caller-driven lookup,
    /// are expected often enough that tracing them is just noise).
    fn should_trace(&self) -> bool {
        true
    }
}

impl Error for Box<dyn VectorSearchError> {}

impl VectorSearchError for Box<dyn VectorSearchError> {
    fn code(&self) -> ErrorCode {
        self.as_ref().code()
    }

    fn should_trace(&self) -> bool {
        self.as_ref().should_trace()
    }
}

impl VectorSearchError for std::io::Error {
    fn code(&self) -> ErrorCode {
        ErrorCode::IOError
    }
}
