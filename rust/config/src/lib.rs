pub mod artifact;
pub mod helpers;
pub mod registry;

use async_trait::async_trait;
use registry::Registry;
use thiserror::Error;
use vsearch_error::{ErrorCode, VectorSearchError};

/// Configures a struct from a config object plus a [`Registry`] of already
/// -constructed dependencies.
///
/// Components that need process-level configuration (thread-pool sizing,
/// default search parameters, storage roots) implement this rather than
/// reading environment variables directly, so tests can inject config.
#[async_trait]
pub trait Configurable<T, E = Box<dyn VectorSearchError>> {
    async fn try_from_config(config: &T, registry: &Registry) -> Result<Self, E>
    where
        Self: Sized;
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
}

impl VectorSearchError for ConfigError {
    fn code(&self) -> ErrorCode {
        ErrorCode::Internal
    }
}
