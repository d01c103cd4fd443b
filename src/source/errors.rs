//! Document source errors

use thiserror::Error;

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors raised by a document source
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// Multi-key lookup over the backend limit
    #[error("Batch of {size} keys exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Backend failure (network, permissions, corrupt data)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Fixture file could not be read or decoded
    #[error("Fixture error: {0}")]
    Fixture(String),
}
