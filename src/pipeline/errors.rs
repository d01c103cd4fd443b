//! Query errors

use thiserror::Error;

use crate::source::SourceError;

/// Result type for pipeline operations
pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    // ==================
    // Validation
    // ==================
    /// Required parameter absent
    #[error("Missing required parameter: {0}")]
    MissingParam(String),

    /// Parameter present but unusable
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParam { name: String, reason: String },

    /// Page past the last page of a non-empty result
    #[error("Page {page} exceeds total pages {total_pages}")]
    PageOutOfRange { page: usize, total_pages: usize },

    /// Cursor id that does not resolve to a document
    #[error("Unknown cursor: {0}")]
    UnknownCursor(String),

    // ==================
    // Upstream
    // ==================
    /// The primary collection could not be loaded
    #[error("Failed to load collection {collection}: {source}")]
    Upstream {
        collection: String,
        #[source]
        source: SourceError,
    },
}

impl QueryError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        QueryError::InvalidParam {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the request rather than the store.
    pub fn is_validation(&self) -> bool {
        !matches!(self, QueryError::Upstream { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(QueryError::MissingParam("collection".into()).is_validation());
        assert!(QueryError::PageOutOfRange { page: 4, total_pages: 3 }.is_validation());
        assert!(!QueryError::Upstream {
            collection: "users".into(),
            source: SourceError::Backend("down".into()),
        }
        .is_validation());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            QueryError::PageOutOfRange { page: 4, total_pages: 3 }.to_string(),
            "Page 4 exceeds total pages 3"
        );
    }
}
