//! Filter parsing errors

use thiserror::Error;

/// Errors raised while decoding filter and special-filter definitions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterParseError {
    /// Operator name outside the supported set
    #[error("Unknown filter operator: {0}")]
    UnknownOperator(String),

    /// Criteria without a field path
    #[error("Filter criteria is missing a field")]
    MissingField,

    /// Structurally invalid filter definition
    #[error("Invalid filter: {0}")]
    Invalid(String),

    /// Special filter with unusable parameters
    #[error("Invalid special filter parameter: {0}")]
    InvalidParameter(String),
}
