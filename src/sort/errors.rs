//! Sort parsing errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SortParseError {
    /// Order other than asc/desc
    #[error("Invalid sort order: {0}")]
    InvalidOrder(String),

    /// Criteria without a usable field
    #[error("Invalid sort criteria: {0}")]
    InvalidCriteria(String),

    /// Special sort with unusable parameters
    #[error("Invalid special sort: {0}")]
    InvalidSpecialSort(String),
}
