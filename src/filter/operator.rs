//! Filter operators

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::FilterParseError;

/// Comparison operators accepted in filter criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "eq")]
    Eq,

    #[serde(rename = "ne")]
    Ne,

    #[serde(rename = "gt")]
    Gt,

    #[serde(rename = "gte")]
    Gte,

    #[serde(rename = "lt")]
    Lt,

    #[serde(rename = "lte")]
    Lte,

    /// Value is a member of a list
    #[serde(rename = "in")]
    In,

    /// Case-insensitive substring
    #[serde(rename = "contains")]
    Contains,

    #[serde(rename = "startsWith")]
    StartsWith,

    #[serde(rename = "endsWith")]
    EndsWith,

    /// Inclusive range between `value` and `value2`
    #[serde(rename = "between")]
    Between,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Ne => "ne",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::In => "in",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::EndsWith => "endsWith",
            FilterOperator::Between => "between",
        }
    }

    /// Operators that only make sense on text.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FilterOperator::Contains
                | FilterOperator::StartsWith
                | FilterOperator::EndsWith
                | FilterOperator::In
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.trim().to_ascii_lowercase().as_str() {
            "eq" => FilterOperator::Eq,
            "ne" => FilterOperator::Ne,
            "gt" => FilterOperator::Gt,
            "gte" => FilterOperator::Gte,
            "lt" => FilterOperator::Lt,
            "lte" => FilterOperator::Lte,
            "in" => FilterOperator::In,
            "contains" => FilterOperator::Contains,
            "startswith" => FilterOperator::StartsWith,
            "endswith" => FilterOperator::EndsWith,
            "between" => FilterOperator::Between,
            _ => return Err(FilterParseError::UnknownOperator(s.to_string())),
        };
        Ok(op)
    }
}
