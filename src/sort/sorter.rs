//! Multi-key document sorting.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::path::{self, FieldPath};
use crate::value::Document;

use super::compare::{compare_keys, SortKey};
use super::errors::SortParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Result<Self, SortParseError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "asc" | "ascending" | "1" => Ok(SortOrder::Asc),
            "desc" | "descending" | "-1" => Ok(SortOrder::Desc),
            other => Err(SortParseError::InvalidOrder(other.to_string())),
        }
    }
}

/// One sort key in a priority list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortCriteria {
    pub field: FieldPath,
    pub order: SortOrder,
}

impl SortCriteria {
    pub fn new(field: impl Into<FieldPath>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    pub fn asc(field: impl Into<FieldPath>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: impl Into<FieldPath>) -> Self {
        Self::new(field, SortOrder::Desc)
    }

    /// Decode `[{field, order}]`, a single object, or `"a:asc,b:desc"`.
    pub fn list_from_json(json: &JsonValue) -> Result<Vec<Self>, SortParseError> {
        match json {
            JsonValue::Null => Ok(Vec::new()),
            JsonValue::String(s) => Self::parse_list(s),
            JsonValue::Array(items) => items.iter().map(Self::from_object).collect(),
            JsonValue::Object(_) => Ok(vec![Self::from_object(json)?]),
            other => Err(SortParseError::InvalidCriteria(other.to_string())),
        }
    }

    /// Parse the comma-separated `field:order` form.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, SortParseError> {
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (field, order) = part.split_once(':').unwrap_or((part, "asc"));
                let field = field.trim();
                if field.is_empty() {
                    return Err(SortParseError::InvalidCriteria(part.to_string()));
                }
                Ok(Self::new(field, SortOrder::parse(order)?))
            })
            .collect()
    }

    fn from_object(json: &JsonValue) -> Result<Self, SortParseError> {
        let field = json
            .get("field")
            .and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| SortParseError::InvalidCriteria(json.to_string()))?;
        let order = match json.get("order").or_else(|| json.get("direction")) {
            Some(JsonValue::String(s)) => SortOrder::parse(s)?,
            Some(JsonValue::Number(n)) if n.as_i64() == Some(-1) => SortOrder::Desc,
            _ => SortOrder::Asc,
        };
        Ok(Self::new(field, order))
    }
}

/// Sort keys of one document, one per criteria.
pub fn sort_keys(doc: &Document, criteria: &[SortCriteria]) -> Vec<SortKey> {
    criteria
        .iter()
        .map(|c| SortKey::from_value(path::get(doc, &c.field).as_ref()))
        .collect()
}

/// First non-equal key decides.
pub fn compare_key_lists(a: &[SortKey], b: &[SortKey], criteria: &[SortCriteria]) -> Ordering {
    criteria
        .iter()
        .zip(a.iter().zip(b.iter()))
        .map(|(c, (x, y))| compare_keys(x, y, c.order))
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

pub fn compare_by_criteria(a: &Document, b: &Document, criteria: &[SortCriteria]) -> Ordering {
    compare_key_lists(&sort_keys(a, criteria), &sort_keys(b, criteria), criteria)
}

/// Stable multi-key sort.
pub fn sort_by_criteria(docs: Vec<Document>, criteria: &[SortCriteria]) -> Vec<Document> {
    if criteria.is_empty() {
        return docs;
    }
    let mut keyed: Vec<(Vec<SortKey>, Document)> = docs
        .into_iter()
        .map(|doc| (sort_keys(&doc, criteria), doc))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_key_lists(a, b, criteria));
    keyed.into_iter().map(|(_, doc)| doc).collect()
}
