//! # Request Decoding
//!
//! Parameters arrive in the query string, a JSON body, or both (the body
//! wins). Composite parameters may be JSON, JSON encoded in a string, or a
//! comma-separated shorthand.

use std::collections::HashMap;

use serde_json::{Map, Value as JsonValue};

use crate::filter::{FilterGroup, SpecialFilter};
use crate::pipeline::QueryRequest;
use crate::populate::PopulateSpec;
use crate::projection::Selection;
use crate::sort::{SortCriteria, SpecialSort};
use crate::value::Value;

use super::errors::{ApiError, ApiResult};

/// Merged raw parameters
#[derive(Debug, Clone, Default)]
pub struct RawParams(Map<String, JsonValue>);

impl RawParams {
    /// Merge query-string pairs with an optional JSON object body.
    pub fn merge(query: HashMap<String, String>, body: &[u8]) -> ApiResult<Self> {
        let mut params: Map<String, JsonValue> = query
            .into_iter()
            .map(|(k, v)| (k, JsonValue::String(v)))
            .collect();

        if !body.iter().all(u8::is_ascii_whitespace) {
            match serde_json::from_slice::<JsonValue>(body) {
                Ok(JsonValue::Object(object)) => params.extend(object),
                Ok(other) => {
                    return Err(ApiError::InvalidBody(format!(
                        "expected a JSON object, got {}",
                        other
                    )));
                }
                Err(err) => return Err(ApiError::InvalidBody(err.to_string())),
            }
        }
        Ok(Self(params))
    }

    pub fn from_json(object: Map<String, JsonValue>) -> Self {
        Self(object)
    }

    /// First present, non-null value among `names`.
    fn raw(&self, names: &[&str]) -> Option<&JsonValue> {
        names
            .iter()
            .filter_map(|n| self.0.get(*n))
            .find(|v| !v.is_null())
    }

    /// Value with JSON-in-a-string unwrapped. Strings that are not JSON are
    /// returned as they are.
    fn composite(&self, names: &[&str]) -> Option<JsonValue> {
        self.raw(names).map(decode_embedded)
    }

    fn text(&self, names: &[&str]) -> Option<String> {
        match self.raw(names)? {
            JsonValue::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn number(&self, name: &str) -> ApiResult<Option<f64>> {
        match self.raw(&[name]) {
            None => Ok(None),
            Some(v) => Value::from(v.clone())
                .to_number()
                .map(Some)
                .ok_or_else(|| ApiError::invalid(name, format!("expected a number, got {}", v))),
        }
    }

    fn positive_int(&self, name: &str) -> ApiResult<Option<usize>> {
        match self.number(name)? {
            None => Ok(None),
            Some(n) if n >= 0.0 && n.fract() == 0.0 => Ok(Some(n as usize)),
            Some(n) => Err(ApiError::invalid(
                name,
                format!("expected a positive integer, got {}", n),
            )),
        }
    }

    fn flag(&self, name: &str) -> ApiResult<bool> {
        match self.raw(&[name]) {
            None => Ok(false),
            Some(JsonValue::Bool(b)) => Ok(*b),
            Some(JsonValue::Number(n)) => Ok(n.as_f64() == Some(1.0)),
            Some(JsonValue::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" | "" => Ok(false),
                other => Err(ApiError::invalid(name, format!("expected a boolean, got {}", other))),
            },
            Some(other) => Err(ApiError::invalid(name, format!("expected a boolean, got {}", other))),
        }
    }

    fn string_list(&self, name: &str) -> Vec<String> {
        match self.composite(&[name]) {
            Some(JsonValue::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(JsonValue::Array(items)) => items
                .iter()
                .filter_map(JsonValue::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    fn weights(&self) -> ApiResult<HashMap<String, f64>> {
        match self.composite(&["weights"]) {
            None => Ok(HashMap::new()),
            Some(JsonValue::Object(object)) => object
                .into_iter()
                .map(|(path, w)| {
                    Value::from(w.clone())
                        .to_number()
                        .map(|w| (path.clone(), w))
                        .ok_or_else(|| {
                            ApiError::invalid("weights", format!("weight for {} is not a number", path))
                        })
                })
                .collect(),
            Some(other) => Err(ApiError::invalid(
                "weights",
                format!("expected an object, got {}", other),
            )),
        }
    }

    /// Decode into a typed request.
    pub fn into_request(self) -> ApiResult<QueryRequest> {
        let collection = self.text(&["collection"]).unwrap_or_default();
        let mut request = QueryRequest::new(&collection);

        if let Some(filters) = self.composite(&["filters"]) {
            request.filters = FilterGroup::from_json(&filters)
                .map_err(|e| ApiError::invalid("filters", e.to_string()))?;
        }
        if let Some(sort) = self.composite(&["sort", "sortBy"]) {
            request.sort = SortCriteria::list_from_json(&sort)
                .map_err(|e| ApiError::invalid("sort", e.to_string()))?;
        }
        if let Some(populate) = self.composite(&["populate"]) {
            request.populate = PopulateSpec::list_from_json(&populate)
                .map_err(|e| ApiError::invalid("populate", e.to_string()))?;
        }
        if let Some(special) = self.composite(&["specialFilter"]) {
            request.special_filter = SpecialFilter::from_json(&special)
                .map_err(|e| ApiError::invalid("specialFilter", e.to_string()))?;
        }
        if let Some(special) = self.composite(&["specialSort"]) {
            request.special_sort = SpecialSort::from_json(&special)
                .map_err(|e| ApiError::invalid("specialSort", e.to_string()))?;
        }
        if let Some(select) = self.composite(&["select"]) {
            request.select = Selection::from_json(&select);
        }

        request.query = self.text(&["query", "q"]);
        request.fields = self.string_list("fields");
        request.weights = self.weights()?;
        request.min_score = self.number("minScore")?.unwrap_or(0.0);
        request.limit = self.positive_int("limit")?;
        request.page = self.positive_int("page")?.unwrap_or(1);
        request.include_score = self.flag("includeScore")?;
        request.include_distance = self.flag("includeDistance")?;
        request.cursor = self.text(&["cursor", "startAfter"]);

        Ok(request)
    }
}

/// Unwrap JSON carried inside a string (`"[{...}]"`, `"{...}"`).
fn decode_embedded(value: &JsonValue) -> JsonValue {
    if let JsonValue::String(s) = value {
        let trimmed = s.trim();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            if let Ok(parsed) = serde_json::from_str(trimmed) {
                return parsed;
            }
        }
    }
    value.clone()
}
