//! # Field Selection
//!
//! `select` projections: `*` keeps everything, otherwise a list of field
//! paths given as a comma-separated string or an array. The `id` field always
//! survives.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::path::{self, FieldPath};
use crate::value::{Document, ID_FIELD};

/// Which fields of a document to keep
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Fields(Vec<String>),
}

impl Selection {
    /// Parse `"*"`, `"a,b.c"` or `["a", "b.c"]`. Anything else, or an empty
    /// list, selects everything.
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::String(s) => Self::parse(s),
            JsonValue::Array(items) => Self::from_names(
                items
                    .iter()
                    .filter_map(JsonValue::as_str)
                    .map(str::to_string)
                    .collect(),
            ),
            _ => Selection::All,
        }
    }

    pub fn parse(raw: &str) -> Self {
        Self::from_names(raw.split(',').map(str::to_string).collect())
    }

    fn from_names(names: Vec<String>) -> Self {
        let fields: Vec<String> = names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        if fields.is_empty() || fields.iter().any(|f| f == "*") {
            Selection::All
        } else {
            Selection::Fields(fields)
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// Project `doc`, additionally keeping the top-level keys in `keep`.
    pub fn apply(&self, doc: Document, keep: &[&str]) -> Document {
        let Selection::Fields(fields) = self else {
            return doc;
        };

        let mut out = Document::new();
        for key in keep.iter().copied().chain(std::iter::once(ID_FIELD)) {
            if let Some(value) = doc.get(key) {
                out.insert(key.to_string(), value.clone());
            }
        }
        for field in fields {
            let path = FieldPath::parse(field);
            if let Some(value) = path::get(&doc, &path) {
                path::set(&mut out, &path, value);
            }
        }
        out
    }
}

impl Serialize for Selection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Selection::All => serializer.serialize_str("*"),
            Selection::Fields(fields) => fields.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Selection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        Ok(Selection::from_json(&json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{to_document, Value};
    use serde_json::json;

    fn doc() -> Document {
        to_document(json!({
            "id": "u1",
            "name": "Ana",
            "email": "ana@example.com",
            "address": {"city": "Quito", "zip": "170102"}
        }))
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(Selection::parse("*"), Selection::All);
        assert_eq!(Selection::parse(" "), Selection::All);
        assert_eq!(
            Selection::parse("name, email"),
            Selection::Fields(vec!["name".into(), "email".into()])
        );
        assert_eq!(
            Selection::from_json(&json!(["name"])),
            Selection::Fields(vec!["name".into()])
        );
        assert_eq!(Selection::from_json(&json!(null)), Selection::All);
    }

    #[test]
    fn test_apply_keeps_id_and_nested_paths() {
        let projected = Selection::parse("name,address.city").apply(doc(), &[]);
        assert_eq!(
            JsonValue::from(Value::Map(projected)),
            json!({"id": "u1", "name": "Ana", "address": {"city": "Quito"}})
        );
    }

    #[test]
    fn test_apply_keeps_extra_keys() {
        let projected = Selection::parse("name").apply(doc(), &["email"]);
        assert!(projected.contains_key("email"));
        assert!(!projected.contains_key("address"));
    }

    #[test]
    fn test_all_is_identity() {
        assert_eq!(Selection::All.apply(doc(), &[]), doc());
    }
}
