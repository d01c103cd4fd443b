//! # Document Model
//!
//! Schemaless documents as loaded from the store. Values form a closed tagged
//! union; timestamps keep their own variant and are never folded into numbers
//! or strings until a comparison asks for epoch milliseconds.

mod date;
mod timestamp;

pub use date::parse_date_millis;
pub use timestamp::Timestamp;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// A document: field name to value, in deterministic key order.
pub type Document = BTreeMap<String, Value>;

/// Key under which every loaded document carries its store id.
pub const ID_FIELD: &str = "id";

/// A document value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Timestamp(Timestamp),
    List(Vec<Value>),
    Map(Document),
}

/// Kind tag checked before any comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Timestamp,
    List,
    Map,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Bool, number or string.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::Number(_) | Value::String(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Document> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<Document> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Numeric reading of the value: numbers as-is, strings when they parse
    /// as a finite float.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Reading used when a value acts as a join key.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(_) => Some(self.to_text()),
            _ => None,
        }
    }

    /// Plain-text rendering used by string comparisons and search.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Timestamp(ts) => format_number(ts.to_millis()),
            Value::List(items) => items
                .iter()
                .map(Value::to_text)
                .collect::<Vec<_>>()
                .join(","),
            Value::Map(_) => JsonValue::from(self.clone()).to_string(),
        }
    }

    /// Non-null leaves of the value. Lists are flattened recursively; any
    /// other value yields itself.
    pub fn flatten(&self) -> Vec<&Value> {
        let mut out = Vec::new();
        flatten_into(self, &mut out);
        out
    }
}

fn flatten_into<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Null => {}
        Value::List(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        other => out.push(other),
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Lowercase `text` and strip Latin diacritics (`Álvaro` -> `alvaro`,
/// `Miércoles` -> `miercoles`, `ñ` -> `n`).
pub fn fold_text(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Id of a loaded document.
pub fn document_id(doc: &Document) -> Option<String> {
    doc.get(ID_FIELD).and_then(Value::as_key)
}

/// Build a document from a JSON object. Non-object input yields an empty
/// document.
pub fn to_document(json: JsonValue) -> Document {
    Value::from(json).into_map().unwrap_or_default()
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(object) => {
                if let Some(ts) = Timestamp::from_json_object(&object) {
                    return Value::Timestamp(ts);
                }
                Value::Map(
                    object
                        .into_iter()
                        .map(|(k, v)| (k, Value::from(v)))
                        .collect(),
                )
            }
        }
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9.0e15 {
                    JsonValue::from(n as i64)
                } else {
                    serde_json::Number::from_f64(n)
                        .map(JsonValue::Number)
                        .unwrap_or(JsonValue::Null)
                }
            }
            Value::String(s) => JsonValue::String(s),
            Value::Timestamp(ts) => ts.to_json(),
            Value::List(items) => JsonValue::Array(items.into_iter().map(JsonValue::from).collect()),
            Value::Map(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, JsonValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Document> for Value {
    fn from(map: Document) -> Self {
        Value::Map(map)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        JsonValue::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timestamp_lifted_on_ingest() {
        let doc = to_document(json!({
            "createdAt": {"_seconds": 1_700_000_000, "_nanoseconds": 0},
            "address": {"city": "Quito"}
        }));

        assert_eq!(doc["createdAt"].kind(), ValueKind::Timestamp);
        assert_eq!(doc["address"].kind(), ValueKind::Map);
    }

    #[test]
    fn test_json_round_trip_keeps_integers() {
        let original = json!({"n": 3, "f": 2.5, "tags": ["a", null], "ok": true});
        let back = JsonValue::from(Value::from(original.clone()));
        assert_eq!(back, original);
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Value::Number(42.0).to_text(), "42");
        assert_eq!(Value::Number(2.5).to_text(), "2.5");
        assert_eq!(Value::Bool(true).to_text(), "true");
        assert_eq!(
            Value::List(vec!["a".into(), Value::Number(1.0)]).to_text(),
            "a,1"
        );
    }

    #[test]
    fn test_flatten_drops_nulls() {
        let v = Value::from(json!([1, [2, null, [3]], null]));
        let flat: Vec<f64> = v.flatten().iter().filter_map(|x| x.as_f64()).collect();
        assert_eq!(flat, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_to_number() {
        assert_eq!(Value::from("12.5").to_number(), Some(12.5));
        assert_eq!(Value::from("abc").to_number(), None);
        assert_eq!(Value::Bool(true).to_number(), None);
    }

    #[test]
    fn test_fold_text() {
        assert_eq!(fold_text("Álvaro"), "alvaro");
        assert_eq!(fold_text("MIÉRCOLES"), "miercoles");
        assert_eq!(fold_text("Peña"), "pena");
        assert_eq!(fold_text("Zoe"), "zoe");
    }

    #[test]
    fn test_document_id() {
        let doc = to_document(json!({"id": "v1", "name": "Bob"}));
        assert_eq!(document_id(&doc).as_deref(), Some("v1"));
    }
}
