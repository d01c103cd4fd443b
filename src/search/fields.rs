//! Searchable field sets: explicit lists or discovery by introspection.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::value::{Document, Value, ID_FIELD};

/// Weight of a top-level field
pub const BASE_WEIGHT: f64 = 1.0;

/// Prefix marking engine-internal keys
pub const INTERNAL_PREFIX: char = '_';

/// A searchable path and its relevance weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationField {
    pub path: String,
    pub weight: f64,
}

/// Knobs for building a field set
#[derive(Debug, Clone)]
pub struct FieldOptions<'a> {
    /// Deepest nesting level visited during discovery (top level is 1)
    pub max_depth: usize,
    /// Default weight of nested paths
    pub relation_weight: f64,
    /// Per-path weight overrides
    pub weights: &'a HashMap<String, f64>,
}

impl FieldOptions<'_> {
    fn weight_for(&self, path: &str) -> f64 {
        if let Some(weight) = self.weights.get(path) {
            return *weight;
        }
        if path.contains('.') {
            self.relation_weight
        } else {
            BASE_WEIGHT
        }
    }
}

/// Use exactly the caller's paths.
pub fn explicit(paths: &[String], options: &FieldOptions<'_>) -> Vec<RelationField> {
    let mut seen = HashSet::new();
    paths
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty() && seen.insert(p.to_string()))
        .map(|p| RelationField {
            path: p.to_string(),
            weight: options.weight_for(p),
        })
        .collect()
}

/// Collect every path that leads to a primitive or a list of primitives,
/// across all documents, in first-seen order. `id`, internal keys and
/// timestamps are skipped; nested maps and lists of maps are walked up to
/// `max_depth` and their paths carry the relation weight.
pub fn discover(docs: &[Document], options: &FieldOptions<'_>) -> Vec<RelationField> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    for doc in docs {
        walk(doc, "", 1, options, &mut found, &mut seen);
    }
    found
}

fn walk(
    map: &Document,
    prefix: &str,
    depth: usize,
    options: &FieldOptions<'_>,
    found: &mut Vec<RelationField>,
    seen: &mut HashSet<String>,
) {
    if depth > options.max_depth {
        return;
    }
    for (key, value) in map {
        if key == ID_FIELD || key.starts_with(INTERNAL_PREFIX) {
            continue;
        }
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Map(inner) => walk(inner, &path, depth + 1, options, found, seen),
            Value::List(items) => {
                if items.iter().any(Value::is_primitive) {
                    record(path.clone(), options, found, seen);
                }
                for item in items {
                    if let Value::Map(inner) = item {
                        walk(inner, &path, depth + 1, options, found, seen);
                    }
                }
            }
            v if v.is_primitive() => record(path, options, found, seen),
            _ => {}
        }
    }
}

fn record(
    path: String,
    options: &FieldOptions<'_>,
    found: &mut Vec<RelationField>,
    seen: &mut HashSet<String>,
) {
    if seen.insert(path.clone()) {
        let weight = options.weight_for(&path);
        found.push(RelationField { path, weight });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::to_document;
    use serde_json::json;

    fn options(weights: &HashMap<String, f64>) -> FieldOptions<'_> {
        FieldOptions {
            max_depth: 3,
            relation_weight: 0.8,
            weights,
        }
    }

    #[test]
    fn test_discovery_walks_nested_data() {
        let docs = vec![to_document(json!({
            "id": "v1",
            "_score": 3,
            "name": "Maria",
            "tags": ["hair", "nails"],
            "createdAt": {"_seconds": 1, "_nanoseconds": 0},
            "vendor": {"id": "x", "name": "Bob", "address": {"city": "Quito", "geo": {"lat": 1}}},
            "services": [{"title": "Cut"}, {"title": "Dye", "extra": true}]
        }))];
        let weights = HashMap::new();
        let fields = discover(&docs, &options(&weights));
        let paths: Vec<&str> = fields.iter().map(|f| f.path.as_str()).collect();

        assert!(paths.contains(&"name"));
        assert!(paths.contains(&"tags"));
        assert!(paths.contains(&"vendor.name"));
        assert!(paths.contains(&"vendor.address.city"));
        assert!(paths.contains(&"services.title"));
        assert!(paths.contains(&"services.extra"));
        assert!(!paths.contains(&"vendor.address.geo.lat"));
        assert!(!paths.iter().any(|p| p.contains("id") || p.contains("_score") || p.contains("createdAt")));

        let name = fields.iter().find(|f| f.path == "name").unwrap();
        let vendor = fields.iter().find(|f| f.path == "vendor.name").unwrap();
        assert_eq!(name.weight, 1.0);
        assert_eq!(vendor.weight, 0.8);
    }

    #[test]
    fn test_overrides_and_explicit_fields() {
        let weights = HashMap::from([("vendor.name".to_string(), 2.0)]);
        let fields = explicit(
            &["name".into(), "vendor.name".into(), "name".into(), " ".into()],
            &options(&weights),
        );
        assert_eq!(
            fields,
            vec![
                RelationField { path: "name".into(), weight: 1.0 },
                RelationField { path: "vendor.name".into(), weight: 2.0 },
            ]
        );
    }
}
