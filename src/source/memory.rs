//! In-memory document source
//!
//! Collections keyed by name, documents keyed by id. Used by the binary when
//! serving a fixture file and by the test suites.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::path::{self, FieldPath};
use crate::value::{document_id, to_document, Document, Value, ID_FIELD};

use super::{check_batch, DocumentSource, SourceError, SourceResult};

type Collections = HashMap<String, BTreeMap<String, Document>>;

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct MemorySource {
    collections: RwLock<Collections>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `doc` under `id`. The store key overrides any `id` in the data.
    pub fn insert(&self, collection: &str, id: &str, mut doc: Document) -> SourceResult<()> {
        doc.insert(ID_FIELD.to_string(), Value::from(id));
        let mut collections = self.write()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
        Ok(())
    }

    /// Store a JSON object that carries its own `id`.
    pub fn insert_json(&self, collection: &str, json: JsonValue) -> SourceResult<()> {
        let doc = to_document(json);
        let id = document_id(&doc).ok_or_else(|| {
            SourceError::Fixture(format!("document in {} has no id", collection))
        })?;
        self.insert(collection, &id, doc)
    }

    /// Build a source from `{collection: {id: doc}}` or
    /// `{collection: [doc with id]}`.
    pub fn from_json(json: &JsonValue) -> SourceResult<Self> {
        let source = Self::new();
        let Some(collections) = json.as_object() else {
            return Err(SourceError::Fixture(
                "fixture must be an object keyed by collection".to_string(),
            ));
        };

        for (name, contents) in collections {
            match contents {
                JsonValue::Object(docs) => {
                    for (id, doc) in docs {
                        source.insert(name, id, to_document(doc.clone()))?;
                    }
                }
                JsonValue::Array(docs) => {
                    for doc in docs {
                        if let Err(err) = source.insert_json(name, doc.clone()) {
                            warn!(collection = %name, "skipping fixture document: {}", err);
                        }
                    }
                }
                _ => {
                    return Err(SourceError::Fixture(format!(
                        "collection {} must be an object or array",
                        name
                    )));
                }
            }
        }
        Ok(source)
    }

    /// Load a JSON fixture file.
    pub fn load_file(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| SourceError::Fixture(format!("{}: {}", path.display(), e)))?;
        let json: JsonValue = serde_json::from_str(&raw)
            .map_err(|e| SourceError::Fixture(format!("{}: {}", path.display(), e)))?;
        let source = Self::from_json(&json)?;
        debug!(path = %path.display(), collections = source.collection_names().len(), "fixture loaded");
        Ok(source)
    }

    pub fn collection_names(&self) -> Vec<String> {
        self.collections
            .read()
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn read(&self) -> SourceResult<std::sync::RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|_| SourceError::Backend("store lock poisoned".to_string()))
    }

    fn write(&self) -> SourceResult<std::sync::RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|_| SourceError::Backend("store lock poisoned".to_string()))
    }

    fn select<F>(&self, collection: &str, predicate: F) -> SourceResult<Vec<Document>>
    where
        F: Fn(&Document) -> bool,
    {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().filter(|d| predicate(d)).cloned().collect())
            .unwrap_or_default())
    }
}

impl DocumentSource for MemorySource {
    async fn scan(&self, collection: &str) -> SourceResult<Vec<Document>> {
        self.select(collection, |_| true)
    }

    async fn get(&self, collection: &str, id: &str) -> SourceResult<Option<Document>> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn get_by_ids(&self, collection: &str, ids: &[String]) -> SourceResult<Vec<Document>> {
        check_batch(ids.len())?;
        let collections = self.read()?;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(ids.iter().filter_map(|id| docs.get(id)).cloned().collect())
    }

    async fn query_in(
        &self,
        collection: &str,
        field: &str,
        values: &[String],
    ) -> SourceResult<Vec<Document>> {
        check_batch(values.len())?;
        let field = FieldPath::parse(field);
        self.select(collection, |doc| {
            path::get(doc, &field)
                .and_then(|v| v.as_key())
                .is_some_and(|key| values.contains(&key))
        })
    }
}
