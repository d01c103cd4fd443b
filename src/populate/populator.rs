//! Forward and reverse joins over a document source.

use std::collections::{BTreeSet, HashMap, HashSet};

use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::path::{self, FieldPath};
use crate::source::{DocumentSource, BATCH_SIZE};
use crate::value::{document_id, Document, Value};

use super::report::{PopulateFailure, PopulateReport};
use super::spec::{JoinPlan, PopulateSpec};

/// Attaches related documents to a result set
pub struct Populator<'a, S> {
    source: &'a S,
}

impl<'a, S: DocumentSource> Populator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Apply every spec in order. Lookups that fail leave the affected
    /// documents unenriched and are listed in the report.
    pub fn populate<'b>(
        &'b self,
        docs: Vec<Document>,
        specs: &'b [PopulateSpec],
    ) -> BoxFuture<'b, (Vec<Document>, PopulateReport)> {
        async move {
            let mut docs = docs;
            let mut report = PopulateReport::default();
            for spec in specs {
                docs = match spec.plan() {
                    Ok(JoinPlan::Forward { field }) => {
                        self.forward(docs, spec, field, &mut report).await
                    }
                    Ok(JoinPlan::Reverse { link }) => {
                        self.reverse(docs, spec, link, &mut report).await
                    }
                    Err(reason) => {
                        warn!(collection = %spec.collection, "skipping populate: {}", reason);
                        report.skip(spec.target_field(), &spec.collection, reason);
                        docs
                    }
                };
            }
            (docs, report)
        }
        .boxed()
    }

    async fn forward(
        &self,
        mut docs: Vec<Document>,
        spec: &PopulateSpec,
        field: &str,
        report: &mut PopulateReport,
    ) -> Vec<Document> {
        let field_path = FieldPath::parse(field);
        let target = FieldPath::parse(spec.target_field());

        let keys: BTreeSet<String> = docs
            .iter()
            .filter_map(|doc| path::get(doc, &field_path))
            .flat_map(|value| value.flatten().into_iter().filter_map(Value::as_key).collect::<Vec<_>>())
            .collect();
        let keys: Vec<String> = keys.into_iter().collect();

        let batches: Vec<&[String]> = keys.chunks(BATCH_SIZE).collect();
        let results = join_all(
            batches
                .iter()
                .map(|batch| self.source.get_by_ids(&spec.collection, batch)),
        )
        .await;

        let mut related = Vec::new();
        let mut failures = Vec::new();
        for (batch, result) in batches.iter().zip(results) {
            match result {
                Ok(found) => related.extend(found),
                Err(err) => {
                    warn!(
                        collection = %spec.collection,
                        keys = batch.len(),
                        "populate batch failed: {}",
                        err
                    );
                    failures.push(PopulateFailure {
                        collection: spec.collection.clone(),
                        target: spec.target_field().to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let related = self.finish_related(related, spec, report).await;
        let cache: HashMap<String, Document> = related
            .into_iter()
            .filter_map(|doc| document_id(&doc).map(|id| (id, doc)))
            .collect();

        debug!(
            collection = %spec.collection,
            requested = keys.len(),
            found = cache.len(),
            "forward populate"
        );

        for doc in docs.iter_mut() {
            let attached = match path::get(doc, &field_path) {
                Some(Value::List(items)) => Value::List(
                    items
                        .iter()
                        .filter_map(Value::as_key)
                        .filter_map(|key| cache.get(&key).cloned().map(Value::Map))
                        .collect(),
                ),
                Some(value) => value
                    .as_key()
                    .and_then(|key| cache.get(&key).cloned())
                    .map(Value::Map)
                    .unwrap_or(Value::Null),
                None => Value::Null,
            };
            path::set(doc, &target, attached);
        }

        report.push(spec.target_field(), &spec.collection, failures);
        docs
    }

    async fn reverse(
        &self,
        mut docs: Vec<Document>,
        spec: &PopulateSpec,
        link: &str,
        report: &mut PopulateReport,
    ) -> Vec<Document> {
        let link_path = FieldPath::parse(link);
        let target = FieldPath::parse(spec.target_field());

        let parent_ids: Vec<String> = docs.iter().filter_map(document_id).collect();
        let wanted: HashSet<&str> = parent_ids.iter().map(String::as_str).collect();

        let batches: Vec<&[String]> = parent_ids.chunks(BATCH_SIZE).collect();
        let batch_lookups = join_all(
            batches
                .iter()
                .map(|batch| self.source.query_in(&spec.collection, link, batch)),
        );
        // Array-valued links are invisible to equality lookups, so the whole
        // collection is scanned once as well.
        let (results, scanned) =
            futures_util::join!(batch_lookups, self.source.scan(&spec.collection));

        let mut failures = Vec::new();
        let mut seen = HashSet::new();
        let mut related = Vec::new();
        let mut record = |err: crate::source::SourceError| {
            warn!(collection = %spec.collection, "reverse populate lookup failed: {}", err);
            failures.push(PopulateFailure {
                collection: spec.collection.clone(),
                target: spec.target_field().to_string(),
                reason: err.to_string(),
            });
        };

        for result in results {
            match result {
                Ok(found) => {
                    for doc in found {
                        if let Some(id) = document_id(&doc) {
                            if seen.insert(id) {
                                related.push(doc);
                            }
                        }
                    }
                }
                Err(err) => record(err),
            }
        }

        match scanned {
            Ok(all) => {
                for doc in all {
                    let links_parent = matches!(path::get(&doc, &link_path), Some(Value::List(ref items))
                        if items.iter().filter_map(Value::as_key).any(|k| wanted.contains(k.as_str())));
                    if !links_parent {
                        continue;
                    }
                    if let Some(id) = document_id(&doc) {
                        if seen.insert(id) {
                            related.push(doc);
                        }
                    }
                }
            }
            Err(err) => record(err),
        }

        // Group on the raw documents; the link field may be projected away.
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, doc) in related.iter().enumerate() {
            let keys: Vec<String> = path::get(doc, &link_path)
                .map(|v| v.flatten().into_iter().filter_map(Value::as_key).collect())
                .unwrap_or_default();
            for key in keys {
                if wanted.contains(key.as_str()) {
                    groups.entry(key).or_default().push(position);
                }
            }
        }

        let related = self.finish_related(related, spec, report).await;

        debug!(
            collection = %spec.collection,
            parents = parent_ids.len(),
            found = related.len(),
            "reverse populate"
        );

        for doc in docs.iter_mut() {
            let children: Vec<Value> = document_id(doc)
                .and_then(|id| groups.get(&id))
                .map(|positions| {
                    positions
                        .iter()
                        .filter_map(|&p| related.get(p).cloned().map(Value::Map))
                        .collect()
                })
                .unwrap_or_default();
            path::set(doc, &target, Value::List(children));
        }

        report.push(spec.target_field(), &spec.collection, failures);
        docs
    }

    /// Run nested joins on freshly fetched related documents, then apply the
    /// spec's projection. Order of `related` is preserved.
    async fn finish_related(
        &self,
        related: Vec<Document>,
        spec: &PopulateSpec,
        report: &mut PopulateReport,
    ) -> Vec<Document> {
        let related = if spec.populate.is_empty() || related.is_empty() {
            related
        } else {
            let (enriched, nested_report) = self.populate(related, &spec.populate).await;
            report.extend_nested(spec.target_field(), nested_report);
            enriched
        };

        if spec.select.is_all() {
            return related;
        }
        let keep: Vec<&str> = spec.populate.iter().map(PopulateSpec::target_field).collect();
        related
            .into_iter()
            .map(|doc| spec.select.apply(doc, &keep))
            .collect()
    }
}
