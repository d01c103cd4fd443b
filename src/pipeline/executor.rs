//! Query execution.
//!
//! load -> (populate) -> filter -> special filter -> (populate) ->
//! search / sort -> cursor -> paginate -> strip internal fields -> select

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, info};

use crate::filter::{apply_filters, FilterGroup};
use crate::populate::{PopulateReport, PopulateSpec, Populator};
use crate::search::{self, FieldOptions, RelationField, SearchScorer, SCORE_FIELD};
use crate::sort::{sort_combined, RankKey, SortCriteria, SpecialSort, DISTANCE_FIELD};
use crate::source::DocumentSource;
use crate::value::{document_id, Document, Value};

use super::config::{PipelineConfig, PopulateOrder};
use super::errors::{QueryError, QueryResult};
use super::pagination::{paginate, Pagination};
use super::request::QueryRequest;

/// Result of one query
#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub data: Vec<Document>,
    /// Documents in the collection
    pub total_documents: usize,
    /// Documents left after filters and the special filter
    pub filtered_documents: usize,
    pub pagination: Pagination,
    pub search_terms: Option<Vec<String>>,
    pub searchable_fields: Option<Vec<RelationField>>,
    pub populate_report: PopulateReport,
    /// Id of the last returned document when another page exists
    pub next_cursor: Option<String>,
}

/// Query engine over a document source
pub struct QueryPipeline<S> {
    source: Arc<S>,
    config: PipelineConfig,
}

impl<S> Clone for QueryPipeline<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            config: self.config.clone(),
        }
    }
}

impl<S: DocumentSource> QueryPipeline<S> {
    pub fn new(source: Arc<S>, config: PipelineConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// True when population has to run before filtering: filters may refer
    /// to fields that only exist once a reverse join has been attached.
    pub fn should_populate_before_filter(&self, populate: &[PopulateSpec], filters: &FilterGroup) -> bool {
        if populate.is_empty() {
            return false;
        }
        match self.config.populate_order {
            PopulateOrder::Always => true,
            PopulateOrder::Never => false,
            PopulateOrder::Auto => {
                populate.iter().any(PopulateSpec::is_reverse) && filters.has_criteria()
            }
        }
    }

    fn effective_limit(&self, request: &QueryRequest) -> QueryResult<usize> {
        match request.limit {
            Some(0) => Err(QueryError::invalid("limit", "must be at least 1")),
            Some(limit) => Ok(limit.min(self.config.max_limit)),
            None => Ok(self.config.default_limit.min(self.config.max_limit)),
        }
    }

    pub async fn execute(&self, request: &QueryRequest) -> QueryResult<QueryOutput> {
        let collection = request.collection.trim();
        if collection.is_empty() {
            return Err(QueryError::MissingParam("collection".to_string()));
        }
        if request.page < 1 {
            return Err(QueryError::invalid("page", "must be at least 1"));
        }
        let limit = self.effective_limit(request)?;

        let docs = self
            .source
            .scan(collection)
            .await
            .map_err(|source| QueryError::Upstream {
                collection: collection.to_string(),
                source,
            })?;
        let total_documents = docs.len();
        debug!(collection, total_documents, "collection loaded");

        let search_text = request.search_text();
        let mut filters = request.filters.clone();
        let mut text_as_filter = false;
        if let Some(text) = search_text {
            if self.config.fields_as_filter && !request.fields.is_empty() {
                filters = filters.and_also(search::fields_to_filter(&request.fields, text));
                text_as_filter = true;
            }
        }

        let populator = Populator::new(self.source.as_ref());
        let mut report = PopulateReport::default();
        let populate_first = self.should_populate_before_filter(&request.populate, &filters);
        let mut docs = docs;
        if populate_first {
            debug!(collection, specs = request.populate.len(), "populating before filters");
            let (populated, r) = populator.populate(docs, &request.populate).await;
            docs = populated;
            report.merge(r);
        }

        let mut docs = apply_filters(docs, &filters);
        if let Some(special) = &request.special_filter {
            docs = special.apply(docs);
        }
        let filtered_documents = docs.len();
        debug!(collection, filtered_documents, "filters applied");

        if !populate_first && !request.populate.is_empty() {
            let (populated, r) = populator.populate(docs, &request.populate).await;
            docs = populated;
            report.merge(r);
        }

        let mut sort = request.sort.clone();
        let mut search_terms = None;
        let mut searchable_fields = None;
        let mut scorer = None;
        if let (Some(text), false) = (search_text, text_as_filter) {
            let options = FieldOptions {
                max_depth: self.config.discovery_depth,
                relation_weight: self.config.relation_weight,
                weights: &request.weights,
            };
            let fields = if request.fields.is_empty() {
                search::discover(&docs, &options)
            } else {
                search::explicit(&request.fields, &options)
            };
            let text_scorer = SearchScorer::new(text, &fields);
            docs = text_scorer.score_all(docs, request.min_score);
            debug!(collection, matches = docs.len(), fields = fields.len(), "search scored");

            if sort.is_empty() && request.special_sort.is_none() {
                sort.push(SortCriteria::desc(SCORE_FIELD));
            }
            search_terms = Some(text_scorer.terms().into_iter().map(str::to_string).collect());
            searchable_fields = Some(fields);
            scorer = Some(text_scorer);
        }

        let docs = sort_combined(
            docs,
            request.special_sort.as_ref(),
            &sort,
            self.config.distance_epsilon_km,
        );

        let docs = match &request.cursor {
            Some(cursor) => {
                let ranking = Ranking {
                    special: request.special_sort.as_ref(),
                    sort: &sort,
                    scorer: scorer.as_ref(),
                    populate: &request.populate,
                };
                self.after_cursor(collection, cursor, docs, &ranking).await?
            }
            None => docs,
        };

        let pagination = paginate(docs.len(), request.page, limit)?;
        let keep: Vec<&str> = request.populate.iter().map(PopulateSpec::target_field).collect();
        let data: Vec<Document> = docs
            .into_iter()
            .skip(pagination.range().start)
            .take(pagination.range().len())
            .map(|mut doc| {
                if !request.include_score {
                    doc.remove(SCORE_FIELD);
                }
                if !request.include_distance {
                    doc.remove(DISTANCE_FIELD);
                }
                request.select.apply(doc, &keep)
            })
            .collect();

        let next_cursor = if pagination.has_next_page {
            data.last().and_then(document_id)
        } else {
            None
        };

        info!(
            collection,
            total_documents,
            filtered_documents,
            total_results = pagination.total_results,
            returned = data.len(),
            page = pagination.page,
            "query complete"
        );

        Ok(QueryOutput {
            data,
            total_documents,
            filtered_documents,
            pagination,
            search_terms,
            searchable_fields,
            populate_report: report,
            next_cursor,
        })
    }

    /// Documents strictly after the cursor in the final order.
    ///
    /// The cursor id is re-resolved with a point lookup. When the cursor
    /// document is part of the result, everything after its position is
    /// kept. Otherwise the anchor is joined and scored like the result
    /// set and its rank locates the boundary.
    async fn after_cursor(
        &self,
        collection: &str,
        cursor: &str,
        docs: Vec<Document>,
        ranking: &Ranking<'_>,
    ) -> QueryResult<Vec<Document>> {
        let anchor = self
            .source
            .get(collection, cursor)
            .await
            .map_err(|source| QueryError::Upstream {
                collection: collection.to_string(),
                source,
            })?
            .ok_or_else(|| QueryError::UnknownCursor(cursor.to_string()))?;

        if let Some(position) = docs
            .iter()
            .position(|d| document_id(d).as_deref() == Some(cursor))
        {
            return Ok(docs.into_iter().skip(position + 1).collect());
        }

        let mut anchor = if ranking.populate.is_empty() {
            anchor
        } else {
            let populator = Populator::new(self.source.as_ref());
            let (mut joined, _) = populator.populate(vec![anchor], ranking.populate).await;
            joined.pop().unwrap_or_default()
        };
        if let Some(scorer) = ranking.scorer {
            anchor.insert(SCORE_FIELD.to_string(), Value::Number(scorer.score(&anchor)));
        }

        let epsilon = self.config.distance_epsilon_km;
        let rank = |doc: &Document| RankKey::of(doc, ranking.special, ranking.sort, epsilon);
        let anchor_rank = rank(&anchor);
        debug!(collection, cursor, "cursor document outside result, locating by rank");

        Ok(docs
            .into_iter()
            .filter(|d| {
                rank(d).compare(&anchor_rank, ranking.special, ranking.sort) == Ordering::Greater
            })
            .collect())
    }
}

/// Ordering inputs needed to place a cursor document
struct Ranking<'a> {
    special: Option<&'a SpecialSort>,
    sort: &'a [SortCriteria],
    scorer: Option<&'a SearchScorer>,
    populate: &'a [PopulateSpec],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterCriteria, FilterOperator};
    use crate::source::MemorySource;
    use crate::value::Value;
    use serde_json::json;

    fn source() -> Arc<MemorySource> {
        let source = MemorySource::new();
        for i in 1..=25 {
            source
                .insert_json(
                    "items",
                    json!({"id": format!("i{:02}", i), "n": i, "even": i % 2 == 0}),
                )
                .unwrap();
        }
        Arc::new(source)
    }

    fn ids(out: &QueryOutput) -> Vec<String> {
        out.data.iter().map(|d| d["id"].to_text()).collect()
    }

    #[tokio::test]
    async fn test_missing_collection() {
        let pipeline = QueryPipeline::new(source(), PipelineConfig::fetch());
        let err = pipeline.execute(&QueryRequest::new(" ")).await.unwrap_err();
        assert_eq!(err, QueryError::MissingParam("collection".into()));
    }

    #[tokio::test]
    async fn test_filter_sort_paginate() {
        let pipeline = QueryPipeline::new(source(), PipelineConfig::fetch());
        let request = QueryRequest::new("items")
            .with_filters(FilterGroup::default().with(FilterCriteria::new("even", FilterOperator::Eq, true)))
            .with_sort(vec![SortCriteria::desc("n")])
            .with_page(2, 5);

        let out = pipeline.execute(&request).await.unwrap();
        assert_eq!(out.total_documents, 25);
        assert_eq!(out.filtered_documents, 12);
        assert_eq!(ids(&out), vec!["i14", "i12", "i10", "i08", "i06"]);
        assert_eq!(out.next_cursor.as_deref(), Some("i06"));
    }

    #[tokio::test]
    async fn test_cursor_continues_after_anchor() {
        let pipeline = QueryPipeline::new(source(), PipelineConfig::fetch());
        let request = QueryRequest::new("items")
            .with_sort(vec![SortCriteria::asc("n")])
            .with_page(1, 3)
            .with_cursor("i20");

        let out = pipeline.execute(&request).await.unwrap();
        assert_eq!(ids(&out), vec!["i21", "i22", "i23"]);
        assert_eq!(out.pagination.total_results, 5);
    }

    #[tokio::test]
    async fn test_unknown_cursor() {
        let pipeline = QueryPipeline::new(source(), PipelineConfig::fetch());
        let request = QueryRequest::new("items").with_cursor("nope");
        assert_eq!(
            pipeline.execute(&request).await.unwrap_err(),
            QueryError::UnknownCursor("nope".into())
        );
    }

    #[tokio::test]
    async fn test_limit_is_capped() {
        let config = PipelineConfig::fetch().with_max_limit(10);
        let pipeline = QueryPipeline::new(source(), config);
        let out = pipeline
            .execute(&QueryRequest::new("items").with_page(1, 500))
            .await
            .unwrap();
        assert_eq!(out.pagination.limit, 10);
        assert_eq!(out.data.len(), 10);
    }

    #[tokio::test]
    async fn test_score_stripped_unless_requested() {
        let pipeline = QueryPipeline::new(source(), PipelineConfig::search());
        let mut request = QueryRequest::new("items").with_query("7").with_fields(&["n"]);

        let out = pipeline.execute(&request).await.unwrap();
        assert_eq!(ids(&out), vec!["i07", "i17"]);
        assert!(!out.data[0].contains_key(SCORE_FIELD));

        request.include_score = true;
        let out = pipeline.execute(&request).await.unwrap();
        assert!(matches!(out.data[0][SCORE_FIELD], Value::Number(s) if s > 0.0));
    }
}
