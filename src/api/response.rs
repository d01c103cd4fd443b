//! Response envelope

use serde::Serialize;

use crate::filter::FilterGroup;
use crate::pipeline::{Pagination, QueryOutput, QueryRequest};
use crate::populate::{PopulateFailure, PopulateSpec};
use crate::search::RelationField;
use crate::sort::SortCriteria;
use crate::value::Document;

/// Successful query response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryEnvelope {
    pub success: bool,
    pub count: usize,
    pub total_documents: usize,
    pub filtered_documents: usize,
    pub data: Vec<Document>,
    pub pagination: Pagination,
    pub filters: FilterGroup,
    pub sort: Vec<SortCriteria>,
    pub populate: Vec<PopulateSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_terms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searchable_fields: Option<Vec<RelationField>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Joins that could not be completed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub populate_errors: Vec<PopulateFailure>,
}

impl QueryEnvelope {
    pub fn new(request: QueryRequest, output: QueryOutput) -> Self {
        let populate_errors = output
            .populate_report
            .failures()
            .into_iter()
            .cloned()
            .collect();
        let search_query = request.search_text().map(str::to_string);

        Self {
            success: true,
            count: output.data.len(),
            total_documents: output.total_documents,
            filtered_documents: output.filtered_documents,
            data: output.data,
            pagination: output.pagination,
            filters: request.filters,
            sort: request.sort,
            populate: request.populate,
            search_query,
            search_terms: output.search_terms,
            searchable_fields: output.searchable_fields,
            next_cursor: output.next_cursor,
            populate_errors,
        }
    }
}

/// Health check body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
