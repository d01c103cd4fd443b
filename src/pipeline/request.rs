//! Typed query request.

use std::collections::HashMap;

use crate::filter::{FilterGroup, SpecialFilter};
use crate::populate::PopulateSpec;
use crate::projection::Selection;
use crate::sort::{SortCriteria, SpecialSort};

/// Everything one query asks for
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub collection: String,
    pub filters: FilterGroup,
    pub sort: Vec<SortCriteria>,
    pub populate: Vec<PopulateSpec>,
    pub special_filter: Option<SpecialFilter>,
    pub special_sort: Option<SpecialSort>,
    /// Search text; `*` or blank means no text search
    pub query: Option<String>,
    /// Explicit searchable paths; empty means discover
    pub fields: Vec<String>,
    pub weights: HashMap<String, f64>,
    pub min_score: f64,
    /// None uses the pipeline default
    pub limit: Option<usize>,
    pub page: usize,
    pub include_score: bool,
    pub include_distance: bool,
    pub select: Selection,
    /// Id of the last document of the previous page
    pub cursor: Option<String>,
}

impl QueryRequest {
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            filters: FilterGroup::default(),
            sort: Vec::new(),
            populate: Vec::new(),
            special_filter: None,
            special_sort: None,
            query: None,
            fields: Vec::new(),
            weights: HashMap::new(),
            min_score: 0.0,
            limit: None,
            page: 1,
            include_score: false,
            include_distance: false,
            select: Selection::All,
            cursor: None,
        }
    }

    pub fn with_filters(mut self, filters: FilterGroup) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sort(mut self, sort: Vec<SortCriteria>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_populate(mut self, populate: Vec<PopulateSpec>) -> Self {
        self.populate = populate;
        self
    }

    pub fn with_special_filter(mut self, special: SpecialFilter) -> Self {
        self.special_filter = Some(special);
        self
    }

    pub fn with_special_sort(mut self, special: SpecialSort) -> Self {
        self.special_sort = Some(special);
        self
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_page(mut self, page: usize, limit: usize) -> Self {
        self.page = page;
        self.limit = Some(limit);
        self
    }

    pub fn with_select(mut self, select: Selection) -> Self {
        self.select = select;
        self
    }

    pub fn with_cursor(mut self, cursor: &str) -> Self {
        self.cursor = Some(cursor.to_string());
        self
    }

    /// The text query, unless absent or match-all.
    pub fn search_text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .filter(|q| !crate::search::is_match_all(q))
    }
}
