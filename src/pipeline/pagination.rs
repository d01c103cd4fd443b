//! Page arithmetic.

use std::ops::Range;

use serde::Serialize;

use super::errors::{QueryError, QueryResult};

/// Pagination block of a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub total_results: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub next_page: Option<usize>,
    pub prev_page: Option<usize>,
    /// 1-based index of the first result on this page, 0 when empty
    pub start_index: usize,
    /// 1-based index of the last result on this page, 0 when empty
    pub end_index: usize,
}

impl Pagination {
    /// Slice of the full result set covered by this page.
    pub fn range(&self) -> Range<usize> {
        if self.start_index == 0 {
            return 0..0;
        }
        self.start_index - 1..self.end_index
    }
}

/// Compute the page window. `page` is 1-based. A page past the end is an
/// error; an empty result only has page 1.
pub fn paginate(total: usize, page: usize, limit: usize) -> QueryResult<Pagination> {
    if page < 1 {
        return Err(QueryError::invalid("page", "must be at least 1"));
    }
    if limit < 1 {
        return Err(QueryError::invalid("limit", "must be at least 1"));
    }

    let total_pages = total.div_ceil(limit);
    if page > total_pages.max(1) {
        return Err(QueryError::PageOutOfRange { page, total_pages });
    }

    // page <= total_pages keeps the offset within `total`
    let start = (page - 1).saturating_mul(limit).min(total);
    let end = start.saturating_add(limit).min(total);
    let has_next_page = page < total_pages;
    let has_prev_page = page > 1;

    Ok(Pagination {
        page,
        limit,
        total_pages,
        total_results: total,
        has_next_page,
        has_prev_page,
        next_page: has_next_page.then_some(page + 1),
        prev_page: has_prev_page.then(|| page - 1),
        start_index: if start < end { start + 1 } else { 0 },
        end_index: if start < end { end } else { 0 },
    })
}
