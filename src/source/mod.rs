//! # Document Sources
//!
//! The store the engine reads from. The engine only needs four access paths:
//! a full scan, point and multi-key lookups by id, and a membership query on
//! one field. Every returned document carries its `id`.

mod errors;
mod memory;

pub use errors::{SourceError, SourceResult};
pub use memory::MemorySource;

use std::future::Future;

use crate::value::Document;

/// Maximum number of keys in one `get_by_ids` or `query_in` round trip.
pub const BATCH_SIZE: usize = 10;

/// Read access to a collection store
pub trait DocumentSource: Send + Sync + 'static {
    /// Every document of `collection`. Unknown collections are empty.
    fn scan(&self, collection: &str) -> impl Future<Output = SourceResult<Vec<Document>>> + Send;

    /// Point lookup by id.
    fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = SourceResult<Option<Document>>> + Send;

    /// Documents whose id is in `ids` (at most `BATCH_SIZE`). Missing ids are
    /// skipped.
    fn get_by_ids(
        &self,
        collection: &str,
        ids: &[String],
    ) -> impl Future<Output = SourceResult<Vec<Document>>> + Send;

    /// Documents whose scalar `field` equals one of `values` (at most
    /// `BATCH_SIZE`).
    fn query_in(
        &self,
        collection: &str,
        field: &str,
        values: &[String],
    ) -> impl Future<Output = SourceResult<Vec<Document>>> + Send;
}

/// Reject a lookup that would not fit in one round trip.
pub fn check_batch(size: usize) -> SourceResult<()> {
    if size > BATCH_SIZE {
        return Err(SourceError::BatchTooLarge {
            size,
            max: BATCH_SIZE,
        });
    }
    Ok(())
}
