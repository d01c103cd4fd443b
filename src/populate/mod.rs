//! # Population
//!
//! Relational joins on top of a schemaless store.
//!
//! - Forward: follow the foreign key(s) at `field` into `collection`
//! - Reverse: gather the documents of `collection` whose `link` points back
//!   at each primary document
//!
//! Lookups go out in batches of `BATCH_SIZE` keys, issued concurrently.
//! Nested `populate` lists are applied to the related documents before they
//! are attached.

mod populator;
mod report;
mod spec;

pub use populator::Populator;
pub use report::{JoinOutcome, JoinReport, PopulateFailure, PopulateReport};
pub use spec::{JoinPlan, PopulateSpec, PopulateType};
