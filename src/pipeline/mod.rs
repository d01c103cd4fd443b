//! # Query Pipeline
//!
//! One parameterized engine behind the listing, search and fetch endpoints.
//!
//! A request loads its collection in full, joins related data either before
//! or after filtering, optionally scores it against a text query, sorts it,
//! and returns one page.

mod config;
mod errors;
mod executor;
mod pagination;
mod request;

pub use config::{PipelineConfig, PopulateOrder};
pub use errors::{QueryError, QueryResult};
pub use executor::{QueryOutput, QueryPipeline};
pub use pagination::{paginate, Pagination};
pub use request::QueryRequest;
