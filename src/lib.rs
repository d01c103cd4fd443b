//! docquery - an in-memory document query engine
//!
//! Filtering, relation population, sorting, relevance search and
//! pagination over JSON-like documents, served over HTTP.
//!
//! Layers, bottom up:
//!
//! - `value` / `path`: the document model and dotted-path access
//! - `filter`, `populate`, `sort`, `search`, `projection`: pipeline stages
//! - `source`: the async document store seam
//! - `pipeline`: the query executor
//! - `api`, `config`, `logging`: the server surface

pub mod api;
pub mod config;
pub mod filter;
pub mod logging;
pub mod path;
pub mod pipeline;
pub mod populate;
pub mod projection;
pub mod search;
pub mod sort;
pub mod source;
pub mod value;

pub use config::{Args, ServerConfig};
pub use filter::{FilterCriteria, FilterGroup, FilterOperator, Logic, SpecialFilter};
pub use path::FieldPath;
pub use pipeline::{PipelineConfig, QueryError, QueryOutput, QueryPipeline, QueryRequest};
pub use populate::{PopulateReport, PopulateSpec, PopulateType, Populator};
pub use projection::Selection;
pub use search::SearchScorer;
pub use sort::{SortCriteria, SortOrder, SpecialSort};
pub use source::{DocumentSource, MemorySource, SourceError};
pub use value::{Document, Value};
