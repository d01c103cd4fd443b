//! # HTTP API
//!
//! JSON endpoints over the query pipeline:
//!
//! - `GET|POST /listing`: listing with the search-as-filter shortcut
//! - `GET|POST /search`: relevance search
//! - `GET|POST /fetch`: collection fetch with relations
//! - `GET /health`
//!
//! Parameters come from the query string or a JSON body. Errors render as
//! `{"success": false, "error": "..."}` with 400 for bad requests and 500
//! otherwise.

mod errors;
mod handler;
mod request;
mod response;
mod server;

pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use request::RawParams;
pub use response::{HealthResponse, QueryEnvelope};
pub use server::{create_router, serve, AppState};
