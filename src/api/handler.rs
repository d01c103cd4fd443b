//! Endpoint handlers
//!
//! `/listing`, `/search` and `/fetch` take the same parameters and differ
//! only in the pipeline preset behind them.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use tracing::debug;

use crate::pipeline::QueryPipeline;
use crate::source::DocumentSource;

use super::errors::ApiResult;
use super::request::RawParams;
use super::response::{HealthResponse, QueryEnvelope};
use super::server::AppState;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

pub async fn listing<S: DocumentSource>(
    State(state): State<AppState<S>>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> ApiResult<Json<QueryEnvelope>> {
    run(&state.listing, "listing", query, &body).await
}

pub async fn search<S: DocumentSource>(
    State(state): State<AppState<S>>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> ApiResult<Json<QueryEnvelope>> {
    run(&state.search, "search", query, &body).await
}

pub async fn fetch<S: DocumentSource>(
    State(state): State<AppState<S>>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> ApiResult<Json<QueryEnvelope>> {
    run(&state.fetch, "fetch", query, &body).await
}

async fn run<S: DocumentSource>(
    pipeline: &QueryPipeline<S>,
    endpoint: &str,
    query: HashMap<String, String>,
    body: &[u8],
) -> ApiResult<Json<QueryEnvelope>> {
    let request = RawParams::merge(query, body)?.into_request()?;
    debug!(endpoint, collection = %request.collection, "query received");

    let output = pipeline.execute(&request).await?;
    Ok(Json(QueryEnvelope::new(request, output)))
}
