//! # HTTP Server
//!
//! Router, shared state and the serve loop.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::pipeline::{PipelineConfig, QueryPipeline};
use crate::source::DocumentSource;

use super::handler;

/// State shared by every route
pub struct AppState<S> {
    pub listing: QueryPipeline<S>,
    pub search: QueryPipeline<S>,
    pub fetch: QueryPipeline<S>,
    pub config: Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            listing: self.listing.clone(),
            search: self.search.clone(),
            fetch: self.fetch.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: DocumentSource> AppState<S> {
    /// One pipeline per endpoint over a shared source.
    pub fn new(source: Arc<S>, config: ServerConfig) -> Self {
        let preset = |base: PipelineConfig, default_limit: usize| {
            base.with_default_limit(default_limit)
                .with_max_limit(config.max_limit)
        };
        Self {
            listing: QueryPipeline::new(
                Arc::clone(&source),
                preset(PipelineConfig::listing(), config.default_fetch_limit),
            ),
            search: QueryPipeline::new(
                Arc::clone(&source),
                preset(PipelineConfig::search(), config.default_search_limit),
            ),
            fetch: QueryPipeline::new(
                source,
                preset(PipelineConfig::fetch(), config.default_fetch_limit),
            ),
            config: Arc::new(config),
        }
    }
}

/// Answer every OPTIONS request with 204 and permissive CORS headers.
async fn preflight(request: Request, next: Next) -> Response {
    if *request.method() != Method::OPTIONS {
        return next.run(request).await;
    }
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    let any = HeaderValue::from_static("*");
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, any.clone());
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, any);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    response
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the router with all endpoints.
pub fn create_router<S: DocumentSource>(state: AppState<S>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(handler::health))
        .route(
            "/listing",
            get(handler::listing::<S>).post(handler::listing::<S>),
        )
        .route("/search", get(handler::search::<S>).post(handler::search::<S>))
        .route("/fetch", get(handler::fetch::<S>).post(handler::fetch::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(preflight))
        .with_state(state)
}

/// Bind and serve until the process stops.
pub async fn serve<S: DocumentSource>(state: AppState<S>) -> std::io::Result<()> {
    let addr: SocketAddr = state
        .config
        .socket_addr()
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "docquery listening");
    info!("endpoints: /health /listing /search /fetch");

    axum::serve(listener, create_router(state)).await
}
