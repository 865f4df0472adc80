//! Route configuration and setup.

use crate::api_doc::ApiDoc;
use crate::constants::{API_PREFIX, MULTIPART_OVERHEAD_BYTES};
use crate::handlers::{download, health, preview, process, upload};
use crate::middleware::{
    rate_limit_middleware, request_id_middleware, security_headers_middleware, session_middleware,
    HttpRateLimiter, SecurityHeadersConfig, SessionCookieConfig, SessionLayerState,
};
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use smartdoc_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// API routes without any middleware, relative to [`API_PREFIX`].
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(upload::upload_document))
        .route("/preview/{file_id}", get(preview::preview_document))
        .route("/download/{file_id}", get(download::download_document))
        .route("/process", post(process::process_document))
        .route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let rate_limiter = setup_rate_limiter(config.http_rate_limit_per_minute);
    let security_headers_config = Arc::new(SecurityHeadersConfig::new(config.is_production()));
    let session_state = Arc::new(SessionLayerState {
        registry: state.sessions.clone(),
        cookie: SessionCookieConfig::from_config(config),
    });

    let api = api_router().layer(axum::middleware::from_fn_with_state(
        session_state,
        session_middleware,
    ));

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1_000)
        .max(1);
    tracing::info!(http_concurrency_limit, "HTTP concurrency limit layer enabled");

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = tracing::field::Empty,
        )
    });

    let app = Router::new()
        .nest(API_PREFIX, api)
        .route("/health", get(health::health_check))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(
            config.max_content_length_bytes + MULTIPART_OVERHEAD_BYTES,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS allows any origin; session cookies will not be sent cross-origin");
        return Ok(cors.allow_origin(Any));
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(origins = ?config.cors_origins, "CORS configured");
    Ok(cors.allow_origin(origins).allow_credentials(true))
}

fn setup_rate_limiter(limit_per_minute: u32) -> Arc<HttpRateLimiter> {
    let shard_count = std::env::var("RATE_LIMITER_SHARD_COUNT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(16);
    let trusted_proxy_count = std::env::var("TRUSTED_PROXY_COUNT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1);

    let limiter = Arc::new(
        HttpRateLimiter::with_shards(limit_per_minute, shard_count)
            .with_trusted_proxies(trusted_proxy_count),
    );
    limiter.clone().start_cleanup(RATE_LIMIT_CLEANUP_INTERVAL);

    tracing::info!(
        limit_per_minute,
        shard_count,
        trusted_proxy_count,
        "HTTP rate limiter enabled"
    );
    limiter
}
