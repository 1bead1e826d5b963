//! `frontdesk serve` -- HTTP JSON API for the booking transition engine.
//!
//! Exposes the transition executor and the audit log query surface as an
//! async HTTP service using `axum` + `tokio`. Supports concurrent request
//! handling; per-booking serialization happens in the storage layer.
//!
//! Security features:
//! - CORS headers on all responses (permissive for local dev)
//! - Per-IP rate limiting (default: 60 req/min, configurable)
//! - Optional API key authentication via FRONTDESK_API_KEY env var
//!
//! Endpoints:
//! - GET  /health                             - Server status (exempt from auth)
//! - GET  /bookings                           - List bookings, newest first
//! - GET  /bookings/{booking_id}              - One booking
//! - POST /bookings/{booking_id}/transition   - Apply a front-desk action
//! - GET  /logs                               - Filter/sort/page the audit log
//! - GET  /logs/export.csv                    - CSV export of filtered logs
//!
//! All responses use Content-Type: application/json except the CSV export.

mod handlers;
mod middleware;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware as axum_middleware, Json, Router};
use frontdesk_storage::{MemoryStorage, SchemaProfile};
use tower_http::cors::{Any, CorsLayer};

use self::handlers::{
    handle_export_csv, handle_get_booking, handle_health, handle_list_bookings, handle_list_logs,
    handle_not_found, handle_transition,
};
use self::middleware::{auth_middleware, rate_limit_middleware};
use self::state::{AppState, RateLimiter};

use crate::seed::seed_demo;

/// Maximum request body size: 1 MB. Transition bodies are tiny.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Default rate limit: 60 requests per minute per IP.
const DEFAULT_RATE_LIMIT: u64 = 60;

/// Rate limit window duration in seconds (1 minute).
const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (
        status,
        Json(serde_json::json!({"success": false, "message": message})),
    )
}

/// Start the HTTP server on the given port.
///
/// When TLS cert/key paths are provided, the server listens over HTTPS
/// using `axum-server` with rustls. Otherwise it uses plain HTTP.
pub async fn start_server(
    port: u16,
    seed: bool,
    legacy_schema: bool,
    _tls_cert: Option<PathBuf>,
    _tls_key: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = if legacy_schema {
        SchemaProfile::legacy()
    } else {
        SchemaProfile::migrated()
    };
    let storage = MemoryStorage::with_profile(profile);

    if seed {
        let count = seed_demo(&storage, legacy_schema).await?;
        eprintln!("Seeded {} demo bookings", count);
    }
    if legacy_schema {
        eprintln!("Running with the legacy (pre-migration) schema profile");
    }

    // Rate limit: from FRONTDESK_RATE_LIMIT env var, or default
    let rate_limit = std::env::var("FRONTDESK_RATE_LIMIT")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_RATE_LIMIT);

    // API key: from FRONTDESK_API_KEY env var (None = no auth)
    let api_key = std::env::var("FRONTDESK_API_KEY")
        .ok()
        .filter(|k| !k.is_empty());

    if api_key.is_some() {
        eprintln!("API key authentication enabled");
    }
    eprintln!("Rate limit: {} requests per minute per IP", rate_limit);

    let state = Arc::new(AppState {
        storage,
        rate_limiter: RateLimiter::new(rate_limit),
        api_key,
    });

    // CORS: permissive for local dev
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/bookings", get(handle_list_bookings))
        .route("/bookings/{booking_id}", get(handle_get_booking))
        .route("/bookings/{booking_id}/transition", post(handle_transition))
        .route("/logs", get(handle_list_logs))
        .route("/logs/export.csv", get(handle_export_csv))
        .fallback(handle_not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);

    // TLS support via axum-server + rustls (requires `tls` feature)
    #[cfg(feature = "tls")]
    if let (Some(cert_path), Some(key_path)) = (&_tls_cert, &_tls_key) {
        let config =
            axum_server::tls_rustls::RustlsConfig::from_pem_file(cert_path, key_path).await?;
        let socket_addr: std::net::SocketAddr = addr.parse()?;
        eprintln!("Front desk listening on https://0.0.0.0:{}", port);
        axum_server::bind_rustls(socket_addr, config)
            .serve(app.into_make_service_with_connect_info::<std::net::SocketAddr>())
            .await?;
        return Ok(());
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("Front desk listening on http://0.0.0.0:{}", port);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    eprintln!("\nServer shut down.");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    eprintln!("\nReceived shutdown signal...");
}
