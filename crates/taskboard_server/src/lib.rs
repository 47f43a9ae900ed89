//! HTTP surface for Taskboard.
//!
//! # Responsibility
//! - Map JSON requests onto `taskboard_core` services.
//! - Translate service outcomes into status codes and `{code, message}` bodies.
//!
//! # Invariants
//! - Handlers hold no business rules; validation lives in the core crate.
//! - Storage failures never leak their details to clients.

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiErrorResponse};
pub use state::AppState;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use log::info;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

/// Builds the full application router with CORS and request logging.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::api_router()
        .layer(middleware::from_fn(log_request))
        .layer(cors)
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;

    info!(
        "event=http_request module=http status={} method={} path={} http_status={} duration_ms={}",
        if response.status().is_server_error() { "error" } else { "ok" },
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}
