//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - exposition route (default `/metrics`) : Prometheus text format

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use metricsx_core::Exposition;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(exposition): State<Arc<dyn Exposition>>) -> Response {
    match exposition.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, exposition.content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "metrics render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Router serving `exposition` at `path`, for mounting on any axum server.
pub fn exposition_router(path: &str, exposition: Arc<dyn Exposition>) -> Router {
    Router::new()
        .route(path, get(metrics))
        .with_state(exposition)
}
