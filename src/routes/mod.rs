//! Route modules for the crop server

pub mod crop;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::services::ServeDir;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the application router. Shared between main and the
/// integration tests.
pub fn router(state: AppState) -> Router {
    let max_upload = state.config().upload.max_file_size;

    Router::new()
        .route("/health", get(health_check))
        .route("/crop", post(crop::crop_pdf))
        .layer(DefaultBodyLimit::max(max_upload))
        .fallback_service(ServeDir::new("public"))
        .with_state(state)
}
