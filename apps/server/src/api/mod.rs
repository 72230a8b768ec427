//! HTTP surface of the portal server.

mod approvals;
mod stream;

use axum::routing::{get, post};
use axum::{Json, Router};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/approvals", post(approvals::approve))
        .route("/api/v1/approvals/batch", post(approvals::batch_approve))
        .route(
            "/api/v1/approvals/batch/preview",
            post(approvals::preview_batch),
        )
        .route("/api/v1/events", get(stream::events))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
