//! Health check endpoint.

use axum::Json;

/// GET /health — liveness probe for the signup service.
pub async fn check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "signup-api" }))
}
