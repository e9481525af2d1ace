use axum::{http::StatusCode, response::IntoResponse, Json};

/// Health check endpoint
///
/// # Returns
///
/// JSON response with status
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}
