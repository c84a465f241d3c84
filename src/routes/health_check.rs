use axum::http::StatusCode;

/// Health check endpoint
///
/// Liveness only: 200 with an empty body, no dependency is probed.
#[utoipa::path(
    get,
    path = "/health_check",
    tag = "health",
    responses(
        (status = 200, description = "Service is running")
    )
)]
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
