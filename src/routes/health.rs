use axum::http::StatusCode;

/// Reachable only with the shared secret in the body; see [`crate::auth::guard`].
pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "Authenticated")
}
