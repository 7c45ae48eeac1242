use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use services::ProgressServiceError;
use tracing::error;

/// A structured `{"error": message}` response body.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"error": message}))).into_response()
}

/// Map a service failure onto the HTTP taxonomy: validation errors are
/// 400, missing users 404, store failures 500 (logged, with the caller's
/// generic message in the body).
pub fn service_error_response(context: &str, err: &ProgressServiceError) -> Response {
    match err {
        ProgressServiceError::EmptyUpdateSet => {
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
        ProgressServiceError::NotFound => error_response(StatusCode::NOT_FOUND, "User not found"),
        ProgressServiceError::Storage(store_err) => {
            error!("{context}: {store_err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, context)
        }
        _ => error_response(StatusCode::INTERNAL_SERVER_ERROR, context),
    }
}
