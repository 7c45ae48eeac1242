use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

/// Attaches the configured CORS headers to every response and answers
/// preflight `OPTIONS` requests directly with 204.
pub async fn cors_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS {
        return with_cors_headers(StatusCode::NO_CONTENT.into_response(), &state);
    }
    let response = next.run(request).await;
    with_cors_headers(response, &state)
}

pub(crate) fn with_cors_headers(mut response: Response, state: &AppState) -> Response {
    let cors = &state.cors;
    let headers = response.headers_mut();
    for (name, value) in [
        ("access-control-allow-origin", &cors.allowed_origin),
        ("access-control-allow-headers", &cors.allowed_headers),
        ("access-control-allow-methods", &cors.allowed_methods),
    ] {
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(name, value);
        }
    }
    response
}
