use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::cors::cors_middleware;
use crate::dashboard;
use crate::error::{error_response, service_error_response};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/users/:id",
            get(users_get_handler).patch(users_patch_handler),
        )
        .route("/admin/progress", get(admin_progress_handler))
        .route("/admin/progress/summary", get(admin_progress_handler))
        .route("/admin/dashboard", get(admin_dashboard_handler))
        .layer(from_fn_with_state(state.clone(), cors_middleware))
        .with_state(state)
}

async fn users_get_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let user_id = id.trim();
    if user_id.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing required path parameter: id",
        );
    }

    info!("fetching progress for user {user_id:?}");
    match state.progress.fetch_user(user_id).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => service_error_response("Failed to load user progress", &err),
    }
}

async fn users_patch_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let user_id = id.trim();
    if user_id.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing required path parameter: id",
        );
    }

    let updates = parse_update_body(&body);
    if updates.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Request body must be a JSON object of updates",
        );
    }

    info!("applying {} updates for user {user_id:?}", updates.len());
    match state.progress.patch_user(user_id, &updates).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => service_error_response("Failed to update user progress", &err),
    }
}

/// The update body is parsed leniently: anything that is not a JSON
/// object yields an empty update set, which the handler then rejects.
fn parse_update_body(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

async fn admin_progress_handler(State(state): State<AppState>) -> Response {
    match state.admin.list_users().await {
        Ok(users) => (StatusCode::OK, Json(json!({"users": users}))).into_response(),
        Err(err) => service_error_response("Failed to load admin progress", &err),
    }
}

#[derive(Debug, Deserialize)]
struct DashboardParams {
    user: Option<String>,
}

async fn admin_dashboard_handler(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Response {
    let users = match state.admin.list_users().await {
        Ok(users) => users,
        Err(err) => return service_error_response("Failed to load admin progress", &err),
    };

    let active = params
        .user
        .as_deref()
        .and_then(|id| users.iter().find(|user| user.user_id == id))
        .or_else(|| users.first());
    let summary = active
        .map(|user| services::AdminService::summarize(&state.catalog, user))
        .unwrap_or_default();

    Html(dashboard::render(&users, active, &summary)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorsConfig;
    use axum::body::Body;
    use axum::http::Request;
    use progress_core::model::{Page, PageCatalog, Step};
    use storage::repository::{Storage, UserDocumentRepository};
    use tower::ServiceExt;

    fn test_state(storage: &Storage) -> AppState {
        let catalog = PageCatalog::new(vec![Page {
            slug: "intro".to_owned(),
            title: "Intro".to_owned(),
            index: 0,
            steps: vec![Step::new("start"), Step::new("end")],
        }]);
        AppState::new(storage, catalog, CorsConfig::default())
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("parse body")
    }

    #[tokio::test]
    async fn unknown_user_is_404_with_error_body() {
        let storage = Storage::in_memory();
        let router = build_router(test_state(&storage));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/users/ghost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({"error": "User not found"}));
    }

    #[tokio::test]
    async fn malformed_patch_body_is_400() {
        let storage = Storage::in_memory();
        let router = build_router(test_state(&storage));

        for body in ["not json", "[1,2]", "{}", ""] {
            let response = router
                .clone()
                .oneshot(
                    Request::builder()
                        .method("PATCH")
                        .uri("/users/u1")
                        .body(Body::from(body))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body:?}");
        }
    }

    #[tokio::test]
    async fn patch_then_get_round_trips_progress() {
        let storage = Storage::in_memory();
        let router = build_router(test_state(&storage));

        let patch = Request::builder()
            .method("PATCH")
            .uri("/users/u1")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"pagesProgress/intro/step_name": "end",
                    "pagesProgress/intro/updated_at": "2024-01-01T00:00:00Z"}"#,
            ))
            .unwrap();
        let response = router.clone().oneshot(patch).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/users/u1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let user = body_json(response).await;
        assert_eq!(user.get("userId"), Some(&json!("u1")));
        assert_eq!(
            user.pointer("/pagesProgress/intro/step_name"),
            Some(&json!("end"))
        );
    }

    #[tokio::test]
    async fn admin_progress_lists_users_under_both_routes() {
        let storage = Storage::in_memory();
        storage
            .users
            .upsert(&json!({"userId": "u1", "pagesProgress": {}}))
            .await
            .unwrap();
        let router = build_router(test_state(&storage));

        for uri in ["/admin/progress", "/admin/progress/summary"] {
            let response = router
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_json(response).await;
            assert_eq!(body["users"][0]["userId"], json!("u1"));
        }
    }

    #[tokio::test]
    async fn options_preflight_short_circuits_with_cors_headers() {
        let storage = Storage::in_memory();
        let router = build_router(test_state(&storage));

        let response = router
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/users/u1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn responses_carry_cors_headers() {
        let storage = Storage::in_memory();
        let router = build_router(test_state(&storage));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/admin/progress")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.headers().contains_key("access-control-allow-origin"));
        assert!(response.headers().contains_key("access-control-allow-methods"));
    }

    #[tokio::test]
    async fn dashboard_renders_summary_for_selected_user() {
        let storage = Storage::in_memory();
        storage
            .users
            .upsert(&json!({
                "userId": "u1",
                "email": "learner@example.com",
                "pagesProgress": {
                    "intro": {"step_name": "end", "updated_at": "2024-01-01T00:00:00Z"}
                }
            }))
            .await
            .unwrap();
        let router = build_router(test_state(&storage));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/admin/dashboard?user=u1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("learner@example.com"));
        assert!(html.contains("Completed"));
        assert!(html.contains("100%"));
    }
}
