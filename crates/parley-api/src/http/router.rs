//! Axum router configuration with middleware.
//!
//! All chat routes are under `/api/chat/`. Each route is registered with and
//! without its trailing slash; existing web clients use the slashed
//! form. Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{MethodRouter, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = if state.config.server.cors_allow_any_origin {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let collection = get(handlers::session::list_sessions).post(handlers::session::create_session);
    let item = get(handlers::session::get_session)
        .put(handlers::session::update_session)
        .patch(handlers::session::update_session)
        .delete(handlers::session::delete_session);
    let messages = post(handlers::session::append_message);
    let messages_list = get(handlers::session::list_messages);

    let api_routes = Router::new();
    let api_routes = with_slash_variants(api_routes, "/sessions", collection);
    let api_routes = with_slash_variants(api_routes, "/sessions/{id}", item);
    let api_routes = with_slash_variants(api_routes, "/sessions/{id}/messages", messages);
    let api_routes = with_slash_variants(api_routes, "/sessions/{id}/messages_list", messages_list);

    Router::new()
        .nest("/api/chat", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Register `handler` at `path` and at `path/`.
fn with_slash_variants(
    router: Router<AppState>,
    path: &str,
    handler: MethodRouter<AppState>,
) -> Router<AppState> {
    router
        .route(path, handler.clone())
        .route(&format!("{path}/"), handler)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use parley_infra::sqlite::pool::{DatabasePool, database_url_for};
    use parley_types::config::ParleyConfig;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url_for(dir.path());
        let pool = DatabasePool::new(&url).await.unwrap();
        let data_dir = dir.path().to_path_buf();
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        build_router(AppState::from_parts(pool, ParleyConfig::default(), data_dir))
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        match body {
            Some(body) => {
                send_raw(router, method, uri, Some("application/json"), body.to_string()).await
            }
            None => send_raw(router, method, uri, None, String::new()).await,
        }
    }

    async fn send_raw(
        router: &Router,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: String,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        let request = builder.body(Body::from(body)).unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(router: &Router, body: Value) -> Value {
        let (status, session) = send(router, Method::POST, "/api/chat/sessions/", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        session
    }

    fn session_uri(session: &Value, suffix: &str) -> String {
        format!("/api/chat/sessions/{}/{suffix}", session["id"].as_str().unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let router = test_router().await;
        let (status, body) = send(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_session_default_and_explicit_title() {
        let router = test_router().await;

        let session = create(&router, json!({})).await;
        assert_eq!(session["title"], "New Chat");
        assert_eq!(session["messages"], json!([]));
        assert!(session["created_at"].is_string());
        assert!(session["updated_at"].is_string());

        let session = create(&router, json!({"title": "Foo"})).await;
        assert_eq!(session["title"], "Foo");
    }

    #[tokio::test]
    async fn test_create_session_blank_title_is_validation_error() {
        let router = test_router().await;
        let (status, body) =
            send(&router, Method::POST, "/api/chat/sessions/", Some(json!({"title": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
        assert!(body["errors"][0]["details"]["title"].is_array());
    }

    #[tokio::test]
    async fn test_list_sessions_is_abbreviated() {
        let router = test_router().await;
        create(&router, json!({"title": "One"})).await;
        create(&router, json!({"title": "Two"})).await;

        let (status, body) = send(&router, Method::GET, "/api/chat/sessions/", None).await;
        assert_eq!(status, StatusCode::OK);
        let sessions = body.as_array().unwrap();
        assert_eq!(sessions.len(), 2);
        for session in sessions {
            assert!(session.get("messages").is_none());
            assert!(session["id"].is_string());
            assert_eq!(session["message_count"], 0);
            assert!(session.get("last_message").is_none());
        }

        // The slash-less form is routed too.
        let (status, _) = send(&router, Method::GET, "/api/chat/sessions", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_sessions_reports_message_activity() {
        let router = test_router().await;
        let session = create(&router, json!({})).await;
        for (role, content) in [("user", "Hello"), ("assistant", "Hi there")] {
            send(
                &router,
                Method::POST,
                &session_uri(&session, "messages/"),
                Some(json!({"role": role, "content": content})),
            )
            .await;
        }

        let (_, body) = send(&router, Method::GET, "/api/chat/sessions/", None).await;
        let listed = &body[0];
        assert_eq!(listed["id"], session["id"]);
        assert_eq!(listed["message_count"], 2);
        assert_eq!(listed["last_message"]["role"], "assistant");
        assert_eq!(listed["last_message"]["content"], "Hi there");
    }

    #[tokio::test]
    async fn test_create_session_without_body_uses_default_title() {
        let router = test_router().await;
        let (status, session) = send(&router, Method::POST, "/api/chat/sessions/", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(session["title"], "New Chat");
    }

    #[tokio::test]
    async fn test_append_without_body_is_bad_request() {
        let router = test_router().await;
        let session = create(&router, json!({})).await;

        let (status, body) =
            send(&router, Method::POST, &session_uri(&session, "messages/"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "BAD_REQUEST");
        assert_eq!(body["errors"][0]["message"], "Both role and content are required");
    }

    #[tokio::test]
    async fn test_append_to_missing_session_outranks_body_errors() {
        let router = test_router().await;
        let uri = format!("/api/chat/sessions/{}/messages/", uuid::Uuid::now_v7());

        let (status, body) = send(&router, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0]["code"], "SESSION_NOT_FOUND");

        let (status, _) = send_raw(
            &router,
            Method::POST,
            &uri,
            Some("application/json"),
            "{not json".to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_append_accepts_form_body() {
        let router = test_router().await;
        let session = create(&router, json!({})).await;

        let (status, message) = send_raw(
            &router,
            Method::POST,
            &session_uri(&session, "messages/"),
            Some("application/x-www-form-urlencoded"),
            "role=user&content=Plan+my+trip".to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(message["content"], "Plan my trip");

        let (_, detail) = send(&router, Method::GET, &session_uri(&session, ""), None).await;
        assert_eq!(detail["title"], "Plan my trip");
    }

    #[tokio::test]
    async fn test_append_message_auto_titles_and_returns_created() {
        let router = test_router().await;
        let session = create(&router, json!({})).await;

        let (status, message) = send(
            &router,
            Method::POST,
            &session_uri(&session, "messages/"),
            Some(json!({"role": "user", "content": "Hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(message["role"], "user");
        assert_eq!(message["content"], "Hello");
        assert_eq!(message["session"], session["id"]);

        let (_, detail) = send(&router, Method::GET, &session_uri(&session, ""), None).await;
        assert_eq!(detail["title"], "Hello");
        assert_eq!(detail["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_append_long_message_truncates_title() {
        let router = test_router().await;
        let session = create(&router, json!({})).await;
        let content = "a".repeat(60);

        send(
            &router,
            Method::POST,
            &session_uri(&session, "messages/"),
            Some(json!({"role": "user", "content": content})),
        )
        .await;

        let (_, detail) = send(&router, Method::GET, &session_uri(&session, ""), None).await;
        assert_eq!(detail["title"], format!("{}...", "a".repeat(50)));
    }

    #[tokio::test]
    async fn test_assistant_first_message_keeps_default_title() {
        let router = test_router().await;
        let session = create(&router, json!({})).await;

        send(
            &router,
            Method::POST,
            &session_uri(&session, "messages/"),
            Some(json!({"role": "assistant", "content": "Hi"})),
        )
        .await;

        let (_, detail) = send(&router, Method::GET, &session_uri(&session, ""), None).await;
        assert_eq!(detail["title"], "New Chat");
    }

    #[tokio::test]
    async fn test_append_missing_fields_is_bad_request() {
        let router = test_router().await;
        let session = create(&router, json!({})).await;

        for body in [
            json!({"content": "Hello"}),
            json!({"role": "user"}),
            json!({"role": "", "content": "Hello"}),
        ] {
            let (status, err) = send(
                &router,
                Method::POST,
                &session_uri(&session, "messages/"),
                Some(body),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(err["errors"][0]["message"], "Both role and content are required");
        }

        let (_, messages) =
            send(&router, Method::GET, &session_uri(&session, "messages_list/"), None).await;
        assert_eq!(messages, json!([]));
    }

    #[tokio::test]
    async fn test_append_bumps_updated_at() {
        let router = test_router().await;
        let session = create(&router, json!({})).await;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        send(
            &router,
            Method::POST,
            &session_uri(&session, "messages/"),
            Some(json!({"role": "user", "content": "Hello"})),
        )
        .await;

        let (_, detail) = send(&router, Method::GET, &session_uri(&session, ""), None).await;
        let parse = |v: &Value| {
            chrono::DateTime::parse_from_rfc3339(v.as_str().unwrap()).unwrap()
        };
        assert!(parse(&detail["updated_at"]) > parse(&session["updated_at"]));
        assert!(parse(&detail["updated_at"]) > parse(&detail["created_at"]));
        assert_eq!(detail["created_at"], session["created_at"]);
    }

    #[tokio::test]
    async fn test_messages_list_is_chronological() {
        let router = test_router().await;
        let session = create(&router, json!({})).await;

        for (role, content) in [("user", "one"), ("assistant", "two"), ("user", "three")] {
            send(
                &router,
                Method::POST,
                &session_uri(&session, "messages/"),
                Some(json!({"role": role, "content": content})),
            )
            .await;
        }

        let (status, messages) =
            send(&router, Method::GET, &session_uri(&session, "messages_list/"), None).await;
        assert_eq!(status, StatusCode::OK);
        let contents: Vec<&str> = messages
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_update_session_put_and_patch() {
        let router = test_router().await;
        let session = create(&router, json!({})).await;

        let (status, updated) = send(
            &router,
            Method::PUT,
            &session_uri(&session, ""),
            Some(json!({"title": "Renamed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Renamed");

        let (status, patched) =
            send(&router, Method::PATCH, &session_uri(&session, ""), Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["title"], "Renamed");

        // A renamed session is never auto-titled.
        send(
            &router,
            Method::POST,
            &session_uri(&session, "messages/"),
            Some(json!({"role": "user", "content": "Hello"})),
        )
        .await;
        let (_, detail) = send(&router, Method::GET, &session_uri(&session, ""), None).await;
        assert_eq!(detail["title"], "Renamed");
    }

    #[tokio::test]
    async fn test_malformed_update_body_is_bad_request() {
        let router = test_router().await;
        let session = create(&router, json!({})).await;

        let (status, body) = send(
            &router,
            Method::PUT,
            &session_uri(&session, ""),
            Some(json!({"title": 42})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_missing_session_is_not_found() {
        let router = test_router().await;
        let missing = format!("/api/chat/sessions/{}/", uuid::Uuid::now_v7());

        let (status, body) = send(&router, Method::GET, &missing, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0]["code"], "SESSION_NOT_FOUND");

        let (status, _) = send(&router, Method::PUT, &missing, Some(json!({"title": "x"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, Method::DELETE, &missing, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &router,
            Method::POST,
            &format!("{missing}messages/"),
            Some(json!({"role": "user", "content": "Hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, Method::GET, &format!("{missing}messages_list/"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, Method::GET, "/api/chat/sessions/not-a-uuid/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_session_cascades() {
        let router = test_router().await;
        let session = create(&router, json!({})).await;
        send(
            &router,
            Method::POST,
            &session_uri(&session, "messages/"),
            Some(json!({"role": "user", "content": "Hello"})),
        )
        .await;

        let (status, body) = send(&router, Method::DELETE, &session_uri(&session, ""), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) =
            send(&router, Method::GET, &session_uri(&session, "messages_list/"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, sessions) = send(&router, Method::GET, "/api/chat/sessions/", None).await;
        assert_eq!(sessions, json!([]));
    }
}
