//! Axum router assembly.

use axum::Router;
use tower_http::trace::TraceLayer;

use metacat_app::ports::DocumentStore;

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests the API routes under `/api/v1` and adds a [`TraceLayer`] that logs
/// each HTTP request/response at the `DEBUG` level using the `tracing`
/// ecosystem.
pub fn build<S: DocumentStore>(state: AppState<S>) -> Router {
    Router::new()
        .nest("/api/v1", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use metacat_app::catalog::Context;
    use metacat_app::notifier::ChangeNotifier;
    use metacat_app::ports::{Collection, Filter, RawDocument, StoreError};
    use metacat_app::store::Limits;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    /// A store that holds nothing and accepts every write.
    struct EmptyStore;

    impl DocumentStore for EmptyStore {
        async fn get(&self, _: Collection, _: &str) -> Result<Option<Value>, StoreError> {
            Ok(None)
        }
        async fn get_by_name(&self, _: Collection, _: &str) -> Result<Option<Value>, StoreError> {
            Ok(None)
        }
        async fn list(&self, _: Collection, _: usize) -> Result<Vec<Value>, StoreError> {
            Ok(vec![])
        }
        async fn find(&self, _: Collection, _: &Filter, _: usize) -> Result<Vec<Value>, StoreError> {
            Ok(vec![])
        }
        async fn exists(&self, _: Collection, _: &Filter) -> Result<bool, StoreError> {
            Ok(false)
        }
        async fn insert(&self, _: Collection, _: RawDocument) -> Result<(), StoreError> {
            Ok(())
        }
        async fn replace(&self, _: Collection, _: RawDocument) -> Result<bool, StoreError> {
            Ok(false)
        }
        async fn delete(&self, _: Collection, _: &str) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    fn app() -> Router {
        let ctx = Context::new(
            Arc::new(EmptyStore),
            Limits::default(),
            ChangeNotifier::disabled(),
        );
        build(AppState::new(&ctx))
    }

    async fn send(request: Request<Body>) -> (StatusCode, String) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn with_body(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn should_answer_ping() {
        let (status, body) = send(get("/api/v1/ping")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "pong");
    }

    #[tokio::test]
    async fn should_return_not_found_with_error_body() {
        let (status, body) = send(get("/api/v1/device/name/D1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"error":"device not found: D1"}"#);
    }

    #[tokio::test]
    async fn should_return_bad_request_for_malformed_json() {
        let (status, body) = send(with_body("POST", "/api/v1/addressable", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with(r#"{"error":"#));
    }

    #[tokio::test]
    async fn should_return_bad_request_for_malformed_path_parameters() {
        let (status, _) = send(get("/api/v1/addressable/port/http")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = Request::builder()
            .method("PUT")
            .uri("/api/v1/device/abc/opstate/SLEEPING")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_conflict_for_update_without_identity() {
        let (status, body) = send(with_body("PUT", "/api/v1/addressable", "{}")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("identify its target"));
    }

    #[tokio::test]
    async fn should_return_bad_request_for_blank_profile_document() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/deviceprofile/upload")
            .body(Body::from("   \n"))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"error":"document is empty"}"#);
    }

    #[tokio::test]
    async fn should_return_generated_id_as_text_on_create() {
        let (status, body) = send(with_body(
            "POST",
            "/api/v1/addressable",
            r#"{"name":"A1","protocol":"HTTP","address":"10.0.0.1","port":48080}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.len(), 36, "expected a uuid, got {body}");
    }
}
