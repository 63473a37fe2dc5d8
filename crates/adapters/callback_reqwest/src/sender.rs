//! [`CallbackSender`] over HTTP.

use std::time::Duration;

use metacat_app::ports::CallbackSender;
use metacat_domain::error::MetacatError;
use metacat_domain::notification::{ChangeAction, ChangeNotice};
use reqwest::Method;

use crate::error::CallbackError;

/// HTTP method announcing `action`.
#[must_use]
pub fn method_for(action: ChangeAction) -> Method {
    match action {
        ChangeAction::Create => Method::POST,
        ChangeAction::Update => Method::PUT,
        ChangeAction::Delete => Method::DELETE,
    }
}

/// Sends each notice as one JSON request to the target addressable.
#[derive(Debug, Clone)]
pub struct HttpCallbackSender {
    client: reqwest::Client,
}

impl HttpCallbackSender {
    /// Build a sender whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::Client`] when the TLS backend cannot be
    /// initialised.
    pub fn new(timeout: Duration) -> Result<Self, CallbackError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CallbackError::Client)?;
        Ok(Self { client })
    }

    async fn send(&self, notice: &ChangeNotice) -> Result<(), CallbackError> {
        let url = notice.target.url();
        let method = method_for(notice.action);
        tracing::debug!(%url, %method, subject_id = %notice.subject_id, "sending callback");

        let response = self
            .client
            .request(method, &url)
            .json(&notice.body())
            .send()
            .await
            .map_err(|source| CallbackError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CallbackError::Status { url, status });
        }
        Ok(())
    }
}

impl CallbackSender for HttpCallbackSender {
    async fn deliver(&self, notice: &ChangeNotice) -> Result<(), MetacatError> {
        Ok(self.send(notice).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::State;
    use axum::http::{Method as AxumMethod, StatusCode};
    use axum::routing::any;
    use metacat_domain::addressable::{Addressable, Protocol};
    use metacat_domain::notification::SubjectType;
    use serde_json::Value;

    use super::*;

    type Received = Arc<Mutex<Vec<(AxumMethod, Value)>>>;

    async fn record(
        State(received): State<Received>,
        method: AxumMethod,
        body: String,
    ) -> StatusCode {
        let body = serde_json::from_str(&body).unwrap_or(Value::Null);
        received.lock().unwrap().push((method, body));
        StatusCode::OK
    }

    /// Start a callback receiver on an ephemeral port; returns its port.
    async fn receiver(received: Received) -> u16 {
        let app = Router::new()
            .route("/api/v1/callback", any(record))
            .route("/broken", any(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .with_state(received);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        port
    }

    fn notice(port: u16, path: &str, action: ChangeAction) -> ChangeNotice {
        let target = Addressable::builder()
            .name("A1")
            .protocol(Protocol::Http)
            .address("127.0.0.1")
            .port(port)
            .path(path)
            .build()
            .unwrap();
        ChangeNotice {
            target,
            subject_id: "d1".to_string(),
            action,
            subject: SubjectType::Device,
        }
    }

    #[test]
    fn should_pick_method_from_action() {
        assert_eq!(method_for(ChangeAction::Create), Method::POST);
        assert_eq!(method_for(ChangeAction::Update), Method::PUT);
        assert_eq!(method_for(ChangeAction::Delete), Method::DELETE);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn should_deliver_type_and_id_with_action_method() {
        let received = Received::default();
        let port = receiver(Arc::clone(&received)).await;
        let sender = HttpCallbackSender::new(Duration::from_secs(5)).unwrap();

        sender
            .deliver(&notice(port, "/api/v1/callback", ChangeAction::Create))
            .await
            .unwrap();
        sender
            .deliver(&notice(port, "/api/v1/callback", ChangeAction::Delete))
            .await
            .unwrap();

        let received = received.lock().unwrap().clone();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].0, AxumMethod::POST);
        assert_eq!(received[0].1, serde_json::json!({"type": "DEVICE", "id": "d1"}));
        assert_eq!(received[1].0, AxumMethod::DELETE);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn should_fail_on_error_status() {
        let port = receiver(Received::default()).await;
        let sender = HttpCallbackSender::new(Duration::from_secs(5)).unwrap();
        let err = sender
            .send(&notice(port, "/broken", ChangeAction::Update))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CallbackError::Status { status, .. } if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
        ));
    }
}
