//! End-to-end tests: real router, real `SQLite` store (in memory), recording
//! callback sender.

use std::future::{Future, ready};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use metacat_adapter_http_axum::router;
use metacat_adapter_http_axum::state::AppState;
use metacat_adapter_storage_sqlite_sqlx::{Config, SqliteDocumentStore};
use metacat_app::catalog::Context;
use metacat_app::notifier::{ChangeNotifier, NotifierConfig};
use metacat_app::ports::CallbackSender;
use metacat_app::store::Limits;
use metacat_domain::error::MetacatError;
use metacat_domain::notification::{ChangeAction, ChangeNotice};
use serde_json::{Value, json};
use tower::ServiceExt;

#[derive(Default)]
struct Recorder {
    notices: Mutex<Vec<ChangeNotice>>,
}

impl CallbackSender for Recorder {
    fn deliver(
        &self,
        notice: &ChangeNotice,
    ) -> impl Future<Output = Result<(), MetacatError>> + Send {
        self.notices.lock().unwrap().push(notice.clone());
        ready(Ok(()))
    }
}

struct Harness {
    app: Router,
    recorder: Arc<Recorder>,
}

async fn harness(max_results: usize) -> Harness {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
    }
    .build()
    .await
    .unwrap();
    let store = Arc::new(SqliteDocumentStore::new(db.pool().clone()));
    let recorder = Arc::new(Recorder::default());
    let (notifier, _workers) = ChangeNotifier::spawn(
        Arc::clone(&recorder),
        NotifierConfig {
            workers: 1,
            queue_depth: 16,
            timeout: Duration::from_secs(1),
        },
    );
    let ctx = Context::new(store, Limits { max_results }, notifier);
    Harness {
        app: router::build(AppState::new(&ctx)),
        recorder,
    }
}

impl Harness {
    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn get_json(&self, uri: &str) -> Value {
        let (status, body) = self.get(uri).await;
        assert_eq!(status, StatusCode::OK, "GET {uri}: {body}");
        serde_json::from_str(&body).unwrap()
    }

    async fn json(&self, method: &str, uri: &str, body: &Value) -> (StatusCode, String) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn create(&self, uri: &str, body: &Value) -> String {
        let (status, id) = self.json("POST", uri, body).await;
        assert_eq!(status, StatusCode::OK, "POST {uri}: {id}");
        id
    }

    async fn delete(&self, uri: &str) -> (StatusCode, String) {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Addressable A1, service S1 on A1, profile P1 with command C1 and
    /// device D1 tying them together.
    async fn seed(&self) -> Seeded {
        let addressable = self
            .create(
                "/api/v1/addressable",
                &json!({
                    "name": "A1",
                    "protocol": "HTTP",
                    "address": "10.0.0.1",
                    "port": 49990,
                    "path": "/api/v1/callback"
                }),
            )
            .await;
        let service = self
            .create(
                "/api/v1/deviceservice",
                &json!({
                    "name": "S1",
                    "addressable": {"name": "A1"},
                    "operating_state": "ENABLED",
                    "admin_state": "UNLOCKED"
                }),
            )
            .await;
        let profile = self
            .create(
                "/api/v1/deviceprofile",
                &json!({
                    "name": "P1",
                    "manufacturer": "Acme",
                    "model": "T-1000",
                    "commands": [{"name": "C1"}]
                }),
            )
            .await;
        let device = self
            .create(
                "/api/v1/device",
                &json!({
                    "name": "D1",
                    "labels": ["lab"],
                    "addressable": {"name": "A1"},
                    "service": {"name": "S1"},
                    "profile": {"name": "P1"},
                    "operating_state": "ENABLED",
                    "admin_state": "UNLOCKED"
                }),
            )
            .await;
        Seeded {
            addressable,
            service,
            profile,
            device,
        }
    }

    async fn wait_for_notices(&self, count: usize) -> Vec<ChangeNotice> {
        for _ in 0..100 {
            {
                let notices = self.recorder.notices.lock().unwrap();
                if notices.len() >= count {
                    return notices.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {count} notices");
    }
}

struct Seeded {
    addressable: String,
    service: String,
    profile: String,
    device: String,
}

#[tokio::test]
async fn should_return_device_with_fully_attached_graph() {
    let h = harness(100).await;
    let seeded = h.seed().await;

    let device = h.get_json(&format!("/api/v1/device/{}", seeded.device)).await;
    assert_eq!(device["name"], "D1");
    assert_eq!(device["addressable"]["id"], seeded.addressable.as_str());
    assert_eq!(device["service"]["id"], seeded.service.as_str());
    assert_eq!(device["service"]["addressable"]["name"], "A1");
    assert_eq!(device["profile"]["id"], seeded.profile.as_str());
    assert_eq!(device["profile"]["commands"][0]["name"], "C1");

    let by_name = h.get_json("/api/v1/device/name/D1").await;
    assert_eq!(by_name, device);
}

#[tokio::test]
async fn should_answer_association_queries() {
    let h = harness(100).await;
    let seeded = h.seed().await;

    let by_profile = h
        .get_json(&format!("/api/v1/device/profile/{}", seeded.profile))
        .await;
    assert_eq!(by_profile.as_array().unwrap().len(), 1);

    let by_service_name = h.get_json("/api/v1/device/servicename/S1").await;
    assert_eq!(by_service_name[0]["name"], "D1");

    let by_label = h.get_json("/api/v1/device/label/lab").await;
    assert_eq!(by_label.as_array().unwrap().len(), 1);

    let services = h
        .get_json("/api/v1/deviceservice/addressablename/A1")
        .await;
    assert_eq!(services[0]["name"], "S1");

    let unused = h.get_json("/api/v1/device/label/nothing").await;
    assert_eq!(unused, json!([]));

    let (status, body) = h.get("/api/v1/device/servicename/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"device service not found: nope"}"#);
}

#[tokio::test]
async fn should_refuse_duplicate_names_with_conflict() {
    let h = harness(100).await;
    h.seed().await;

    let (status, body) = h
        .json("POST", "/api/v1/addressable", &json!({"name": "A1"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("A1"), "{body}");
}

#[tokio::test]
async fn should_refuse_device_with_unknown_association() {
    let h = harness(100).await;
    h.seed().await;

    let (status, _) = h
        .json(
            "POST",
            "/api/v1/device",
            &json!({
                "name": "D2",
                "addressable": {"name": "A1"},
                "service": {"name": "S1"},
                "profile": {"name": "missing"},
                "operating_state": "ENABLED",
                "admin_state": "UNLOCKED"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = h.get("/api/v1/device/name/D2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_refuse_deleting_referenced_entities_until_dependents_are_gone() {
    let h = harness(100).await;
    let seeded = h.seed().await;

    let (status, body) = h.delete("/api/v1/addressable/name/A1").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("still referenced"), "{body}");

    let (status, _) = h.delete("/api/v1/deviceprofile/name/P1").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = h.delete(&format!("/api/v1/device/{}", seeded.device)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "true");

    let (status, _) = h.delete("/api/v1/deviceprofile/name/P1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = h.delete("/api/v1/addressable/name/A1").await;
    assert_eq!(status, StatusCode::CONFLICT, "service S1 still uses A1");
}

#[tokio::test]
async fn should_apply_partial_updates_and_follow_renames_by_id() {
    let h = harness(100).await;
    let seeded = h.seed().await;

    let (status, body) = h
        .json("PUT", "/api/v1/addressable", &json!({"name": "A1", "port": 49991}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "true");
    let addressable = h.get_json("/api/v1/addressable/name/A1").await;
    assert_eq!(addressable["port"], 49991);
    assert_eq!(addressable["address"], "10.0.0.1");

    let (status, _) = h
        .json(
            "PUT",
            "/api/v1/addressable",
            &json!({"id": seeded.addressable, "name": "A9"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let device = h.get_json(&format!("/api/v1/device/{}", seeded.device)).await;
    assert_eq!(device["addressable"]["name"], "A9");
    let (status, _) = h.get("/api/v1/addressable/name/A1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_report_limit_exceeded_for_large_listings() {
    let h = harness(1).await;
    h.create("/api/v1/addressable", &json!({"name": "A1"}))
        .await;
    h.create("/api/v1/addressable", &json!({"name": "A2"}))
        .await;

    let (status, body) = h.get("/api/v1/addressable").await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body.starts_with(r#"{"error":"#), "{body}");

    let (status, _) = h.get("/api/v1/addressable/name/A2").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn should_list_commands_across_profiles() {
    let h = harness(100).await;
    let seeded = h.seed().await;

    let (status, command_id) = h
        .json(
            "POST",
            &format!("/api/v1/deviceprofile/{}/command", seeded.profile),
            &json!({"name": "C2"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let commands = h.get_json("/api/v1/command").await;
    assert_eq!(commands.as_array().unwrap().len(), 2);

    let command = h.get_json(&format!("/api/v1/command/{command_id}")).await;
    assert_eq!(command["name"], "C2");

    let (status, _) = h
        .json(
            "POST",
            &format!("/api/v1/deviceprofile/{}/command", seeded.profile),
            &json!({"name": "C1"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "command names are unique per profile");
}

#[tokio::test]
async fn should_import_and_export_profile_documents() {
    let h = harness(100).await;
    let document = "\
name: Thermostat
manufacturer: Acme
model: T-1000
commands:
  - name: temperature
    get:
      path: /api/v1/device/{deviceId}/temperature
      responses:
        - code: '200'
          expectedValues: [temperature]
";
    let (status, id) = h
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/v1/deviceprofile/upload")
                .body(Body::from(document))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{id}");

    let profile = h.get_json(&format!("/api/v1/deviceprofile/{id}")).await;
    assert_eq!(profile["name"], "Thermostat");
    assert_eq!(profile["commands"][0]["get"]["responses"][0]["expected_values"][0], "temperature");

    let (status, yaml) = h.get("/api/v1/deviceprofile/yaml/name/Thermostat").await;
    assert_eq!(status, StatusCode::OK);
    assert!(yaml.contains("name: Thermostat"), "{yaml}");
    assert!(yaml.contains("expectedValues"), "{yaml}");

    let (status, _) = h
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/v1/deviceprofile/upload")
                .body(Body::from(document))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "profile name already taken");
}

#[tokio::test]
async fn should_update_device_operating_state() {
    let h = harness(100).await;
    let seeded = h.seed().await;

    let (status, body) = h
        .send(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/v1/device/{}/opstate/DISABLED", seeded.device))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let device = h.get_json(&format!("/api/v1/device/{}", seeded.device)).await;
    assert_eq!(device["operating_state"], "DISABLED");

    let (status, _) = h
        .send(
            Request::builder()
                .method("PUT")
                .uri("/api/v1/device/unknown/opstate/ENABLED")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_notify_owning_service_on_device_changes() {
    let h = harness(100).await;
    let seeded = h.seed().await;

    let (status, _) = h.delete(&format!("/api/v1/device/{}", seeded.device)).await;
    assert_eq!(status, StatusCode::OK);

    let notices = h.wait_for_notices(2).await;
    let device_notices: Vec<&ChangeNotice> = notices
        .iter()
        .filter(|n| n.subject_id == seeded.device)
        .collect();
    assert_eq!(device_notices.len(), 2);
    assert_eq!(device_notices[0].action, ChangeAction::Create);
    assert_eq!(device_notices[1].action, ChangeAction::Delete);
    assert_eq!(device_notices[0].target.name, "A1");
    assert_eq!(device_notices[0].target.port, 49990);
}
