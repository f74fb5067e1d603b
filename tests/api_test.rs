//! REST and WHIP API integration tests against an in-process bridge

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::{FakeSmb, CLIENT_ANSWER, WHIP_OFFER};
use intercom::application::{
    CallService, CallSettings, LineBridge, LineService, SfuInstance, SfuRouter,
};
use intercom::domain::client::ClientRepository;
use intercom::infrastructure::persistence::{
    InMemoryCallRepository, InMemoryClientRepository, InMemoryLineRepository,
};
use intercom::interface::api::{build_router, AppState, CLIENT_ID_HEADER};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot`

const SMB_URL: &str = "http://smb:8080/conferences/";

struct TestApp {
    app: Router,
    smb: Arc<FakeSmb>,
}

fn setup(max_conferences: usize) -> TestApp {
    let smb = Arc::new(FakeSmb::default());
    let clients: Arc<dyn ClientRepository> = Arc::new(InMemoryClientRepository::new());
    let router = Arc::new(SfuRouter::new(vec![SfuInstance::new(
        SMB_URL,
        "",
        max_conferences,
    )]));

    let calls = CallService::new(
        Arc::new(InMemoryCallRepository::new()),
        clients.clone(),
        smb.clone(),
        router.clone(),
        CallSettings::default(),
    );
    let lines = LineService::new(
        Arc::new(InMemoryLineRepository::new()),
        smb.clone(),
        LineBridge {
            url: SMB_URL.to_string(),
            api_key: String::new(),
            endpoint_idle_timeout_secs: 60,
        },
    );

    let state = AppState {
        calls,
        lines,
        clients,
        router,
    };
    let handle = PrometheusBuilder::new().build_recorder().handle();
    TestApp {
        app: build_router(state, handle),
        smb,
    }
}

impl TestApp {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        client: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(client) = client {
            request = request.header(CLIENT_ID_HEADER, client);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    async fn register(&self, id: &str, name: &str) {
        let (status, _) = self
            .send(
                Method::POST,
                "/api/v1/clients",
                None,
                Some(json!({ "id": id, "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    async fn start_call(&self, caller: &str, callee: &str) -> String {
        let (status, json) = self
            .send(
                Method::POST,
                "/api/v1/calls",
                Some(caller),
                Some(json!({ "callee_id": callee })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", json);
        json["data"]["call"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_check() {
    let t = setup(10);
    let (status, json) = t.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["sfu_instances"][0]["url"], SMB_URL);
    assert!(json["data"]["sfu_instances"][0].get("api_key").is_none());
}

#[tokio::test]
async fn test_full_call_flow() {
    let t = setup(10);
    t.register("alice", "Alice").await;
    t.register("bob", "Bob").await;

    let (status, json) = t
        .send(
            Method::POST,
            "/api/v1/calls",
            Some("alice"),
            Some(json!({ "callee_id": "bob" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["call"]["state"], "offering");
    assert_eq!(json["data"]["call"]["caller_name"], "Alice");
    assert!(json["data"]["sdp"]
        .as_str()
        .unwrap()
        .contains("m=application 9 UDP/DTLS/SCTP webrtc-datachannel"));
    let call_id = json["data"]["call"]["id"].as_str().unwrap().to_string();
    let call_uri = format!("/api/v1/calls/{}", call_id);

    // Only the caller may answer the caller's offer
    let (status, _) = t
        .send(
            Method::PATCH,
            &format!("{}/caller-answer", call_uri),
            Some("bob"),
            Some(json!({ "sdp": CLIENT_ANSWER })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = t
        .send(
            Method::PATCH,
            &format!("{}/caller-answer", call_uri),
            Some("alice"),
            Some(json!({ "sdp": CLIENT_ANSWER })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["caller_ready"], true);
    assert_eq!(json["data"]["state"], "offering");

    let (status, json) = t
        .send(Method::POST, &format!("{}/join", call_uri), Some("bob"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"]["sdp"].as_str().unwrap().contains("a=group:BUNDLE"));

    for _ in 0..2 {
        let (status, json) = t
            .send(
                Method::PATCH,
                &format!("{}/callee-answer", call_uri),
                Some("bob"),
                Some(json!({ "sdp": CLIENT_ANSWER })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["state"], "active");
    }
    // Caller plus a single callee configuration
    assert_eq!(t.smb.configured().len(), 2);

    let (status, json) = t.send(Method::GET, "/api/v1/calls", Some("bob"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 1);

    let (status, json) = t.send(Method::DELETE, &call_uri, Some("bob"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["state"], "ended");
    assert_eq!(json["data"]["end_reason"], "callee_hangup");

    let (status, json) = t.send(Method::DELETE, &call_uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);

    let (_, json) = t.send(Method::GET, "/api/v1/calls", Some("alice"), None).await;
    assert_eq!(json["data"]["total"], 0);
}

#[tokio::test]
async fn test_call_errors_map_to_status_codes() {
    let t = setup(10);
    t.register("alice", "Alice").await;

    let (status, _) = t
        .send(
            Method::POST,
            "/api/v1/calls",
            None,
            Some(json!({ "callee_id": "bob" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = t
        .send(
            Method::POST,
            "/api/v1/calls",
            Some("alice"),
            Some(json!({ "callee_id": "nobody" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = t
        .send(Method::GET, "/api/v1/calls/not-a-call", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    t.register("bob", "Bob").await;
    t.send(Method::DELETE, "/api/v1/clients/bob", None, None).await;
    let (status, _) = t
        .send(
            Method::POST,
            "/api/v1/calls",
            Some("alice"),
            Some(json!({ "callee_id": "bob" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(t.smb.conferences().is_empty());
}

#[tokio::test]
async fn test_capacity_exhausted_is_service_unavailable() {
    let t = setup(1);
    t.register("alice", "Alice").await;
    t.register("bob", "Bob").await;
    t.register("carol", "Carol").await;

    t.start_call("alice", "bob").await;
    let (status, _) = t
        .send(
            Method::POST,
            "/api/v1/calls",
            Some("carol"),
            Some(json!({ "callee_id": "bob" })),
        )
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(t.smb.conferences().len(), 1);
}

#[tokio::test]
async fn test_disconnect_ends_calls() {
    let t = setup(10);
    t.register("alice", "Alice").await;
    t.register("bob", "Bob").await;
    let call_id = t.start_call("alice", "bob").await;

    let (status, json) = t.send(Method::DELETE, "/api/v1/clients/alice", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["online"], false);

    let (_, json) = t
        .send(Method::GET, &format!("/api/v1/calls/{}", call_id), None, None)
        .await;
    assert_eq!(json["data"]["state"], "ended");
    assert_eq!(json["data"]["end_reason"], "caller_disconnected");

    // Capacity was handed back
    let (_, json) = t.send(Method::GET, "/health", None, None).await;
    assert_eq!(json["data"]["sfu_instances"][0]["conference_count"], 0);
}

#[tokio::test]
async fn test_lines_and_whip_ingest() {
    let t = setup(10);
    let (status, json) = t
        .send(
            Method::POST,
            "/api/v1/lines",
            None,
            Some(json!({ "name": "studio" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(json["data"]["smb_conference_id"].is_null());
    let line_id = json["data"]["id"].as_str().unwrap().to_string();

    let (_, json) = t
        .send(
            Method::GET,
            &format!("/api/v1/lines/{}/participants", line_id),
            None,
            None,
        )
        .await;
    assert_eq!(json["data"], json!([]));

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/whip/lines/{}", line_id))
        .header(header::CONTENT_TYPE, "application/sdp")
        .body(Body::from(WHIP_OFFER))
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/sdp"
    );
    let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
    assert!(location.starts_with(&format!("/whip/lines/{}/", line_id)));
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let answer = String::from_utf8(body.to_vec()).unwrap();
    assert!(answer.contains("a=recvonly"));
    assert!(answer.contains("a=ice-ufrag:smbUfrag"));

    let (_, json) = t
        .send(Method::GET, &format!("/api/v1/lines/{}", line_id), None, None)
        .await;
    assert_eq!(json["data"]["smb_conference_id"], "conf-1");

    let (_, json) = t
        .send(
            Method::GET,
            &format!("/api/v1/lines/{}/participants", line_id),
            None,
            None,
        )
        .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    // Second publisher reuses the line's conference
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/whip/lines/{}", line_id))
        .header(header::CONTENT_TYPE, "application/sdp")
        .body(Body::from(WHIP_OFFER))
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(t.smb.conferences(), vec!["conf-1".to_string()]);
}

#[tokio::test]
async fn test_whip_requires_sdp_content_type() {
    let t = setup(10);
    let (_, json) = t
        .send(
            Method::POST,
            "/api/v1/lines",
            None,
            Some(json!({ "name": "studio" })),
        )
        .await;
    let line_id = json["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = t
        .send(
            Method::POST,
            &format!("/whip/lines/{}", line_id),
            None,
            Some(json!({ "sdp": WHIP_OFFER })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(t.smb.conferences().is_empty());
}
