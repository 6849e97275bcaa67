//! Integration tests for the backend gateway against a mock server
//!
//! Covers the auth header, the gate's fail-closed behavior, the 401/403
//! relock, and the raw-text fallback for unparsable successful bodies.

use serde_json::json;

use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ecko::backend::{BackendClient, AUTH_HEADER};
use ecko::config::BackendConfig;
use ecko::session::{GateState, MemorySessionStore, Session, SessionStore};

fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::new(&BackendConfig {
        base_url: server.uri(),
        timeout_seconds: 5,
    })
    .unwrap()
}

fn unlocked_session() -> Session {
    let mut session = Session::resume(Box::new(MemorySessionStore::new()));
    session.submit_password("hunter2").unwrap();
    session.confirm();
    session
}

/// Chat round-trip: the auth header carries the raw secret and the reply
/// text is decoded from the response field
#[tokio::test]
async fn test_chat_round_trip_with_auth_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ecko"))
        .and(header(AUTH_HEADER, "hunter2"))
        .and(body_json(json!({ "message": "hi" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "hello" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut session = unlocked_session();

    let reply = client.send_chat(&mut session, "hi").await.unwrap();
    assert_eq!(reply.response, Some("hello".to_string()));
    assert_eq!(session.state(), GateState::Unlocked);
}

/// A locked gate fails synchronously: zero requests reach the server
#[tokio::test]
async fn test_locked_gate_performs_no_network_io() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/list_files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut session = Session::resume(Box::new(MemorySessionStore::new()));

    let err = client.list_files(&mut session).await.unwrap_err();
    assert!(err.to_string().contains("Authentication"));
    assert_eq!(session.state(), GateState::Locked);

    // Dropping the server verifies the expect(0) call count
}

/// The placeholder URL fails closed with a configuration error and no
/// fetch is attempted
#[tokio::test]
async fn test_placeholder_url_yields_config_error() {
    let client = BackendClient::new(&BackendConfig::default()).unwrap();
    let mut session = unlocked_session();

    let err = client.send_chat(&mut session, "hi").await.unwrap_err();
    assert!(err.to_string().contains("Configuration"));
    // The gate is untouched by a configuration failure
    assert_eq!(session.state(), GateState::Unlocked);
}

/// A 403 from any endpoint relocks the gate and clears the persisted flag
#[tokio::test]
async fn test_forbidden_relocks_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get_logs"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "error": "bad password" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let store = Box::new(MemorySessionStore::new());
    let mut session = Session::resume(store);
    session.submit_password("wrong").unwrap();

    let err = client.logs(&mut session, "backend", 50).await.unwrap_err();
    assert!(err.to_string().contains("bad password"));
    assert_eq!(session.state(), GateState::Locked);
    assert!(session.secret().is_none());
}

/// A 401 behaves the same as a 403
#[tokio::test]
async fn test_unauthorized_relocks_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ecko"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut session = unlocked_session();

    let err = client.send_chat(&mut session, "hi").await.unwrap_err();
    assert!(err.to_string().contains("unauthorized"));
    assert_eq!(session.state(), GateState::Locked);
}

/// The relock also clears the flag in the injected store
#[tokio::test]
async fn test_relock_clears_store_flag() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/list_files"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = client_for(&server);

    // Keep a second handle on the same flag state via a shared store
    struct SharedStore(std::sync::Arc<MemorySessionStore>);
    impl SessionStore for SharedStore {
        fn load_flag(&self) -> ecko::Result<bool> {
            self.0.load_flag()
        }
        fn save_flag(&self) -> ecko::Result<()> {
            self.0.save_flag()
        }
        fn clear_flag(&self) -> ecko::Result<()> {
            self.0.clear_flag()
        }
    }

    let shared = std::sync::Arc::new(MemorySessionStore::new());
    let mut session = Session::resume(Box::new(SharedStore(shared.clone())));
    session.submit_password("wrong").unwrap();
    assert!(shared.load_flag().unwrap());

    let _ = client.list_files(&mut session).await;
    assert!(!shared.load_flag().unwrap());
}

/// Probe flow: password entry tentatively unlocks, a successful probe
/// confirms, a later 403 relocks
#[tokio::test]
async fn test_probe_round_trip_then_relock() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/list_files"))
        .and(header(AUTH_HEADER, "hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": ["a.py"] })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/deployment_status"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut session = Session::resume(Box::new(MemorySessionStore::new()));

    session.submit_password("hunter2").unwrap();
    assert_eq!(session.state(), GateState::TentativelyUnlocked);

    client.probe(&mut session).await.unwrap();
    assert_eq!(session.state(), GateState::Unlocked);

    let _ = client.deployment_status(&mut session, "backend").await;
    assert_eq!(session.state(), GateState::Locked);
}

/// An unparsable body on a successful status is tolerated, not thrown
#[tokio::test]
async fn test_raw_text_fallback_on_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get_file_content"))
        .and(query_param("path", "README"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text, not JSON"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut session = unlocked_session();

    let content = client
        .file_content(&mut session, "README")
        .await
        .unwrap();
    assert_eq!(content.content, "plain text, not JSON");
}

/// An unparsable body on a failure status is a hard error carrying the
/// truncated body text
#[tokio::test]
async fn test_error_body_is_truncated() {
    let server = MockServer::start().await;

    let long_body = "e".repeat(500);
    Mock::given(method("GET"))
        .and(path("/list_files"))
        .respond_with(ResponseTemplate::new(500).set_body_string(long_body))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut session = unlocked_session();

    let err = client.list_files(&mut session).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains(&"e".repeat(200)));
    assert!(!message.contains(&"e".repeat(201)));
    // A plain server error does not touch the gate
    assert_eq!(session.state(), GateState::Unlocked);
}

/// The error message prefers the parsed error field over the raw body
#[tokio::test]
async fn test_error_field_preferred_over_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/trigger_deploy"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "error": "workflow dispatch failed", "detail": "x" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut session = unlocked_session();

    let err = client
        .trigger_deploy(&mut session, "backend")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("workflow dispatch failed"));
}

/// An empty error body falls back to the canonical status reason
#[tokio::test]
async fn test_empty_error_body_uses_status_reason() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/list_files"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut session = unlocked_session();

    let err = client.list_files(&mut session).await.unwrap_err();
    assert!(err.to_string().contains("Service Unavailable"));
}

/// Query parameters are sent in the URL
#[tokio::test]
async fn test_logs_query_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get_logs"))
        .and(query_param("source", "backend"))
        .and(query_param("limit", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "logs": ["one"] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut session = unlocked_session();

    let view = client.logs(&mut session, "backend", 25).await.unwrap();
    assert_eq!(view, ecko::backend::LogsView::Entries(vec!["one".to_string()]));
}
