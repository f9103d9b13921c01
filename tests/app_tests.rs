mod common;

use common::{CaptureSink, SEED_USERNAME, temp_database};
use pocket::protocol::{self, Exchange, HttpScope, Inbound, Outbound, Peer, Scope};
use pocket::{App, Database, LifecycleState, PocketError, Status};
use std::sync::Arc;
use tokio::task::JoinHandle;

fn app_for(db: Database) -> Arc<App> {
    Arc::new(App::with_sink(Arc::new(db), Arc::new(CaptureSink::default())))
}

fn spawn_scope(app: &Arc<App>, scope: Scope) -> (Peer, JoinHandle<Result<(), PocketError>>) {
    let (exchange, peer) = protocol::channel(4);
    let app = app.clone();
    let task = tokio::spawn(async move { app.call(scope, exchange).await });
    (peer, task)
}

fn get(path: &str) -> Scope {
    Scope::Http(HttpScope {
        method: "GET".to_string(),
        path: path.to_string(),
        ..Default::default()
    })
}

async fn started(app: &Arc<App>) -> (Peer, JoinHandle<Result<(), PocketError>>) {
    let (mut peer, task) = spawn_scope(app, Scope::Lifespan);
    peer.send(Inbound::Startup).await.expect("send startup failed");
    assert_eq!(peer.receive().await, Some(Outbound::StartupComplete));
    (peer, task)
}

async fn collect(app: &Arc<App>, scope: Scope, body: &[u8]) -> (Result<(), PocketError>, Vec<Outbound>) {
    let (exchange, mut peer): (Exchange, Peer) = protocol::channel(4);
    peer.send(Inbound::Request {
        body: body.to_vec(),
        more_body: false,
    })
    .await
    .expect("send request failed");
    let result = app.call(scope, exchange).await;

    let mut messages = Vec::new();
    while let Some(message) = peer.receive().await {
        messages.push(message);
    }
    (result, messages)
}

#[tokio::test]
async fn startup_acknowledged_only_after_bootstrap() {
    let (_dir, db) = temp_database();
    let app = app_for(db);
    assert_eq!(app.state(), LifecycleState::NotStarted);

    let (mut peer, task) = started(&app).await;

    assert_eq!(app.state(), LifecycleState::Running);
    assert_eq!(app.database().table_count().await.expect("count failed"), 4);
    let users = app.database().users().await.expect("list users failed");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, SEED_USERNAME);

    peer.send(Inbound::Shutdown).await.expect("send shutdown failed");
    assert_eq!(peer.receive().await, Some(Outbound::ShutdownComplete));
    task.await.expect("lifespan task panicked").expect("lifespan failed");
}

#[tokio::test]
async fn shutdown_closes_storage_handle() {
    let (_dir, db) = temp_database();
    let app = app_for(db);
    let (mut peer, task) = started(&app).await;

    peer.send(Inbound::Shutdown).await.expect("send shutdown failed");
    assert_eq!(peer.receive().await, Some(Outbound::ShutdownComplete));
    assert_eq!(peer.receive().await, None, "lifespan loop exits after shutdown");
    task.await.expect("lifespan task panicked").expect("lifespan failed");

    assert_eq!(app.state(), LifecycleState::Stopped);
    assert!(!app.database().is_open().await);
    assert!(matches!(
        app.database().users().await,
        Err(PocketError::StorageClosed)
    ));
}

#[tokio::test]
async fn every_request_gets_the_fixed_response() {
    let (_dir, db) = temp_database();
    let app = app_for(db);
    let _lifespan = started(&app).await;

    let post = Scope::Http(HttpScope {
        method: "POST".to_string(),
        path: "/orders/42".to_string(),
        query_string: "expand=items".to_string(),
        headers: vec![(b"content-type".to_vec(), b"application/json".to_vec())],
    });

    for (scope, body) in [(get("/anything"), &b""[..]), (post, &br#"{"id":1}"#[..])] {
        let (result, messages) = collect(&app, scope, body).await;
        result.expect("request failed");
        assert_eq!(
            messages,
            vec![
                Outbound::ResponseStart {
                    status: Status::OK,
                    headers: vec![(b"content-type".to_vec(), b"text/plain".to_vec())],
                },
                Outbound::ResponseBody {
                    body: b"body".to_vec(),
                    more_body: false,
                },
            ]
        );
    }
}

#[tokio::test]
async fn request_before_startup_is_not_served() {
    let (_dir, db) = temp_database();
    let app = app_for(db);

    let (result, messages) = collect(&app, get("/"), b"").await;

    assert!(matches!(result, Err(PocketError::NotStarted)));
    assert!(messages.is_empty());
    assert!(!app.database().is_open().await);
}

#[tokio::test]
async fn request_after_shutdown_is_not_served() {
    let (_dir, db) = temp_database();
    let app = app_for(db);
    let (mut peer, task) = started(&app).await;
    peer.send(Inbound::Shutdown).await.expect("send shutdown failed");
    assert_eq!(peer.receive().await, Some(Outbound::ShutdownComplete));
    task.await.expect("lifespan task panicked").expect("lifespan failed");

    let (result, messages) = collect(&app, get("/"), b"").await;
    assert!(matches!(result, Err(PocketError::NotStarted)));
    assert!(messages.is_empty());
}

#[tokio::test]
async fn failed_bootstrap_sends_no_acknowledgment() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("missing").join("pocket.sqlite3");
    let db = Database::new(&format!("sqlite:{}", path.display()), SEED_USERNAME)
        .expect("invalid database url");
    let app = app_for(db);

    let (mut peer, task) = spawn_scope(&app, Scope::Lifespan);
    peer.send(Inbound::Startup).await.expect("send startup failed");

    assert_eq!(peer.receive().await, None);
    let result = task.await.expect("lifespan task panicked");
    assert!(matches!(result, Err(PocketError::Database(_))));
    assert_eq!(app.state(), LifecycleState::NotStarted);
}

#[tokio::test]
async fn undelivered_startup_ack_leaves_app_not_started() {
    let (_dir, db) = temp_database();
    let app = app_for(db);

    let (exchange, peer) = protocol::channel(4);
    peer.send(Inbound::Startup).await.expect("send startup failed");
    drop(peer);

    let result = app.call(Scope::Lifespan, exchange).await;

    assert!(matches!(result, Err(PocketError::ExchangeClosed)));
    assert_eq!(app.state(), LifecycleState::NotStarted);
    assert!(!app.database().is_open().await);

    let (result, messages) = collect(&app, get("/"), b"").await;
    assert!(matches!(result, Err(PocketError::NotStarted)));
    assert!(messages.is_empty());
}

#[tokio::test]
async fn unexpected_lifespan_message_is_a_protocol_violation() {
    let (_dir, db) = temp_database();
    let app = app_for(db);

    let (peer, task) = spawn_scope(&app, Scope::Lifespan);
    peer.send(Inbound::Request {
        body: Vec::new(),
        more_body: false,
    })
    .await
    .expect("send failed");

    let err = task
        .await
        .expect("lifespan task panicked")
        .expect_err("request message must be rejected");
    assert!(matches!(
        err,
        PocketError::ProtocolViolation {
            scope: "lifespan",
            ..
        }
    ));
}

#[tokio::test]
async fn duplicate_startup_is_a_protocol_violation() {
    let (_dir, db) = temp_database();
    let app = app_for(db);
    let (peer, task) = started(&app).await;

    peer.send(Inbound::Startup).await.expect("send startup failed");

    let err = task
        .await
        .expect("lifespan task panicked")
        .expect_err("second startup must be rejected");
    assert!(matches!(err, PocketError::ProtocolViolation { .. }));
}

#[tokio::test]
async fn lifespan_exchange_closed_before_shutdown() {
    let (_dir, db) = temp_database();
    let app = app_for(db);
    let (peer, task) = started(&app).await;

    drop(peer);

    let result = task.await.expect("lifespan task panicked");
    assert!(matches!(result, Err(PocketError::ExchangeClosed)));
}

#[tokio::test]
async fn unsupported_scopes_are_rejected() {
    let (_dir, db) = temp_database();
    let app = app_for(db);
    let _lifespan = started(&app).await;

    let websocket = Scope::Websocket(HttpScope {
        method: "GET".to_string(),
        path: "/ws".to_string(),
        ..Default::default()
    });
    for (scope, kind) in [(websocket, "websocket"), (Scope::Unknown, "unknown")] {
        let (result, messages) = collect(&app, scope, b"").await;
        match result {
            Err(PocketError::UnsupportedScope(name)) => assert_eq!(name, kind),
            other => panic!("expected UnsupportedScope, got {other:?}"),
        }
        assert!(messages.is_empty());
    }
}

#[test]
fn unknown_scope_type_decodes_to_error_arm() {
    let scope: Scope =
        serde_json::from_str(r#"{"type":"webtransport"}"#).expect("decode scope failed");
    assert_eq!(scope, Scope::Unknown);

    let scope: Scope = serde_json::from_str(r#"{"type":"lifespan"}"#).expect("decode scope failed");
    assert_eq!(scope, Scope::Lifespan);

    let scope: Scope = serde_json::from_str(r#"{"type":"http","method":"GET","path":"/"}"#)
        .expect("decode scope failed");
    assert_eq!(scope, get("/"));
}

#[test]
fn messages_use_dotted_type_tags() {
    let start = serde_json::to_value(Outbound::ResponseStart {
        status: Status::OK,
        headers: Vec::new(),
    })
    .expect("encode failed");
    assert_eq!(start["type"], "http.response.start");
    assert_eq!(start["status"], 200);

    let inbound: Inbound =
        serde_json::from_str(r#"{"type":"lifespan.shutdown"}"#).expect("decode failed");
    assert_eq!(inbound, Inbound::Shutdown);
}
