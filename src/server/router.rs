use axum::{
    Router,
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use super::lifespan::failure;
use crate::app::{App, LifecycleState};
use crate::error::PocketError;
use crate::protocol::{self, HttpScope, Inbound, Outbound, Scope};

/// Upper bound on buffered request bodies.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct PocketState {
    app: Arc<App>,
    lifecycle: watch::Receiver<LifecycleState>,
}

impl PocketState {
    pub fn new(app: Arc<App>) -> Self {
        let lifecycle = app.subscribe();
        Self { app, lifecycle }
    }

    fn running(&self) -> bool {
        *self.lifecycle.borrow() == LifecycleState::Running
    }
}

/// Every path and method is forwarded to the application as a request exchange.
pub fn pocket_router(state: PocketState) -> Router {
    Router::new().fallback(forward).with_state(state)
}

async fn forward(
    State(state): State<PocketState>,
    request: Request,
) -> Result<Response, PocketError> {
    // No request exchange is opened outside the running state.
    if !state.running() {
        debug!(path = %request.uri().path(), "request held back before startup");
        return Err(PocketError::NotStarted);
    }

    let (parts, body) = request.into_parts();
    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| PocketError::protocol("http", format!("failed to read body: {e}")))?;

    let scope = HttpScope {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query_string: parts.uri.query().unwrap_or_default().to_string(),
        headers: parts
            .headers
            .iter()
            .map(|(k, v)| (k.as_str().as_bytes().to_vec(), v.as_bytes().to_vec()))
            .collect(),
    };
    debug!(method = %scope.method, path = %scope.path, "forwarding request");

    let (exchange, mut peer) = protocol::channel(4);
    // Buffered before the handler runs, so a handler that never reads is fine.
    peer.send(Inbound::Request {
        body: body.to_vec(),
        more_body: false,
    })
    .await?;

    let app = state.app.clone();
    let task = tokio::spawn(async move { app.call(Scope::Http(scope), exchange).await });

    let mut status = None;
    let mut headers = HeaderMap::new();
    let mut payload = Vec::new();
    while let Some(message) = peer.receive().await {
        match message {
            Outbound::ResponseStart {
                status: s,
                headers: h,
            } => {
                status = Some(s);
                for (name, value) in h {
                    let name = HeaderName::from_bytes(&name)
                        .map_err(|e| PocketError::protocol("http", e.to_string()))?;
                    let value = HeaderValue::from_bytes(&value)
                        .map_err(|e| PocketError::protocol("http", e.to_string()))?;
                    headers.append(name, value);
                }
            }
            Outbound::ResponseBody { body, more_body } => {
                payload.extend_from_slice(&body);
                if !more_body {
                    break;
                }
            }
            other => {
                return Err(PocketError::protocol(
                    "http",
                    format!("unexpected {} message", other.kind()),
                ));
            }
        }
    }

    let Some(status) = status else {
        return Err(failure(task).await);
    };
    task.await??;

    let status = StatusCode::from_u16(status.as_u16())
        .map_err(|e| PocketError::protocol("http", e.to_string()))?;
    let mut response = Response::new(Body::from(payload));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
