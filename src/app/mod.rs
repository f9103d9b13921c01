//! Application entry point: dispatches each exchange to its handler.

mod http;
mod lifespan;

use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

use crate::db::{Database, LogSink, SeedSink};
use crate::error::PocketError;
use crate::protocol::{Exchange, Scope};

pub use http::{RESPONSE_BODY, RESPONSE_CONTENT_TYPE};

/// Lifecycle of the application. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    NotStarted,
    Running,
    Stopped,
}

pub struct App {
    database: Arc<Database>,
    sink: Arc<dyn SeedSink>,
    state: watch::Sender<LifecycleState>,
}

impl App {
    /// App that discloses the seed credential through the log.
    pub fn new(database: Arc<Database>) -> Self {
        Self::with_sink(database, Arc::new(LogSink))
    }

    pub fn with_sink(database: Arc<Database>, sink: Arc<dyn SeedSink>) -> Self {
        let (state, _) = watch::channel(LifecycleState::NotStarted);
        Self {
            database,
            sink,
            state,
        }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.database
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions, e.g. to hold requests until startup completes.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    fn set_state(&self, next: LifecycleState) {
        self.state.send_replace(next);
    }

    /// Serve one exchange until its handler is done with it.
    pub async fn call(&self, scope: Scope, exchange: Exchange) -> Result<(), PocketError> {
        match scope {
            Scope::Lifespan => lifespan::run(self, exchange).await,
            Scope::Http(request) => http::respond(self, &request, exchange).await,
            other @ (Scope::Websocket(_) | Scope::Unknown) => {
                warn!(scope = other.kind(), "rejecting unsupported scope");
                Err(PocketError::UnsupportedScope(other.kind().to_string()))
            }
        }
    }
}
