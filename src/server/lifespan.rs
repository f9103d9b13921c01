use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::app::App;
use crate::error::PocketError;
use crate::protocol::{self, Inbound, Outbound, Peer, Scope};

/// Host end of the long-lived lifecycle exchange.
pub struct Lifespan {
    peer: Peer,
    task: JoinHandle<Result<(), PocketError>>,
}

impl Lifespan {
    /// Open the lifecycle exchange and wait for `lifespan.startup.complete`.
    ///
    /// When the application fails to start, its error is returned here.
    pub async fn start(app: Arc<App>) -> Result<Self, PocketError> {
        let (exchange, mut peer) = protocol::channel(4);
        let task = tokio::spawn(async move { app.call(Scope::Lifespan, exchange).await });

        peer.send(Inbound::Startup).await?;
        match peer.receive().await {
            Some(Outbound::StartupComplete) => {
                info!("application startup acknowledged");
                Ok(Self { peer, task })
            }
            Some(other) => Err(PocketError::protocol(
                "lifespan",
                format!("expected lifespan.startup.complete, got {}", other.kind()),
            )),
            None => Err(failure(task).await),
        }
    }

    /// Send `lifespan.shutdown` and wait for the acknowledgment.
    pub async fn shutdown(mut self) -> Result<(), PocketError> {
        self.peer.send(Inbound::Shutdown).await?;
        match self.peer.receive().await {
            Some(Outbound::ShutdownComplete) => {
                self.task.await??;
                info!("application shutdown acknowledged");
                Ok(())
            }
            Some(other) => Err(PocketError::protocol(
                "lifespan",
                format!("expected lifespan.shutdown.complete, got {}", other.kind()),
            )),
            None => Err(failure(self.task).await),
        }
    }
}

/// Error of an application task that hung up without acknowledging.
pub(crate) async fn failure(task: JoinHandle<Result<(), PocketError>>) -> PocketError {
    match task.await {
        Ok(Err(e)) => e,
        Ok(Ok(())) => PocketError::ExchangeClosed,
        Err(e) => PocketError::Task(e),
    }
}
