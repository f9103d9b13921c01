use tracing::{error, info};

use super::{App, LifecycleState};
use crate::error::PocketError;
use crate::protocol::{Exchange, Inbound, Outbound};

const SCOPE: &str = "lifespan";

/// Drive the lifecycle exchange until shutdown.
///
/// Startup runs the storage bootstrap to completion before acknowledging; a
/// failed bootstrap returns the error without any acknowledgment.
pub(super) async fn run(app: &App, mut exchange: Exchange) -> Result<(), PocketError> {
    loop {
        match exchange.receive().await? {
            Inbound::Startup => {
                if app.state() != LifecycleState::NotStarted {
                    return Err(PocketError::protocol(SCOPE, "duplicate lifespan.startup"));
                }
                let outcome = app
                    .database()
                    .ensure_initialized(app.sink.as_ref())
                    .await
                    .inspect_err(|e| error!(error = %e, "startup failed"))?;
                app.set_state(LifecycleState::Running);
                if let Err(e) = exchange.send(Outbound::StartupComplete).await {
                    // Unacknowledged startup is a failed launch.
                    app.database().close().await;
                    app.set_state(LifecycleState::NotStarted);
                    error!(error = %e, "startup acknowledgment not delivered");
                    return Err(e);
                }
                info!(?outcome, "startup complete");
            }
            Inbound::Shutdown => {
                app.database().close().await;
                app.set_state(LifecycleState::Stopped);
                info!("shutdown complete");
                exchange.send(Outbound::ShutdownComplete).await?;
                return Ok(());
            }
            other => {
                return Err(PocketError::protocol(
                    SCOPE,
                    format!("unexpected {} message", other.kind()),
                ));
            }
        }
    }
}
