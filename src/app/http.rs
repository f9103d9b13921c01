use tracing::debug;

use super::{App, LifecycleState};
use crate::error::PocketError;
use crate::protocol::{Exchange, HttpScope, Outbound};
use crate::status::Status;

pub const RESPONSE_CONTENT_TYPE: &str = "text/plain";
pub const RESPONSE_BODY: &[u8] = b"body";

/// Placeholder responder: every request gets `200 text/plain "body"`.
/// Method, path, headers and body are not inspected.
pub(super) async fn respond(
    app: &App,
    request: &HttpScope,
    exchange: Exchange,
) -> Result<(), PocketError> {
    if app.state() != LifecycleState::Running {
        debug!(path = %request.path, "request refused before startup");
        return Err(PocketError::NotStarted);
    }
    debug!(method = %request.method, path = %request.path, "request");

    exchange
        .send(Outbound::ResponseStart {
            status: Status::OK,
            headers: vec![(
                b"content-type".to_vec(),
                RESPONSE_CONTENT_TYPE.as_bytes().to_vec(),
            )],
        })
        .await?;
    exchange
        .send(Outbound::ResponseBody {
            body: RESPONSE_BODY.to_vec(),
            more_body: false,
        })
        .await
}
