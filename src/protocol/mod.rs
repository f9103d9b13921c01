//! Message protocol between the host server and the application.
//!
//! Every exchange is opened for a [`Scope`]; the host then delivers
//! [`Inbound`] messages and the application answers with [`Outbound`] ones.
//! Message names follow the dotted `type` tags used on the wire.

pub mod exchange;
pub mod messages;

pub use exchange::{Exchange, Peer, channel};
pub use messages::{Headers, HttpScope, Inbound, Outbound, Scope};
