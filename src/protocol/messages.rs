use serde::{Deserialize, Serialize};

use crate::status::Status;

/// Raw header pairs, name then value.
pub type Headers = Vec<(Vec<u8>, Vec<u8>)>;

/// Declared type of an exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Scope {
    Lifespan,
    Http(HttpScope),
    Websocket(HttpScope),
    /// Any `type` this application does not know about.
    #[serde(other)]
    Unknown,
}

impl Scope {
    pub fn kind(&self) -> &'static str {
        match self {
            Scope::Lifespan => "lifespan",
            Scope::Http(_) => "http",
            Scope::Websocket(_) => "websocket",
            Scope::Unknown => "unknown",
        }
    }
}

/// Request line and headers of a request-scoped exchange.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HttpScope {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub query_string: String,
    #[serde(default)]
    pub headers: Headers,
}

/// Host → application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Inbound {
    #[serde(rename = "lifespan.startup")]
    Startup,
    #[serde(rename = "lifespan.shutdown")]
    Shutdown,
    #[serde(rename = "http.request")]
    Request {
        #[serde(default)]
        body: Vec<u8>,
        #[serde(default)]
        more_body: bool,
    },
}

impl Inbound {
    pub fn kind(&self) -> &'static str {
        match self {
            Inbound::Startup => "lifespan.startup",
            Inbound::Shutdown => "lifespan.shutdown",
            Inbound::Request { .. } => "http.request",
        }
    }
}

/// Application → host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Outbound {
    #[serde(rename = "lifespan.startup.complete")]
    StartupComplete,
    #[serde(rename = "lifespan.shutdown.complete")]
    ShutdownComplete,
    #[serde(rename = "http.response.start")]
    ResponseStart { status: Status, headers: Headers },
    #[serde(rename = "http.response.body")]
    ResponseBody {
        body: Vec<u8>,
        #[serde(default)]
        more_body: bool,
    },
}

impl Outbound {
    pub fn kind(&self) -> &'static str {
        match self {
            Outbound::StartupComplete => "lifespan.startup.complete",
            Outbound::ShutdownComplete => "lifespan.shutdown.complete",
            Outbound::ResponseStart { .. } => "http.response.start",
            Outbound::ResponseBody { .. } => "http.response.body",
        }
    }
}
