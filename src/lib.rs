pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod protocol;
pub mod server;
pub mod status;

pub use app::{App, LifecycleState};
pub use db::Database;
pub use error::PocketError;
pub use status::Status;
