//! Host side: runs the application behind an HTTP listener.

pub mod lifespan;
pub mod router;

pub use lifespan::Lifespan;
pub use router::{PocketState, pocket_router};
