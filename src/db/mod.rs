//! Database module: storage handle, schema and seed credential.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for the fixed relation set (SQLite-first)
//! - `seed.rs`: seed credential generation and the disclosure sink
//! - `sqlite.rs`: the `Database` handle and the bootstrap routine

pub mod models;
pub mod schema;
pub mod seed;
pub mod sqlite;

pub use models::DbUser;
pub use schema::{SQLITE_INIT, TABLES};
pub use seed::{LogSink, SeedCredential, SeedSink, hash_secret, verify_secret};
pub use sqlite::{Bootstrap, Database, SqlitePool};
