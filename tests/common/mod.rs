#![allow(dead_code)]

use pocket::db::{Database, SeedCredential, SeedSink};
use std::sync::Mutex;
use tempfile::TempDir;

pub const SEED_USERNAME: &str = "username";

/// Fresh database file inside its own temporary directory.
pub fn temp_database() -> (TempDir, Database) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let url = format!("sqlite:{}", dir.path().join("pocket.sqlite3").display());
    let db = Database::new(&url, SEED_USERNAME).expect("invalid database url");
    (dir, db)
}

/// Sink that keeps every disclosed credential for inspection.
#[derive(Default)]
pub struct CaptureSink(Mutex<Vec<SeedCredential>>);

impl CaptureSink {
    pub fn seeds(&self) -> Vec<SeedCredential> {
        self.0.lock().expect("sink poisoned").clone()
    }
}

impl SeedSink for CaptureSink {
    fn disclose(&self, seed: &SeedCredential) {
        self.0.lock().expect("sink poisoned").push(seed.clone());
    }
}
