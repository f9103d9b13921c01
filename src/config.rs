use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::PocketError;

/// Process-wide configuration, resolved once from defaults and `POCKET_*` env vars.
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::load().unwrap_or_else(|e| panic!("FATAL: invalid configuration: {e}"))
});

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// SQLite connection string, e.g. `sqlite:db.sqlite3`.
    pub database_url: String,
    pub loglevel: String,
    pub listen_addr: String,
    /// Username of the seeded default credential.
    pub seed_username: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:db.sqlite3".to_string(),
            loglevel: "info".to_string(),
            listen_addr: "127.0.0.1:8000".to_string(),
            seed_username: "username".to_string(),
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed("POCKET_"))
    }

    pub fn load() -> Result<Self, PocketError> {
        Ok(Self::figment().extract()?)
    }
}
