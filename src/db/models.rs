use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row of the `users` relation. `password` holds the digest, never the secret.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbUser {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
