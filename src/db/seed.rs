use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

/// Default credential created by a full bootstrap. The raw secret only lives
/// here; storage receives [`SeedCredential::digest`].
#[derive(Debug, Clone)]
pub struct SeedCredential {
    pub username: String,
    pub secret: String,
}

impl SeedCredential {
    /// Fresh credential with a random UUIDv4 secret.
    pub fn generate(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: Uuid::new_v4().to_string(),
        }
    }

    pub fn digest(&self) -> String {
        hash_secret(&self.secret)
    }
}

/// Lowercase hex SHA-256 of the secret.
pub fn hash_secret(secret: &str) -> String {
    format!("{:x}", Sha256::digest(secret.as_bytes()))
}

/// Compare a candidate secret with a stored digest by rehashing it.
pub fn verify_secret(secret: &str, digest: &str) -> bool {
    hash_secret(secret).eq_ignore_ascii_case(digest)
}

/// Destination for the one-time disclosure of a freshly seeded credential.
pub trait SeedSink: Send + Sync {
    fn disclose(&self, seed: &SeedCredential);
}

/// Writes the credential to the operational log at WARN.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl SeedSink for LogSink {
    fn disclose(&self, seed: &SeedCredential) {
        warn!("USERNAME : {}", seed.username);
        warn!("PASSWORD : {}", seed.secret);
    }
}
