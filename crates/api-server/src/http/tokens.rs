use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Tokens are opaque to clients; only SHA-256 digests are persisted, so a
/// leaked auth_sessions row cannot be replayed as a bearer token.
pub(super) fn hash_token(value: &str) -> Vec<u8> {
    Sha256::digest(value.as_bytes()).to_vec()
}

pub(super) fn generate_access_token() -> String {
    generate_token("sh_at")
}

pub(super) fn generate_refresh_token() -> String {
    generate_token("sh_rt")
}

fn generate_token(prefix: &str) -> String {
    format!(
        "{prefix}_{}_{}",
        Uuid::new_v4().as_simple(),
        Uuid::new_v4().as_simple()
    )
}
