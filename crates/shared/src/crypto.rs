//! Admin session tokens.
//!
//! Tokens handed to the admin console are random and opaque. Only their SHA-256
//! digest is persisted, so a leaked sessions table cannot be replayed.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes in a session token (hex-encoded to 64 chars).
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Computes SHA-256 of the input and returns it as lowercase hex.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a fresh opaque session token.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
