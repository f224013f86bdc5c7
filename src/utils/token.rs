//! Password-reset token generation and hashing.
//!
//! Only the SHA-256 hex digest of a token is ever stored; the raw token
//! leaves the server exactly once, inside the reset email.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a 32-byte random token, hex-encoded.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// One-way hash of a raw token, as stored in `password_reset_tokens`.
pub fn hash_reset_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}
