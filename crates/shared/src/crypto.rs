//! Hashing helpers for admin keys.
//!
//! Admin keys are never stored in configuration in plain text; only their
//! SHA-256 digests are. Incoming keys are hashed and compared against the
//! configured digests.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a lowercase hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns true if `key` hashes to one of `allowed_hashes`.
///
/// Digests are compared case-insensitively and in constant time with respect
/// to their contents.
pub fn key_matches_any(key: &str, allowed_hashes: &[String]) -> bool {
    if key.is_empty() {
        return false;
    }
    let digest = sha256_hex(key);
    allowed_hashes
        .iter()
        .any(|allowed| constant_time_eq(digest.as_bytes(), allowed.to_ascii_lowercase().as_bytes()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
