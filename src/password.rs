//! Password Hashing
//! Mission: One-way hashing and verification of account passwords

use anyhow::{Context, Result};
use bcrypt::{hash, verify};

/// bcrypt work factor. Matches the cost the stored hashes were created with.
const HASH_COST: u32 = 10;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(plaintext: &str) -> Result<String> {
    hash(plaintext, HASH_COST).context("Failed to hash password")
}

/// Check a plaintext password against a stored digest.
pub fn verify_password(plaintext: &str, digest: &str) -> Result<bool> {
    verify(plaintext, digest).context("Failed to verify password")
}
