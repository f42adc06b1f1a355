// src/utils/crypto.rs
//! Cryptographic utilities optimized for blockchain compatibility.
//!
//! Uses Keccak-256 (Ethereum's standard hash function) over the raw canonical
//! bytes. No message prefix is applied here; the personal-message prefix only
//! enters at signing time (see [`crate::wallet::key_management`]).

use ethers::utils::{hex, keccak256};
use std::fmt;
use std::str::FromStr;

/// Fixed-size Keccak-256 digest of a canonical payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegrityHash([u8; 32]);

impl IntegrityHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for IntegrityHash {
    /// Lowercase hex with a `0x` prefix, the stored form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Error parsing a stored hash string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidHash(pub String);

impl fmt::Display for InvalidHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid integrity hash: {}", self.0)
    }
}

impl std::error::Error for InvalidHash {}

impl FromStr for IntegrityHash {
    type Err = InvalidHash;

    /// Accepts 64 hex digits, with or without `0x`, in either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|e| InvalidHash(e.to_string()))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| InvalidHash(format!("expected 32 bytes, got {}", b.len())))?;
        Ok(IntegrityHash(array))
    }
}

/// Computes a Keccak-256 hash of the input data (Ethereum-compatible).
///
/// # Arguments
/// * `data` - Binary data to hash (as bytes slice)
///
/// # Returns
/// [`IntegrityHash`] wrapping the 32-byte digest.
pub fn digest(data: &[u8]) -> IntegrityHash {
    IntegrityHash(keccak256(data))
}
