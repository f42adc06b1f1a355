// src/wallet/key_management.rs
//! Issuer key handling and certificate signing.
//!
//! Signatures are secp256k1 ECDSA over the Ethereum personal-message digest
//! (`keccak256("\x19Ethereum Signed Message:\n" || len || message)`), so that
//! `recover(signature, message)` yields the issuer's wallet address. This is
//! the convention wallets use for `personal_sign` and the one already-issued
//! certificates were signed with.
//!
//! Uses the following cryptographic primitives:
//! - secp256k1 curve (via `k256` crate)
//! - EIP-191 message hashing and recoverable signatures (via `ethers`)
//! - Cryptographically secure random number generation for ephemeral keys

use crate::error::SigningError;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Signature};
use ethers::utils::{hash_message, hex, to_checksum};
use k256::ecdsa::SigningKey;
use std::fmt;

/// Where a [`KeyManager`]'s key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Key material supplied for a known issuer.
    Issuer,
    /// Throwaway key generated because no issuer key was available.
    Ephemeral,
}

/// A 65-byte recoverable signature (r || s || v, v in {27, 28}).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerSignature(Signature);

impl IssuerSignature {
    pub fn inner(&self) -> &Signature {
        &self.0
    }
}

impl fmt::Display for IssuerSignature {
    /// `0x`-prefixed lowercase hex, the stored form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(<[u8; 65]>::from(&self.0)))
    }
}

/// Holds one secp256k1 signing key.
///
/// # Security Notes
/// - Secret keys are never exposed publicly
/// - Uses deterministic ECDSA (RFC 6979), so re-signing identical bytes with
///   the same key yields the identical signature
#[derive(Clone)]
pub struct KeyManager {
    wallet: LocalWallet,
    origin: KeyOrigin,
}

impl fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyManager")
            .field("address", &self.identity())
            .field("origin", &self.origin)
            .finish()
    }
}

impl KeyManager {
    /// Loads an issuer key from raw 32-byte scalar material.
    ///
    /// # Errors
    /// `SigningError::MalformedKey` if the bytes are empty, the wrong length,
    /// zero, or not below the curve order.
    pub fn from_private_key(private_key: &[u8]) -> Result<Self, SigningError> {
        if private_key.is_empty() {
            return Err(SigningError::MalformedKey("key material is empty".into()));
        }
        if private_key.len() != 32 {
            return Err(SigningError::MalformedKey(format!(
                "expected 32 bytes, got {}",
                private_key.len()
            )));
        }
        let signing_key =
            SigningKey::from_slice(private_key).map_err(|e| SigningError::MalformedKey(e.to_string()))?;
        Ok(KeyManager {
            wallet: LocalWallet::from(signing_key),
            origin: KeyOrigin::Issuer,
        })
    }

    /// Generates a fresh, unassociated key for unauthenticated demo issuance.
    pub fn ephemeral() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        KeyManager {
            wallet: LocalWallet::from(signing_key),
            origin: KeyOrigin::Ephemeral,
        }
    }

    pub fn origin(&self) -> KeyOrigin {
        self.origin
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// EIP-55 checksummed address of this key.
    pub fn identity(&self) -> String {
        to_checksum(&self.wallet.address(), None)
    }

    /// Signs a message with the personal-message prefix.
    ///
    /// # Arguments
    /// * `message` - Raw message bytes (the canonical payload)
    ///
    /// # Process Flow
    /// 1. Prefixes and hashes the message (EIP-191)
    /// 2. Signs the digest with recoverable ECDSA
    pub fn sign_message(&self, message: &[u8]) -> Result<IssuerSignature, SigningError> {
        let digest = hash_message(message);
        self.wallet
            .sign_hash(digest)
            .map(IssuerSignature)
            .map_err(|e| SigningError::Signer(e.to_string()))
    }
}

/// Signs `message` with `private_key` in a single step.
///
/// # Errors
/// `SigningError::MalformedKey` for missing or invalid key material.
pub fn sign(message: &[u8], private_key: &[u8]) -> Result<IssuerSignature, SigningError> {
    KeyManager::from_private_key(private_key)?.sign_message(message)
}

/// Checksummed address belonging to `private_key`.
pub fn public_identity(private_key: &[u8]) -> Result<String, SigningError> {
    Ok(KeyManager::from_private_key(private_key)?.identity())
}
