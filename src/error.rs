// src/error.rs
//! Error taxonomy for the certificate integrity engine.
//!
//! Issuance-time failures (`EncodingError`, `SigningError`, `LifecycleError`)
//! are fatal and abort the claim before anything is persisted. Verification
//! never produces these; a tampered or unsigned certificate is a normal
//! negative result, see [`crate::models::verification`].

use crate::models::lifecycle::LifecycleState;
use thiserror::Error;

/// A certificate field could not be given a canonical byte encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The value type has no canonical encoding (e.g. `null`, arrays).
    #[error("field `{path}` has unsupported type `{kind}`")]
    UnsupportedValue { path: String, kind: &'static str },

    /// NaN and infinities have no JSON representation.
    #[error("field `{path}` holds a non-finite number")]
    NonFiniteNumber { path: String },

    /// Custom fields must arrive as a JSON object.
    #[error("custom fields must be a JSON object, got `{kind}`")]
    NotAnObject { kind: &'static str },

    /// The JSON writer itself failed.
    #[error("canonical encoder failed: {0}")]
    Emit(String),
}

/// Issuer key material was missing, malformed, or did not match the issuer.
#[derive(Debug, Error)]
pub enum SigningError {
    /// No private key was supplied and the unauthenticated fallback is disabled.
    #[error("no signing key configured for issuer `{issuer}`")]
    MissingKey { issuer: String },

    /// The private key bytes are not a valid secp256k1 scalar.
    #[error("malformed private key: {0}")]
    MalformedKey(String),

    /// The key signs for a different address than the issuer declared.
    #[error("signing key belongs to {derived}, issuer declared {declared}")]
    IdentityMismatch { declared: String, derived: String },

    /// The underlying signer rejected the digest.
    #[error("signer failure: {0}")]
    Signer(String),
}

/// An out-of-order lifecycle transition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("cannot {action} a certificate in state `{from}`")]
    InvalidTransition {
        from: LifecycleState,
        action: &'static str,
    },
}

/// Record store backend failure (not the same thing as a lookup miss).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Backend(String),

    #[error("record could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum KeyProviderError {
    #[error("key provider unavailable: {0}")]
    Backend(String),
}

/// Minting collaborator failure. Recorded on the certificate as a failed
/// mint rather than propagated.
#[derive(Debug, Error)]
pub enum MintError {
    #[error("minting request rejected: {0}")]
    Rejected(String),

    #[error("minting service unreachable: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit log append failed: {0}")]
    Append(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),

    #[error("trust threshold must be between 0 and 100, got {0}")]
    ThresholdOutOfRange(u32),

    #[error("issuer private key is not valid hex: {0}")]
    InvalidIssuerKey(String),
}

/// Everything that aborts a claim/mint flow.
#[derive(Debug, Error)]
pub enum IssuanceError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    KeyProvider(#[from] KeyProviderError),

    #[error("issuer `{0}` is not configured")]
    UnknownIssuer(String),

    #[error("certificate `{0}` not found")]
    NotFound(String),
}
