// src/services/verifier.rs
//! Issuer signature verification.
//!
//! Recovers the signing address from `(message, signature)` using the same
//! personal-message convention the issuer signed with, then compares it to the
//! claimed identity case-insensitively. Malformed input is an ordinary
//! negative outcome; nothing here returns an error or panics on bad data.
//!
//! The verifier is stateless and works on the bytes it is given. Callers are
//! responsible for re-deriving the canonical payload from the stored record.

use ethers::types::{Address, Signature};
use ethers::utils::{hex, to_checksum};

/// Why a signature did or did not verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureCheck {
    /// Recovered address equals the claimed identity.
    Valid { signer: Address },
    /// Well-formed signature, but it recovers to someone else.
    Mismatch { recovered: Address },
    /// The signature could not be decoded or recovered at all.
    Malformed(String),
}

impl SignatureCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, SignatureCheck::Valid { .. })
    }

    /// Short human-readable explanation.
    pub fn describe(&self) -> String {
        match self {
            SignatureCheck::Valid { signer } => {
                format!("Signature recovers to issuer {}", to_checksum(signer, None))
            }
            SignatureCheck::Mismatch { recovered } => format!(
                "Signature recovers to {}, not the declared issuer",
                to_checksum(recovered, None)
            ),
            SignatureCheck::Malformed(reason) => format!("Signature is malformed: {}", reason),
        }
    }
}

/// Decodes a stored `0x`-prefixed (or bare) 65-byte hex signature.
pub fn parse_signature(signature: &str) -> Result<Signature, String> {
    let digits = strip_hex_prefix(signature);
    if digits.is_empty() {
        return Err("signature is empty".into());
    }
    let bytes = hex::decode(digits).map_err(|e| e.to_string())?;
    Signature::try_from(bytes.as_slice()).map_err(|e| e.to_string())
}

/// Recovers the address that signed `message`.
pub fn recover_signer(message: &[u8], signature: &str) -> Result<Address, String> {
    let signature = parse_signature(signature)?;
    signature.recover(message).map_err(|e| e.to_string())
}

/// Checks `signature` over `message` against `claimed_identity`.
///
/// # Arguments
/// * `message` - Exact bytes that were signed (canonical payload)
/// * `signature` - Hex signature as stored on the certificate
/// * `claimed_identity` - Address the signature is expected to recover to
pub fn check_signature(message: &[u8], signature: &str, claimed_identity: &str) -> SignatureCheck {
    match recover_signer(message, signature) {
        Ok(recovered) => {
            let recovered_hex = hex::encode(recovered.as_bytes());
            if recovered_hex.eq_ignore_ascii_case(strip_hex_prefix(claimed_identity)) {
                SignatureCheck::Valid { signer: recovered }
            } else {
                SignatureCheck::Mismatch { recovered }
            }
        }
        Err(reason) => SignatureCheck::Malformed(reason),
    }
}

fn strip_hex_prefix(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

/// `true` iff `signature` over `message` recovers to `claimed_identity`.
pub fn verify(message: &[u8], signature: &str, claimed_identity: &str) -> bool {
    check_signature(message, signature, claimed_identity).is_valid()
}
