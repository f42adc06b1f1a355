// src/models/certificate.rs
//! Certificate record data model.
//!
//! A [`CertificateRecord`] is created exactly once at claim time and is
//! immutable afterwards, except for the mint metadata attached by the minting
//! collaborator. The fields that make up the canonical payload are listed in
//! [`CertificateRecord::canonical_fields`]; everything else (payload snapshot,
//! hash, signature, signing mode, mint metadata) is derived from or attached
//! to that payload.

use crate::error::EncodingError;
use crate::models::fields::{FieldMap, FieldValue};
use crate::utils::canonical::{canonicalize, CanonicalPayload};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ID_SUFFIX_LEN: usize = 6;

/// Person the certificate is awarded to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub name: String,
    pub email: String,
    /// External student identifier, if the issuing institution uses one.
    pub student_id: Option<String>,
}

/// Issuing party and the public identity its signatures recover to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    pub name: String,
    /// Ethereum address, EIP-55 checksummed when produced by this crate.
    pub wallet: String,
}

/// What the certificate attests to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub course_name: String,
    /// Group/cohort the recipient completed the course with.
    pub group_id: Option<String>,
}

/// How the issuer signature was produced.
///
/// `Unauthenticated` marks the demo fallback where no issuer key was
/// available and a throwaway key signed instead. Such a signature recovers to
/// `ephemeral_identity`, never to the issuer's wallet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum SigningMode {
    Authenticated,
    #[serde(rename_all = "camelCase")]
    Unauthenticated { ephemeral_identity: String },
}

impl SigningMode {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SigningMode::Authenticated)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SigningMode::Authenticated => "authenticated",
            SigningMode::Unauthenticated { .. } => "unauthenticated",
        }
    }
}

/// Whether an NFT representation of the certificate exists.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MintStatus {
    #[default]
    Unminted,
    Pending,
    Minted,
    Failed,
}

/// Post-hoc metadata supplied by the minting collaborator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MintMetadata {
    pub status: MintStatus,
    pub chain: Option<String>,
    pub nft_id: Option<String>,
    pub token_id: Option<String>,
    pub transaction_hash: Option<String>,
    pub contract_address: Option<String>,
    pub recipient_wallet: Option<String>,
}

/// An issued certificate as held by the record store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    /// Globally unique id, e.g. `CERT-1718000000-Q7X2KD`.
    pub certificate_id: String,
    pub recipient: Recipient,
    pub issuer: Issuer,
    pub achievement: Achievement,
    /// Naive UTC ISO-8601 timestamp with microseconds.
    pub issue_date: String,
    pub verification_url: String,
    #[serde(default)]
    pub custom_fields: FieldMap,
    /// Canonical payload exactly as it was hashed and signed at issuance.
    pub canonical_payload: String,
    /// `0x`-prefixed Keccak-256 of the canonical payload, as stored at issuance.
    pub certificate_hash: String,
    /// `0x`-prefixed 65-byte personal-message signature, as stored at issuance.
    pub issuer_signature: String,
    pub signing_mode: SigningMode,
    #[serde(default)]
    pub mint: MintMetadata,
}

impl CertificateRecord {
    /// Field mapping fed to the canonicalizer.
    ///
    /// `studentId` is always present (empty when absent); `groupId` and
    /// `customFields` only when set, so records without them keep the payload
    /// layout of earlier issuances.
    pub fn canonical_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("certificateId".into(), self.certificate_id.clone().into());
        fields.insert("recipientName".into(), self.recipient.name.clone().into());
        fields.insert("recipientEmail".into(), self.recipient.email.clone().into());
        fields.insert(
            "studentId".into(),
            self.recipient.student_id.clone().unwrap_or_default().into(),
        );
        fields.insert("courseName".into(), self.achievement.course_name.clone().into());
        fields.insert("issuerName".into(), self.issuer.name.clone().into());
        fields.insert("issuerWallet".into(), self.issuer.wallet.clone().into());
        fields.insert("issueDate".into(), self.issue_date.clone().into());
        if let Some(group_id) = &self.achievement.group_id {
            fields.insert("groupId".into(), group_id.clone().into());
        }
        fields.insert("verificationUrl".into(), self.verification_url.clone().into());
        if !self.custom_fields.is_empty() {
            fields.insert("customFields".into(), FieldValue::Map(self.custom_fields.clone()));
        }
        fields
    }

    /// Re-derives the canonical payload from the record's current content.
    pub fn recompute_payload(&self) -> Result<CanonicalPayload, EncodingError> {
        canonicalize(&self.canonical_fields())
    }

    /// Compact JSON carried by the certificate's QR code.
    pub fn qr_payload(&self) -> String {
        serde_json::json!({
            "certificateId": self.certificate_id,
            "verificationUrl": self.verification_url,
            "certificateHash": self.certificate_hash,
        })
        .to_string()
    }
}

/// Generates a certificate id of the form `CERT-{unix seconds}-{6 chars}`.
pub fn generate_certificate_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("CERT-{}-{}", now.timestamp(), suffix)
}

/// Public verification link for a certificate.
pub fn verification_url(app_url: &str, certificate_id: &str) -> String {
    format!("{}/verify/{}", app_url.trim_end_matches('/'), certificate_id)
}

/// Issue timestamp in the stored format (`2024-05-01T09:30:00.000000`).
pub fn format_issue_date(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
