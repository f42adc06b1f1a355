// src/blockchain/minting.rs
//! NFT minting collaborator.
//!
//! The minting service (a custodial NFT API in production) receives the
//! certificate's hash, signature and canonical payload as token metadata and
//! reports back a status. The engine records whatever status comes back and
//! never retries on its own; retries go through
//! [`crate::services::certificate_issuer::CertificateIssuer::retry_mint`],
//! which reuses the stored signature.

use crate::error::MintError;
use crate::models::certificate::{CertificateRecord, MintMetadata, MintStatus};
use crate::utils::crypto::digest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// One `{trait_type, value}` pair in the token metadata.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NftAttribute {
    pub trait_type: String,
    pub value: String,
}

impl NftAttribute {
    fn new(trait_type: &str, value: impl Into<String>) -> Self {
        NftAttribute {
            trait_type: trait_type.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    pub external_url: String,
    pub attributes: Vec<NftAttribute>,
}

/// Everything the minting service needs for one certificate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    pub collection_id: String,
    pub certificate_id: String,
    /// Custodial recipient locator, `email:{address}:{chain}`.
    pub recipient: String,
    pub chain: String,
    pub metadata: NftMetadata,
}

impl MintRequest {
    /// Builds the request from an issued record. Uses the stored hash,
    /// signature and payload snapshot as-is.
    pub fn for_certificate(record: &CertificateRecord, collection_id: &str, chain: &str) -> Self {
        let attributes = vec![
            NftAttribute::new("Certificate ID", record.certificate_id.as_str()),
            NftAttribute::new("Certificate Hash", record.certificate_hash.as_str()),
            NftAttribute::new("Issuer Signature", record.issuer_signature.as_str()),
            NftAttribute::new("Issuer Name", record.issuer.name.as_str()),
            NftAttribute::new("Issuer Wallet", record.issuer.wallet.as_str()),
            NftAttribute::new("Canonical Payload", record.canonical_payload.as_str()),
            NftAttribute::new("Recipient Name", record.recipient.name.as_str()),
            NftAttribute::new("Recipient Email", record.recipient.email.as_str()),
            NftAttribute::new("Student ID", record.recipient.student_id.clone().unwrap_or_default()),
            NftAttribute::new("Course Name", record.achievement.course_name.as_str()),
            NftAttribute::new("Issue Date", record.issue_date.as_str()),
            NftAttribute::new("Verification URL", record.verification_url.as_str()),
            NftAttribute::new("Transferable", "false"),
        ];
        MintRequest {
            collection_id: collection_id.to_string(),
            certificate_id: record.certificate_id.clone(),
            recipient: format!("email:{}:{}", record.recipient.email, chain),
            chain: chain.to_string(),
            metadata: NftMetadata {
                name: format!("Certificate #{}", record.certificate_id),
                description: format!(
                    "{} - Issued by {}",
                    record.achievement.course_name, record.issuer.name
                ),
                external_url: record.verification_url.clone(),
                attributes,
            },
        }
    }

    pub fn attribute(&self, trait_type: &str) -> Option<&str> {
        self.metadata
            .attributes
            .iter()
            .find(|a| a.trait_type == trait_type)
            .map(|a| a.value.as_str())
    }
}

/// What the minting service reported.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MintReceipt {
    pub status: MintStatus,
    pub nft_id: Option<String>,
    pub token_id: Option<String>,
    pub transaction_hash: Option<String>,
    pub contract_address: Option<String>,
    pub recipient_wallet: Option<String>,
}

impl MintReceipt {
    /// Converts to stored metadata. Missing references are filled with
    /// `pending` placeholders on a pending receipt and `error` placeholders
    /// on a failed one.
    pub fn into_metadata(self, certificate_id: &str, chain: &str) -> MintMetadata {
        let tag = match self.status {
            MintStatus::Minted => None,
            MintStatus::Failed => Some("error"),
            MintStatus::Pending | MintStatus::Unminted => Some("pending"),
        };
        let fill = |value: Option<String>, scoped: bool| -> Option<String> {
            value.or_else(|| {
                tag.map(|tag| {
                    if scoped {
                        format!("{}-{}", tag, certificate_id)
                    } else {
                        tag.to_string()
                    }
                })
            })
        };
        MintMetadata {
            status: self.status,
            chain: Some(chain.to_string()),
            nft_id: fill(self.nft_id, true),
            token_id: fill(self.token_id, false),
            transaction_hash: fill(self.transaction_hash, false),
            contract_address: self.contract_address,
            recipient_wallet: fill(self.recipient_wallet, false),
        }
    }

    fn failed() -> Self {
        MintReceipt {
            status: MintStatus::Failed,
            nft_id: None,
            token_id: None,
            transaction_hash: None,
            contract_address: None,
            recipient_wallet: None,
        }
    }
}

/// Metadata recorded when the minting call itself errored.
pub fn failed_mint_metadata(certificate_id: &str, chain: &str) -> MintMetadata {
    MintReceipt::failed().into_metadata(certificate_id, chain)
}

#[async_trait]
pub trait MintingCollaborator: Send + Sync {
    async fn mint(&self, request: &MintRequest) -> Result<MintReceipt, MintError>;
}

/// How a [`SimulatedMinter`] responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedOutcome {
    Minted,
    Pending,
    Failed,
    /// The call errors out, as if the service were unreachable.
    Unreachable,
}

/// Offline minter for tests and the demo binary.
///
/// Minted receipts carry references derived from the certificate hash, so the
/// same certificate always gets the same token id and transaction hash.
#[derive(Debug, Clone)]
pub struct SimulatedMinter {
    outcome: SimulatedOutcome,
    contract_address: String,
    calls: Arc<AtomicUsize>,
}

impl SimulatedMinter {
    pub fn new(outcome: SimulatedOutcome) -> Self {
        SimulatedMinter {
            outcome,
            contract_address: "0x0000000000000000000000000000000000c3e7a1".into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `mint` calls received so far (shared across clones).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MintingCollaborator for SimulatedMinter {
    async fn mint(&self, request: &MintRequest) -> Result<MintReceipt, MintError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let seed = request
            .attribute("Certificate Hash")
            .unwrap_or(request.certificate_id.as_str());
        match self.outcome {
            SimulatedOutcome::Minted => {
                let token = digest(seed.as_bytes());
                let token_id = u64::from_be_bytes(
                    token.as_bytes()[..8]
                        .try_into()
                        .map_err(|_| MintError::Rejected("short digest".into()))?,
                );
                let tx = digest(format!("tx:{}", seed).as_bytes());
                Ok(MintReceipt {
                    status: MintStatus::Minted,
                    nft_id: Some(format!("nft-{}", request.certificate_id)),
                    token_id: Some(token_id.to_string()),
                    transaction_hash: Some(tx.to_string()),
                    contract_address: Some(self.contract_address.clone()),
                    recipient_wallet: None,
                })
            }
            SimulatedOutcome::Pending => Ok(MintReceipt {
                status: MintStatus::Pending,
                nft_id: Some(format!("nft-{}", request.certificate_id)),
                token_id: None,
                transaction_hash: None,
                contract_address: None,
                recipient_wallet: None,
            }),
            SimulatedOutcome::Failed => Ok(MintReceipt::failed()),
            SimulatedOutcome::Unreachable => Err(MintError::Transport("connection refused".into())),
        }
    }
}
