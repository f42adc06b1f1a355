// src/models/response.rs
//! Client-facing verification response.
//!
//! Field names match what existing verification pages read
//! (`trustScore`, `verification.dataIntegrity.status`, `blockchain.tokenId`, ...).

use crate::models::certificate::{CertificateRecord, MintMetadata};
use crate::models::fields::FieldMap;
use crate::models::verification::{
    CheckKind, CheckResult, CheckStatus, VerificationOutcome, VerificationResult,
};
use serde::{Deserialize, Serialize};

/// Either a full verification report or the not-found shape.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum VerificationResponse {
    Found(Box<FoundResponse>),
    NotFound(NotFoundResponse),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundResponse {
    pub verified: bool,
    pub found: bool,
    pub certificate_id: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoundResponse {
    pub verified: bool,
    pub trust_score: u8,
    pub signing_mode: String,
    pub certificate: CertificateView,
    pub verification: ChecksView,
    pub blockchain: BlockchainView,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificateView {
    pub certificate_id: String,
    pub course_name: String,
    pub issue_date: String,
    pub verification_url: String,
    pub certificate_hash: String,
    pub recipient: RecipientView,
    pub issuer: IssuerView,
    pub custom_fields: FieldMap,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipientView {
    pub name: String,
    pub email: String,
    pub student_id: Option<String>,
    pub wallet: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IssuerView {
    pub name: String,
    pub wallet: String,
    pub verified: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CheckView {
    pub status: CheckStatus,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NftCheckView {
    pub status: CheckStatus,
    pub message: String,
    pub chain: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChecksView {
    pub data_integrity: CheckView,
    pub issuer_signature: CheckView,
    #[serde(rename = "blockchainNFT")]
    pub blockchain_nft: NftCheckView,
    pub issuer_identity: CheckView,
    pub receiver_ownership: CheckView,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainView {
    pub chain: Option<String>,
    pub nft_id: Option<String>,
    pub token_id: Option<String>,
    pub contract_address: Option<String>,
    pub transaction_hash: Option<String>,
    pub explorer_url: Option<String>,
}

impl VerificationResponse {
    /// Builds the response for an outcome.
    ///
    /// # Arguments
    /// * `outcome` - Result of a verification request
    /// * `explorer_base_url` - Block explorer root used for transaction links
    pub fn from_outcome(outcome: &VerificationOutcome, explorer_base_url: &str) -> Self {
        match outcome {
            VerificationOutcome::NotFound { certificate_id } => {
                VerificationResponse::NotFound(NotFoundResponse {
                    verified: false,
                    found: false,
                    certificate_id: certificate_id.clone(),
                    message: "Certificate not found".into(),
                })
            }
            VerificationOutcome::Found(report) => VerificationResponse::Found(Box::new(
                FoundResponse::build(&report.record, &report.result, explorer_base_url),
            )),
        }
    }
}

impl FoundResponse {
    fn build(record: &CertificateRecord, result: &VerificationResult, explorer_base_url: &str) -> Self {
        let nft = view(result, CheckKind::BlockchainNft);
        FoundResponse {
            verified: result.verified,
            trust_score: result.trust_score,
            signing_mode: record.signing_mode.label().to_string(),
            certificate: CertificateView {
                certificate_id: record.certificate_id.clone(),
                course_name: record.achievement.course_name.clone(),
                issue_date: record.issue_date.clone(),
                verification_url: record.verification_url.clone(),
                certificate_hash: record.certificate_hash.clone(),
                recipient: RecipientView {
                    name: record.recipient.name.clone(),
                    email: record.recipient.email.clone(),
                    student_id: record.recipient.student_id.clone(),
                    wallet: record.mint.recipient_wallet.clone(),
                },
                issuer: IssuerView {
                    name: record.issuer.name.clone(),
                    wallet: record.issuer.wallet.clone(),
                    verified: result.passed(CheckKind::IssuerSignature)
                        && result.passed(CheckKind::IssuerIdentity),
                },
                custom_fields: record.custom_fields.clone(),
            },
            verification: ChecksView {
                data_integrity: view(result, CheckKind::DataIntegrity),
                issuer_signature: view(result, CheckKind::IssuerSignature),
                blockchain_nft: NftCheckView {
                    status: nft.status,
                    message: nft.message,
                    chain: record.mint.chain.clone(),
                },
                issuer_identity: view(result, CheckKind::IssuerIdentity),
                receiver_ownership: view(result, CheckKind::ReceiverOwnership),
            },
            blockchain: BlockchainView::from_mint(&record.mint, explorer_base_url),
        }
    }
}

impl BlockchainView {
    fn from_mint(mint: &MintMetadata, explorer_base_url: &str) -> Self {
        let explorer_url = mint
            .transaction_hash
            .as_deref()
            .filter(|tx| is_onchain_reference(tx))
            .map(|tx| format!("{}/tx/{}", explorer_base_url.trim_end_matches('/'), tx));
        BlockchainView {
            chain: mint.chain.clone(),
            nft_id: mint.nft_id.clone(),
            token_id: mint.token_id.clone(),
            contract_address: mint.contract_address.clone(),
            transaction_hash: mint.transaction_hash.clone(),
            explorer_url,
        }
    }
}

/// Placeholder references written for pending or failed mints are not links.
fn is_onchain_reference(reference: &str) -> bool {
    !(reference.is_empty() || reference == "pending" || reference == "error")
}

fn view(result: &VerificationResult, kind: CheckKind) -> CheckView {
    match result.check(kind) {
        Some(CheckResult { status, message, .. }) => CheckView {
            status: *status,
            message: message.clone(),
        },
        None => CheckView {
            status: CheckStatus::Missing,
            message: "check was not evaluated".into(),
        },
    }
}
