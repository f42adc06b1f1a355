// src/services/certificate_issuer.rs
//! Certificate Issuer Service
//!
//! Turns a claim into a sealed, stored certificate. The flow follows the
//! lifecycle in [`crate::models::lifecycle`]:
//!
//! 1. Resolve the issuer through the [`KeyProvider`]
//! 2. Build the record and canonicalize its fields
//! 3. Digest the canonical bytes (Keccak-256)
//! 4. Sign the canonical bytes exactly once
//! 5. Hand hash, signature and payload to the [`MintingCollaborator`]
//! 6. Publish and persist through the [`RecordStore`]
//!
//! Encoding and signing failures abort the claim before anything is minted
//! or persisted. Minting failures do not: the record is stored with a failed
//! mint status and can be resubmitted with [`CertificateIssuer::retry_mint`].

use crate::blockchain::minting::{failed_mint_metadata, MintRequest, MintingCollaborator};
use crate::error::{IssuanceError, SigningError};
use crate::models::certificate::{
    format_issue_date, generate_certificate_id, verification_url, Achievement, CertificateRecord, Issuer,
    MintMetadata, MintStatus, Recipient, SigningMode,
};
use crate::models::fields::fields_from_json;
use crate::models::lifecycle::Lifecycle;
use crate::storage::record_store::RecordStore;
use crate::utils::crypto::digest;
use crate::wallet::key_management::KeyManager;
use crate::wallet::key_provider::{IssuerCredentials, KeyProvider};
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Input of a certificate claim.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificateClaim {
    pub recipient_name: String,
    pub recipient_email: String,
    #[serde(default)]
    pub student_id: Option<String>,
    pub course_name: String,
    #[serde(default)]
    pub group_id: Option<String>,
    /// Key provider id of the issuing party.
    pub issuer_id: String,
    /// Free-form JSON object; `null` or absent means no custom fields.
    #[serde(default)]
    pub custom_fields: Value,
}

/// Deployment values the issuer needs. Never read from the environment here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceSettings {
    pub app_url: String,
    pub chain: String,
    pub collection_id: String,
    /// Permit signing with a throwaway key when the issuer has none.
    pub allow_unauthenticated_signing: bool,
}

impl Default for IssuanceSettings {
    fn default() -> Self {
        IssuanceSettings {
            app_url: "http://localhost:3000".into(),
            chain: "polygon".into(),
            collection_id: "default-certichain-collection".into(),
            allow_unauthenticated_signing: true,
        }
    }
}

/// Orchestrates issuance against the external collaborators.
pub struct CertificateIssuer {
    store: Arc<dyn RecordStore>,
    keys: Arc<dyn KeyProvider>,
    minter: Arc<dyn MintingCollaborator>,
    settings: IssuanceSettings,
}

impl CertificateIssuer {
    /// Creates a new CertificateIssuer
    ///
    /// # Arguments
    /// * `store` - Where issued records are persisted
    /// * `keys` - Source of issuer identities and private keys
    /// * `minter` - NFT minting collaborator
    /// * `settings` - App URL, chain and signing policy
    pub fn new(
        store: Arc<dyn RecordStore>,
        keys: Arc<dyn KeyProvider>,
        minter: Arc<dyn MintingCollaborator>,
        settings: IssuanceSettings,
    ) -> Self {
        CertificateIssuer {
            store,
            keys,
            minter,
            settings,
        }
    }

    /// Issues a certificate for `claim`.
    ///
    /// # Returns
    /// The stored record, including whatever mint status the collaborator
    /// reported.
    ///
    /// # Errors
    /// * `UnknownIssuer` - the key provider has no such issuer
    /// * `Encoding` - a custom field has no canonical encoding
    /// * `Signing` - missing, malformed or mismatched key material
    /// * `Store` / `KeyProvider` - collaborator backend failures
    pub async fn issue(&self, claim: CertificateClaim) -> Result<CertificateRecord, IssuanceError> {
        let mut lifecycle = Lifecycle::new();

        let credentials = self
            .keys
            .issuer_credentials(&claim.issuer_id)
            .await?
            .ok_or_else(|| IssuanceError::UnknownIssuer(claim.issuer_id.clone()))?;

        let custom_fields = fields_from_json(&claim.custom_fields)?;
        let now = Utc::now();
        let certificate_id = generate_certificate_id(now);
        let mut record = CertificateRecord {
            verification_url: verification_url(&self.settings.app_url, &certificate_id),
            certificate_id,
            recipient: Recipient {
                name: claim.recipient_name,
                email: claim.recipient_email,
                student_id: claim.student_id,
            },
            issuer: Issuer {
                name: credentials.name.clone(),
                wallet: credentials.identity.clone(),
            },
            achievement: Achievement {
                course_name: claim.course_name,
                group_id: claim.group_id,
            },
            issue_date: format_issue_date(now),
            custom_fields,
            canonical_payload: String::new(),
            certificate_hash: String::new(),
            issuer_signature: String::new(),
            signing_mode: SigningMode::Authenticated,
            mint: MintMetadata::default(),
        };

        let payload = record.recompute_payload()?;
        lifecycle.canonicalize()?;

        let hash = digest(payload.as_bytes());
        let (signer, signing_mode) = self.signer_for(&claim.issuer_id, &credentials)?;
        let signature = signer.sign_message(payload.as_bytes())?;
        lifecycle.sign()?;

        record.canonical_payload = payload.into_string();
        record.certificate_hash = hash.to_string();
        record.issuer_signature = signature.to_string();
        record.signing_mode = signing_mode;
        debug!("sealed {} with hash {}", record.certificate_id, record.certificate_hash);

        lifecycle.request_mint()?;
        record.mint = self.submit_mint(&record).await;
        lifecycle.record_mint(record.mint.status)?;
        lifecycle.publish()?;

        self.store.put(record.clone()).await?;
        info!(
            "issued {} to {} (mint {:?}, {})",
            record.certificate_id,
            record.recipient.email,
            record.mint.status,
            record.signing_mode.label()
        );
        Ok(record)
    }

    /// Resubmits a stored certificate to the minting collaborator.
    ///
    /// The stored hash, signature and payload snapshot are sent as they are;
    /// nothing is re-canonicalized or re-signed. Only the mint metadata is
    /// written back. Records that are already minted are returned unchanged.
    pub async fn retry_mint(&self, certificate_id: &str) -> Result<CertificateRecord, IssuanceError> {
        let mut record = self
            .store
            .get(certificate_id)
            .await?
            .ok_or_else(|| IssuanceError::NotFound(certificate_id.to_string()))?;

        if record.mint.status == MintStatus::Minted {
            debug!("{} already minted, skipping retry", certificate_id);
            return Ok(record);
        }

        record.mint = self.submit_mint(&record).await;
        self.store.put(record.clone()).await?;
        info!("mint retry for {}: {:?}", certificate_id, record.mint.status);
        Ok(record)
    }

    /// Picks the key that signs this claim.
    fn signer_for(
        &self,
        issuer_id: &str,
        credentials: &IssuerCredentials,
    ) -> Result<(KeyManager, SigningMode), SigningError> {
        match &credentials.private_key {
            Some(key) => {
                let signer = KeyManager::from_private_key(key)?;
                let derived = signer.identity();
                if !derived.eq_ignore_ascii_case(credentials.identity.trim()) {
                    return Err(SigningError::IdentityMismatch {
                        declared: credentials.identity.clone(),
                        derived,
                    });
                }
                Ok((signer, SigningMode::Authenticated))
            }
            None if self.settings.allow_unauthenticated_signing => {
                let signer = KeyManager::ephemeral();
                warn!(
                    "issuer {} has no signing key; signing with unauthenticated key {}",
                    issuer_id,
                    signer.identity()
                );
                let mode = SigningMode::Unauthenticated {
                    ephemeral_identity: signer.identity(),
                };
                Ok((signer, mode))
            }
            None => Err(SigningError::MissingKey {
                issuer: issuer_id.to_string(),
            }),
        }
    }

    async fn submit_mint(&self, record: &CertificateRecord) -> MintMetadata {
        let chain = &self.settings.chain;
        let request = MintRequest::for_certificate(record, &self.settings.collection_id, chain);
        match self.minter.mint(&request).await {
            Ok(mut receipt) => {
                if receipt.status == MintStatus::Unminted {
                    warn!("minting service left {} unminted, recording as failed", record.certificate_id);
                    receipt.status = MintStatus::Failed;
                }
                receipt.into_metadata(&record.certificate_id, chain)
            }
            Err(e) => {
                warn!("minting {} failed: {}", record.certificate_id, e);
                failed_mint_metadata(&record.certificate_id, chain)
            }
        }
    }
}
