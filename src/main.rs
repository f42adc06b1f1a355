// src/main.rs

//! # CertiChain - Demo Entry Point
//!
//! Wires the issuance and verification services against in-memory
//! collaborators, issues one certificate, verifies it, and prints the public
//! verification response.
//!
//! ## Environment Variables (all optional, prefix `CERTICHAIN_`)
//! - `APP_URL`: base for verification links (default: http://localhost:3000)
//! - `TRUST_THRESHOLD`: verdict cutoff, 0-100 (default: 80)
//! - `CHAIN` / `EXPLORER_BASE_URL`: minting chain and block explorer
//! - `ISSUER_ID`, `ISSUER_NAME`, `ISSUER_WALLET`: the demo issuer
//! - `ISSUER_PRIVATE_KEY`: hex key; without it issuance falls back to an
//!   unauthenticated key when `ALLOW_UNAUTHENTICATED_SIGNING` is true

use anyhow::Context;
use certichain::blockchain::minting::{SimulatedMinter, SimulatedOutcome};
use certichain::config::AppConfig;
use certichain::services::certificate_issuer::{CertificateClaim, CertificateIssuer};
use certichain::services::verification::VerificationService;
use certichain::storage::audit_log::InMemoryAuditLog;
use certichain::storage::record_store::InMemoryRecordStore;
use certichain::wallet::key_management::public_identity;
use certichain::wallet::key_provider::{IssuerCredentials, StaticKeyProvider};
use dotenv::dotenv;
use log::info;
use serde_json::json;
use std::sync::Arc;

/// # Initialization Sequence
/// 1. Load `.env` and configuration
/// 2. Register the configured issuer
/// 3. Build services over in-memory collaborators
/// 4. Issue and verify one certificate
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let private_key = config.issuer_key_bytes()?;

    // an unset wallet is taken from the key itself
    let identity = match (&private_key, config.issuer_wallet.trim()) {
        (Some(key), "") => public_identity(key)?,
        (_, wallet) => wallet.to_string(),
    };
    let keys = StaticKeyProvider::new().with_issuer(
        config.issuer_id.clone(),
        IssuerCredentials {
            name: config.issuer_name.clone(),
            identity,
            private_key,
        },
    );

    let store = Arc::new(InMemoryRecordStore::new());
    let audit = Arc::new(InMemoryAuditLog::new());
    let issuer = CertificateIssuer::new(
        store.clone(),
        Arc::new(keys),
        Arc::new(SimulatedMinter::new(SimulatedOutcome::Minted)),
        config.issuance_settings(),
    );
    let verifier = VerificationService::new(store.clone(), audit.clone(), config.trust_evaluator());

    let record = issuer
        .issue(CertificateClaim {
            recipient_name: "Alice Example".into(),
            recipient_email: "alice@example.com".into(),
            student_id: Some("S-1024".into()),
            course_name: "Intro to Systems".into(),
            group_id: None,
            issuer_id: config.issuer_id.clone(),
            custom_fields: json!({ "grade": "A", "credits": 4 }),
        })
        .await?;
    info!("QR payload: {}", record.qr_payload());

    let response = verifier
        .respond(&record.certificate_id, &config.explorer_base_url)
        .await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    info!("{} verification(s) audited", audit.entries().len());
    Ok(())
}
