// tests/certificate_flow.rs
//! End-to-end issuance and verification over in-memory collaborators.

use certichain::blockchain::minting::{SimulatedMinter, SimulatedOutcome};
use certichain::models::certificate::{CertificateRecord, MintStatus, SigningMode};
use certichain::models::fields::FieldValue;
use certichain::models::response::VerificationResponse;
use certichain::models::verification::{CheckKind, CheckStatus, VerificationOutcome, VerificationResult};
use certichain::services::certificate_issuer::{CertificateClaim, CertificateIssuer, IssuanceSettings};
use certichain::services::trust_evaluator::TrustEvaluator;
use certichain::services::verification::VerificationService;
use certichain::storage::audit_log::InMemoryAuditLog;
use certichain::storage::record_store::{InMemoryRecordStore, RecordStore};
use certichain::utils::crypto::digest;
use certichain::wallet::key_provider::{IssuerCredentials, StaticKeyProvider};
use ethers::utils::hex;
use serde_json::{json, Value};
use std::sync::Arc;

const ISSUER_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const ISSUER_ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

struct Deployment {
    store: InMemoryRecordStore,
    audit: InMemoryAuditLog,
    issuer: CertificateIssuer,
    verifier: VerificationService,
}

fn deploy(outcome: SimulatedOutcome, with_key: bool) -> Deployment {
    let store = InMemoryRecordStore::new();
    let audit = InMemoryAuditLog::new();
    let keys = StaticKeyProvider::new().with_issuer(
        "instructor-1",
        IssuerCredentials {
            name: "Dr. Rivera".into(),
            identity: ISSUER_ADDRESS.into(),
            private_key: if with_key { Some(hex::decode(ISSUER_KEY).unwrap()) } else { None },
        },
    );
    let issuer = CertificateIssuer::new(
        Arc::new(store.clone()),
        Arc::new(keys),
        Arc::new(SimulatedMinter::new(outcome)),
        IssuanceSettings::default(),
    );
    let verifier = VerificationService::new(
        Arc::new(store.clone()),
        Arc::new(audit.clone()),
        TrustEvaluator::default(),
    );
    Deployment {
        store,
        audit,
        issuer,
        verifier,
    }
}

fn alice() -> CertificateClaim {
    CertificateClaim {
        recipient_name: "Alice".into(),
        recipient_email: "alice@example.com".into(),
        student_id: Some("S-0001".into()),
        course_name: "Intro to Systems".into(),
        group_id: Some("fall-cohort".into()),
        issuer_id: "instructor-1".into(),
        custom_fields: json!({ "grade": "A", "transcript": { "credits": 4, "honors": true } }),
    }
}

fn result_of(outcome: &VerificationOutcome) -> &VerificationResult {
    match outcome {
        VerificationOutcome::Found(report) => &report.result,
        other => panic!("expected a found certificate, got {:?}", other),
    }
}

async fn tamper(store: &InMemoryRecordStore, id: &str, edit: impl FnOnce(&mut CertificateRecord)) {
    let mut record = store.get(id).await.unwrap().unwrap();
    edit(&mut record);
    store.put(record).await.unwrap();
}

#[tokio::test]
async fn issued_certificate_verifies_with_full_score() {
    let d = deploy(SimulatedOutcome::Minted, true);
    let record = d.issuer.issue(alice()).await.unwrap();

    let outcome = d.verifier.verify(&record.certificate_id).await.unwrap();
    let result = result_of(&outcome);
    assert!(result.verified);
    assert_eq!(result.trust_score, 100);
    assert_eq!(result.check(CheckKind::BlockchainNft).unwrap().status, CheckStatus::Minted);
    assert_eq!(record.signing_mode, SigningMode::Authenticated);
}

#[tokio::test]
async fn mutated_course_name_fails_integrity() {
    let d = deploy(SimulatedOutcome::Minted, true);
    let record = d.issuer.issue(alice()).await.unwrap();
    let h1 = record.certificate_hash.clone();

    tamper(&d.store, &record.certificate_id, |r| {
        r.achievement.course_name = "Advanced Systems".into()
    })
    .await;

    let stored = d.store.get(&record.certificate_id).await.unwrap().unwrap();
    let recomputed = digest(stored.recompute_payload().unwrap().as_bytes()).to_string();
    assert_ne!(recomputed, h1);

    let outcome = d.verifier.verify(&record.certificate_id).await.unwrap();
    let result = result_of(&outcome);
    assert_eq!(result.check(CheckKind::DataIntegrity).unwrap().status, CheckStatus::Tampered);
    assert_eq!(result.trust_score, 80);
    assert!(!TrustEvaluator::new(100).evaluate(&stored).verified);
}

#[tokio::test]
async fn tampered_fields_and_forged_signature_score_60() {
    let d = deploy(SimulatedOutcome::Minted, true);
    let record = d.issuer.issue(alice()).await.unwrap();

    tamper(&d.store, &record.certificate_id, |r| {
        r.recipient.name = "Mallory".into();
        r.issuer_signature = format!("0x{}", "11".repeat(64) + "1b");
    })
    .await;

    let outcome = d.verifier.verify(&record.certificate_id).await.unwrap();
    let result = result_of(&outcome);
    assert!(!result.passed(CheckKind::DataIntegrity));
    assert!(!result.passed(CheckKind::IssuerSignature));
    assert_eq!(result.trust_score, 60);
    assert!(!result.verified);
}

#[tokio::test]
async fn unknown_certificate_is_not_found() {
    let d = deploy(SimulatedOutcome::Minted, true);
    let outcome = d.verifier.verify("CERT-1700000000-ZZZZZZ").await.unwrap();

    assert!(matches!(outcome, VerificationOutcome::NotFound { .. }));
    assert_eq!(outcome.trust_score(), None);

    let body = serde_json::to_value(VerificationResponse::from_outcome(&outcome, "https://polygonscan.com")).unwrap();
    assert_eq!(body["found"], Value::Bool(false));
    assert!(body.get("trustScore").is_none());
}

#[tokio::test]
async fn unauthenticated_issuance_is_downgraded() {
    let d = deploy(SimulatedOutcome::Minted, false);
    let record = d.issuer.issue(alice()).await.unwrap();
    assert!(!record.signing_mode.is_authenticated());

    let response = d
        .verifier
        .respond(&record.certificate_id, "https://polygonscan.com")
        .await
        .unwrap();
    let body = serde_json::to_value(response).unwrap();
    assert_eq!(body["signingMode"], "unauthenticated");
    assert_eq!(body["trustScore"], 60);
    assert_eq!(body["verified"], false);
    assert_eq!(body["verification"]["issuerIdentity"]["status"], "UNAUTHENTICATED");
    assert_eq!(body["certificate"]["issuer"]["verified"], false);
}

#[tokio::test]
async fn failed_mint_can_be_retried_without_resigning() {
    let d = deploy(SimulatedOutcome::Failed, true);
    let record = d.issuer.issue(alice()).await.unwrap();
    assert_eq!(record.mint.status, MintStatus::Failed);
    assert_eq!(
        record.mint.nft_id.as_deref(),
        Some(format!("error-{}", record.certificate_id).as_str())
    );

    let before = d.verifier.verify(&record.certificate_id).await.unwrap();
    assert_eq!(before.trust_score(), Some(80));

    let retrier = CertificateIssuer::new(
        Arc::new(d.store.clone()),
        Arc::new(StaticKeyProvider::new()),
        Arc::new(SimulatedMinter::new(SimulatedOutcome::Minted)),
        IssuanceSettings::default(),
    );
    let retried = retrier.retry_mint(&record.certificate_id).await.unwrap();
    assert_eq!(retried.issuer_signature, record.issuer_signature);

    let after = d.verifier.verify(&record.certificate_id).await.unwrap();
    assert_eq!(after.trust_score(), Some(100));
}

#[tokio::test]
async fn rejected_custom_fields_persist_nothing() {
    let d = deploy(SimulatedOutcome::Minted, true);
    let mut claim = alice();
    claim.custom_fields = json!({ "notes": null });

    assert!(d.issuer.issue(claim).await.is_err());
    assert_eq!(d.store.count().unwrap(), 0);
}

#[tokio::test]
async fn every_verification_is_audited() {
    let d = deploy(SimulatedOutcome::Minted, true);
    let record = d.issuer.issue(alice()).await.unwrap();

    d.verifier.verify(&record.certificate_id).await.unwrap();
    d.verifier.verify("CERT-0-NOSUCH").await.unwrap();

    let entries = d.audit.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].trust_score, Some(100));
    assert!(entries[0].verified);
    assert!(!entries[1].found);
}

#[tokio::test]
async fn any_single_field_edit_changes_the_hash() {
    let d = deploy(SimulatedOutcome::Minted, true);
    let record = d.issuer.issue(alice()).await.unwrap();
    let original = record.recompute_payload().unwrap();

    let edits: Vec<Box<dyn Fn(&mut CertificateRecord)>> = vec![
        Box::new(|r: &mut CertificateRecord| r.certificate_id.push('X')),
        Box::new(|r: &mut CertificateRecord| r.recipient.name.push('x')),
        Box::new(|r: &mut CertificateRecord| r.recipient.email.push('x')),
        Box::new(|r: &mut CertificateRecord| r.recipient.student_id = Some("S-0002".into())),
        Box::new(|r: &mut CertificateRecord| r.achievement.course_name.push('x')),
        Box::new(|r: &mut CertificateRecord| r.achievement.group_id = Some("spring-cohort".into())),
        Box::new(|r: &mut CertificateRecord| r.issuer.name.push('x')),
        Box::new(|r: &mut CertificateRecord| {
            r.issuer.wallet = "0x0000000000000000000000000000000000000001".into()
        }),
        Box::new(|r: &mut CertificateRecord| r.issue_date.push('1')),
        Box::new(|r: &mut CertificateRecord| r.verification_url.push('x')),
        Box::new(|r: &mut CertificateRecord| {
            r.custom_fields.insert("grade".into(), "B".into());
        }),
        Box::new(|r: &mut CertificateRecord| match r.custom_fields.get_mut("transcript") {
            Some(FieldValue::Map(transcript)) => {
                transcript.insert("credits".into(), FieldValue::Integer(5));
            }
            other => panic!("transcript missing: {:?}", other),
        }),
    ];
    for edit in edits {
        let mut edited = record.clone();
        edit(&mut edited);
        let payload = edited.recompute_payload().unwrap();
        assert_ne!(digest(payload.as_bytes()), digest(original.as_bytes()));
    }
}
