// src/services/trust_evaluator.rs
//! Multi-factor trust scoring.
//!
//! Five independent checks run against a stored [`CertificateRecord`]:
//!
//! 1. **Data integrity** - re-canonicalize the stored fields, recompute the
//!    Keccak-256 digest, compare with the stored hash.
//! 2. **Issuer signature** - the stored signature over the payload snapshot
//!    taken at issuance recovers to the stored issuer wallet, and that
//!    snapshot still digests to the stored hash.
//! 3. **Blockchain NFT** - mint status is `minted`.
//! 4. **Issuer identity** - the issuer has a declared identity and signed
//!    with its own key (unauthenticated demo signatures fail here).
//! 5. **Receiver ownership** - placeholder, always passes.
//!
//! Score = passed / 5 * 100. A check that cannot be evaluated is a failed
//! check; evaluation itself never fails.

use crate::models::certificate::{CertificateRecord, MintStatus, SigningMode};
use crate::models::verification::{CheckKind, CheckResult, CheckStatus, VerificationResult};
use crate::services::verifier::check_signature;
use crate::utils::crypto::{digest, IntegrityHash};
use log::debug;

/// Verdict cutoff used unless configured otherwise.
pub const DEFAULT_TRUST_THRESHOLD: u8 = 80;

/// Scores certificates against a fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustEvaluator {
    threshold: u8,
}

impl Default for TrustEvaluator {
    fn default() -> Self {
        TrustEvaluator {
            threshold: DEFAULT_TRUST_THRESHOLD,
        }
    }
}

impl TrustEvaluator {
    /// Creates an evaluator; thresholds above 100 are clamped to 100.
    pub fn new(threshold: u8) -> Self {
        TrustEvaluator {
            threshold: threshold.min(100),
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Runs all checks. Never mutates the record.
    pub fn evaluate(&self, record: &CertificateRecord) -> VerificationResult {
        let checks = vec![
            check_data_integrity(record),
            check_issuer_signature(record),
            check_mint(record),
            check_issuer_identity(record),
            check_receiver_ownership(record),
        ];
        let result = VerificationResult::from_checks(record.certificate_id.clone(), checks, self.threshold);
        debug!(
            "evaluated {}: score {} (threshold {})",
            record.certificate_id, result.trust_score, self.threshold
        );
        result
    }
}

fn check_data_integrity(record: &CertificateRecord) -> CheckResult {
    let kind = CheckKind::DataIntegrity;
    let stored: IntegrityHash = match record.certificate_hash.parse() {
        Ok(hash) => hash,
        Err(e) => return CheckResult::fail(kind, CheckStatus::Tampered, format!("Stored hash unreadable: {}", e)),
    };
    let payload = match record.recompute_payload() {
        Ok(payload) => payload,
        Err(e) => return CheckResult::fail(kind, CheckStatus::Tampered, format!("Stored fields cannot be encoded: {}", e)),
    };
    let recomputed = digest(payload.as_bytes());
    if recomputed == stored {
        CheckResult::pass(kind, CheckStatus::Verified, "Certificate data matches its hash")
    } else {
        CheckResult::fail(
            kind,
            CheckStatus::Tampered,
            format!("Recomputed hash {} does not match stored hash", recomputed),
        )
    }
}

fn check_issuer_signature(record: &CertificateRecord) -> CheckResult {
    let kind = CheckKind::IssuerSignature;
    if record.issuer.wallet.trim().is_empty() {
        return CheckResult::fail(kind, CheckStatus::Invalid, "No issuer identity to verify against");
    }
    if record.canonical_payload.is_empty() {
        return CheckResult::fail(kind, CheckStatus::Invalid, "No signed payload stored");
    }
    let snapshot = record.canonical_payload.as_bytes();
    // the signature only vouches for the stored hash if it covers the same bytes
    let bound = record
        .certificate_hash
        .parse::<IntegrityHash>()
        .map(|stored| stored == digest(snapshot))
        .unwrap_or(false);
    if !bound {
        return CheckResult::fail(kind, CheckStatus::Invalid, "Signed payload does not match the stored hash");
    }
    let check = check_signature(snapshot, &record.issuer_signature, &record.issuer.wallet);
    if check.is_valid() {
        CheckResult::pass(kind, CheckStatus::Verified, check.describe())
    } else {
        CheckResult::fail(kind, CheckStatus::Invalid, check.describe())
    }
}

fn check_mint(record: &CertificateRecord) -> CheckResult {
    let kind = CheckKind::BlockchainNft;
    match record.mint.status {
        MintStatus::Minted => {
            let message = match &record.mint.token_id {
                Some(token) => format!("NFT minted (token {})", token),
                None => "NFT minted".to_string(),
            };
            CheckResult::pass(kind, CheckStatus::Minted, message)
        }
        MintStatus::Pending => CheckResult::fail(kind, CheckStatus::Pending, "NFT minting is pending"),
        MintStatus::Failed => CheckResult::fail(kind, CheckStatus::Failed, "NFT minting failed"),
        MintStatus::Unminted => CheckResult::fail(kind, CheckStatus::Unminted, "No NFT has been minted"),
    }
}

fn check_issuer_identity(record: &CertificateRecord) -> CheckResult {
    let kind = CheckKind::IssuerIdentity;
    if record.issuer.wallet.trim().is_empty() {
        return CheckResult::fail(kind, CheckStatus::Missing, "Issuer has no declared identity");
    }
    match &record.signing_mode {
        SigningMode::Authenticated => CheckResult::pass(kind, CheckStatus::Verified, "Issuer signed with its own key"),
        SigningMode::Unauthenticated { ephemeral_identity } => CheckResult::fail(
            kind,
            CheckStatus::Unauthenticated,
            format!("Signed with an unassociated demo key {}", ephemeral_identity),
        ),
    }
}

fn check_receiver_ownership(_record: &CertificateRecord) -> CheckResult {
    CheckResult::pass(
        CheckKind::ReceiverOwnership,
        CheckStatus::Verified,
        "Certificate is bound to its recipient",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::certificate::tests::sample_record;
    use crate::wallet::key_management::tests::{test_key, TEST_ADDRESS};
    use crate::wallet::key_management::{sign, KeyManager};

    fn seal(record: &mut CertificateRecord, key: &KeyManager) {
        let payload = record.recompute_payload().unwrap();
        record.certificate_hash = digest(payload.as_bytes()).to_string();
        record.issuer_signature = key.sign_message(payload.as_bytes()).unwrap().to_string();
        record.canonical_payload = payload.into_string();
    }

    fn issued() -> CertificateRecord {
        let mut record = sample_record();
        record.issuer.wallet = TEST_ADDRESS.into();
        seal(&mut record, &KeyManager::from_private_key(&test_key()).unwrap());
        record.mint.status = MintStatus::Minted;
        record
    }

    #[test]
    fn test_untouched_minted_record_scores_100() {
        let record = issued();
        let result = TrustEvaluator::default().evaluate(&record);
        assert_eq!(result.trust_score, 100);
        assert!(result.verified);
        assert_eq!(result.checks.len(), 5);
        assert!(result.checks.iter().all(|c| c.passed));
    }

    #[test]
    fn test_evaluation_does_not_mutate() {
        let record = issued();
        let before = record.clone();
        let _ = TrustEvaluator::default().evaluate(&record);
        assert_eq!(record, before);
    }

    #[test]
    fn test_mutated_field_fails_integrity_only() {
        let mut record = issued();
        record.achievement.course_name = "Advanced Systems".into();
        let result = TrustEvaluator::default().evaluate(&record);

        assert!(!result.passed(CheckKind::DataIntegrity));
        assert!(result.passed(CheckKind::IssuerSignature));
        assert_eq!(result.check(CheckKind::DataIntegrity).unwrap().status, CheckStatus::Tampered);
        assert_eq!(result.trust_score, 80);
    }

    #[test]
    fn test_tampered_record_with_invalid_signature_scores_60() {
        let mut record = issued();
        record.recipient.name = "Mallory".into();
        record.issuer_signature = sign(b"something else", &test_key()).unwrap().to_string();
        let result = TrustEvaluator::default().evaluate(&record);

        assert!(!result.passed(CheckKind::DataIntegrity));
        assert!(!result.passed(CheckKind::IssuerSignature));
        assert_eq!(result.trust_score, 60);
        assert!(!result.verified);
    }

    #[test]
    fn test_rewritten_fields_and_hash_break_the_signature_binding() {
        let mut record = issued();
        record.achievement.course_name = "Advanced Systems".into();
        let payload = record.recompute_payload().unwrap();
        record.certificate_hash = digest(payload.as_bytes()).to_string();

        let result = TrustEvaluator::default().evaluate(&record);
        assert!(result.passed(CheckKind::DataIntegrity));
        assert!(!result.passed(CheckKind::IssuerSignature));
        assert_eq!(result.trust_score, 80);
    }

    #[test]
    fn test_rewriting_snapshot_too_needs_the_issuer_key() {
        let mut record = issued();
        record.achievement.course_name = "Advanced Systems".into();
        seal(&mut record, &KeyManager::ephemeral());

        let result = TrustEvaluator::default().evaluate(&record);
        assert!(result.passed(CheckKind::DataIntegrity));
        assert!(!result.passed(CheckKind::IssuerSignature));
        assert!(matches!(
            result.check(CheckKind::IssuerSignature).unwrap().status,
            CheckStatus::Invalid
        ));
    }

    #[test]
    fn test_mint_statuses_degrade_score() {
        for (status, expected) in [
            (MintStatus::Pending, CheckStatus::Pending),
            (MintStatus::Failed, CheckStatus::Failed),
            (MintStatus::Unminted, CheckStatus::Unminted),
        ] {
            let mut record = issued();
            record.mint.status = status;
            let result = TrustEvaluator::default().evaluate(&record);
            assert_eq!(result.trust_score, 80);
            assert_eq!(result.check(CheckKind::BlockchainNft).unwrap().status, expected);
        }
    }

    #[test]
    fn test_unauthenticated_signature_is_downgraded() {
        let mut record = sample_record();
        record.issuer.wallet = TEST_ADDRESS.into();
        let ephemeral = KeyManager::ephemeral();
        record.signing_mode = SigningMode::Unauthenticated {
            ephemeral_identity: ephemeral.identity(),
        };
        seal(&mut record, &ephemeral);
        record.mint.status = MintStatus::Minted;

        let result = TrustEvaluator::default().evaluate(&record);
        assert!(result.passed(CheckKind::DataIntegrity));
        assert!(!result.passed(CheckKind::IssuerSignature));
        assert_eq!(
            result.check(CheckKind::IssuerIdentity).unwrap().status,
            CheckStatus::Unauthenticated
        );
        assert_eq!(result.trust_score, 60);
        assert!(!result.verified);
    }

    #[test]
    fn test_garbage_stored_values_still_yield_a_result() {
        let mut record = issued();
        record.certificate_hash = "not-hex".into();
        record.issuer_signature = "0xnope".into();
        record.canonical_payload = String::new();
        record.issuer.wallet = String::new();
        record.mint.status = MintStatus::Failed;

        let result = TrustEvaluator::default().evaluate(&record);
        assert_eq!(result.trust_score, 20);
        assert_eq!(result.check(CheckKind::IssuerIdentity).unwrap().status, CheckStatus::Missing);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let mut record = issued();
        record.mint.status = MintStatus::Pending;
        record.recipient.email = "other@example.com".into();
        // integrity and mint fail: 60
        assert!(!TrustEvaluator::default().evaluate(&record).verified);
        assert!(TrustEvaluator::new(60).evaluate(&record).verified);
        assert_eq!(TrustEvaluator::new(250).threshold(), 100);
    }
}
