// src/models/verification.rs
//! Per-request verification results.
//!
//! Results are computed fresh for every verification and never written back
//! to the certificate. A failing check is data, not an error: a tampered or
//! unsigned certificate still yields a complete [`VerificationResult`].

use crate::models::certificate::CertificateRecord;
use serde::{Deserialize, Serialize};

/// The five independent checks, in evaluation order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CheckKind {
    DataIntegrity,
    IssuerSignature,
    #[serde(rename = "blockchainNFT")]
    BlockchainNft,
    IssuerIdentity,
    ReceiverOwnership,
}

impl CheckKind {
    pub const ALL: [CheckKind; 5] = [
        CheckKind::DataIntegrity,
        CheckKind::IssuerSignature,
        CheckKind::BlockchainNft,
        CheckKind::IssuerIdentity,
        CheckKind::ReceiverOwnership,
    ];
}

/// Status label reported to clients for a single check.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Verified,
    Tampered,
    Invalid,
    Minted,
    Pending,
    Failed,
    Unminted,
    Unauthenticated,
    Missing,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub kind: CheckKind,
    pub passed: bool,
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    pub fn pass(kind: CheckKind, status: CheckStatus, message: impl Into<String>) -> Self {
        CheckResult {
            kind,
            passed: true,
            status,
            message: message.into(),
        }
    }

    pub fn fail(kind: CheckKind, status: CheckStatus, message: impl Into<String>) -> Self {
        CheckResult {
            kind,
            passed: false,
            status,
            message: message.into(),
        }
    }
}

/// Aggregate of all checks for one certificate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub certificate_id: String,
    pub checks: Vec<CheckResult>,
    /// `passed / total * 100`, a multiple of 20 under the five-check model.
    pub trust_score: u8,
    /// `trust_score >= threshold`.
    pub verified: bool,
    pub threshold: u8,
}

impl VerificationResult {
    /// Scores a set of checks against a threshold.
    pub fn from_checks(certificate_id: impl Into<String>, checks: Vec<CheckResult>, threshold: u8) -> Self {
        let total = checks.len().max(1);
        let passed = checks.iter().filter(|c| c.passed).count();
        let trust_score = u8::try_from(passed * 100 / total).unwrap_or(100);
        VerificationResult {
            certificate_id: certificate_id.into(),
            checks,
            trust_score,
            verified: trust_score >= threshold,
            threshold,
        }
    }

    pub fn check(&self, kind: CheckKind) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.kind == kind)
    }

    pub fn passed(&self, kind: CheckKind) -> bool {
        self.check(kind).map(|c| c.passed).unwrap_or(false)
    }
}

/// A found certificate together with its evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    pub record: CertificateRecord,
    pub result: VerificationResult,
}

/// Outcome of a verification request. A lookup miss is reported before any
/// evaluation and carries no score.
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    NotFound { certificate_id: String },
    Found(Box<VerificationReport>),
}

impl VerificationOutcome {
    pub fn is_verified(&self) -> bool {
        match self {
            VerificationOutcome::NotFound { .. } => false,
            VerificationOutcome::Found(report) => report.result.verified,
        }
    }

    pub fn trust_score(&self) -> Option<u8> {
        match self {
            VerificationOutcome::NotFound { .. } => None,
            VerificationOutcome::Found(report) => Some(report.result.trust_score),
        }
    }
}
