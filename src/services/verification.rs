// src/services/verification.rs
//! Verification Service
//!
//! Looks a certificate up, scores it with the [`TrustEvaluator`], and leaves
//! one audit entry per attempt. A lookup miss is answered before any
//! evaluation and carries no score.

use crate::error::StoreError;
use crate::models::response::VerificationResponse;
use crate::models::verification::{VerificationOutcome, VerificationReport};
use crate::services::trust_evaluator::TrustEvaluator;
use crate::storage::audit_log::{AuditEntry, AuditLog};
use crate::storage::record_store::RecordStore;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

pub struct VerificationService {
    store: Arc<dyn RecordStore>,
    audit: Arc<dyn AuditLog>,
    evaluator: TrustEvaluator,
}

impl VerificationService {
    pub fn new(store: Arc<dyn RecordStore>, audit: Arc<dyn AuditLog>, evaluator: TrustEvaluator) -> Self {
        VerificationService {
            store,
            audit,
            evaluator,
        }
    }

    /// Verifies a certificate by id.
    ///
    /// # Returns
    /// `NotFound` for an unknown id, otherwise the record with its scored
    /// checks. A tampered or unsigned certificate is a normal, negative
    /// result.
    ///
    /// # Errors
    /// Only a record store backend failure.
    pub async fn verify(&self, certificate_id: &str) -> Result<VerificationOutcome, StoreError> {
        let outcome = match self.store.get(certificate_id).await? {
            None => VerificationOutcome::NotFound {
                certificate_id: certificate_id.to_string(),
            },
            Some(record) => {
                let result = self.evaluator.evaluate(&record);
                VerificationOutcome::Found(Box::new(VerificationReport { record, result }))
            }
        };

        info!(
            "verification of {}: found={} score={:?} verified={}",
            certificate_id,
            matches!(outcome, VerificationOutcome::Found(_)),
            outcome.trust_score(),
            outcome.is_verified()
        );
        self.audit(certificate_id, &outcome).await;
        Ok(outcome)
    }

    /// Verifies and renders the public response body.
    pub async fn respond(
        &self,
        certificate_id: &str,
        explorer_base_url: &str,
    ) -> Result<VerificationResponse, StoreError> {
        let outcome = self.verify(certificate_id).await?;
        Ok(VerificationResponse::from_outcome(&outcome, explorer_base_url))
    }

    async fn audit(&self, certificate_id: &str, outcome: &VerificationOutcome) {
        let entry = AuditEntry {
            certificate_id: certificate_id.to_string(),
            found: matches!(outcome, VerificationOutcome::Found(_)),
            verified: outcome.is_verified(),
            trust_score: outcome.trust_score(),
            verified_at: Utc::now(),
        };
        if let Err(e) = self.audit.append(entry).await {
            warn!("dropping audit entry for {}: {}", certificate_id, e);
        }
    }
}
