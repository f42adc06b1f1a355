// src/storage/audit_log.rs
//! Verification audit trail.
//!
//! One entry per verification attempt. Appending is best-effort: callers log
//! and drop append failures instead of failing the verification.

use crate::error::AuditError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub certificate_id: String,
    pub found: bool,
    pub verified: bool,
    /// Absent for lookup misses; no score is computed for those.
    pub trust_score: Option<u8>,
    pub verified_at: DateTime<Utc>,
}

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> Result<(), AuditError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditLog {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries in append order.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .map_err(|_| AuditError::Append("audit log lock poisoned".into()))?
            .push(entry);
        Ok(())
    }
}

/// Audit sink that rejects every append. Used to exercise the best-effort path.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableAuditLog;

#[async_trait]
impl AuditLog for UnavailableAuditLog {
    async fn append(&self, _entry: AuditEntry) -> Result<(), AuditError> {
        Err(AuditError::Append("audit sink unavailable".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_keep_append_order() {
        let log = InMemoryAuditLog::new();
        for (i, id) in ["CERT-1-AAAAAA", "CERT-2-BBBBBB"].iter().enumerate() {
            tokio_test::block_on(log.append(AuditEntry {
                certificate_id: id.to_string(),
                found: true,
                verified: i == 0,
                trust_score: Some(100 - 20 * i as u8),
                verified_at: Utc::now(),
            }))
            .unwrap();
        }
        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].certificate_id, "CERT-2-BBBBBB");
        assert_eq!(entries[1].trust_score, Some(80));
    }

    #[test]
    fn test_unavailable_log_errors() {
        let entry = AuditEntry {
            certificate_id: "CERT-1-AAAAAA".into(),
            found: false,
            verified: false,
            trust_score: None,
            verified_at: Utc::now(),
        };
        assert!(tokio_test::block_on(UnavailableAuditLog.append(entry)).is_err());
    }
}
