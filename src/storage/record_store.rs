// src/storage/record_store.rs
//! Certificate record storage.
//!
//! The production store is a database owned by the surrounding application;
//! the integrity engine only needs `get` and `put`. [`InMemoryRecordStore`]
//! backs tests and the demo binary.

use crate::error::StoreError;
use crate::models::certificate::CertificateRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetches a record. `Ok(None)` is a lookup miss, not a failure.
    async fn get(&self, certificate_id: &str) -> Result<Option<CertificateRecord>, StoreError>;

    /// Inserts or replaces a record keyed by its certificate id.
    async fn put(&self, record: CertificateRecord) -> Result<(), StoreError>;
}

/// Mutex-guarded map of records by certificate id.
///
/// # Note
/// Records are cloned in and out, so callers never hold the lock across an
/// await point.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecordStore {
    records: Arc<Mutex<HashMap<String, CertificateRecord>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub fn count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    /// Checks whether a record exists without cloning it.
    pub fn contains(&self, certificate_id: &str) -> Result<bool, StoreError> {
        Ok(self.lock()?.contains_key(certificate_id))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, CertificateRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Backend("record store lock poisoned".into()))
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get(&self, certificate_id: &str) -> Result<Option<CertificateRecord>, StoreError> {
        Ok(self.lock()?.get(certificate_id).cloned())
    }

    async fn put(&self, record: CertificateRecord) -> Result<(), StoreError> {
        self.lock()?.insert(record.certificate_id.clone(), record);
        Ok(())
    }
}
