// src/storage/mod.rs
pub mod audit_log;
pub mod record_store;
