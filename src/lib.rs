// src/lib.rs

//! # CertiChain - Certificate Integrity Engine
//!
//! Issues tamper-evident course certificates and verifies them later.
//!
//! ## Architecture Overview
//! 1. **Encoding**: deterministic canonical JSON of the certificate fields (`utils::canonical`)
//! 2. **Cryptography**: Keccak-256 digest (`utils::crypto`), issuer signatures and
//!    recovery (`wallet::key_management`, `services::verifier`)
//! 3. **Scoring**: five-check trust evaluation (`services::trust_evaluator`)
//! 4. **Orchestration**: issuance and verification flows over pluggable
//!    collaborators (`services`, `storage`, `blockchain`, `wallet::key_provider`)

pub mod blockchain; // NFT minting collaborator
pub mod config;
pub mod error;
pub mod models; // Data structures
pub mod services; // Issuance, scoring and verification
pub mod storage; // Record store and audit log
pub mod utils; // Canonical encoding and digests
pub mod wallet; // Issuer keys
