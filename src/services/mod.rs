// src/services/mod.rs
pub mod certificate_issuer;
pub mod trust_evaluator;
pub mod verification;
pub mod verifier;
