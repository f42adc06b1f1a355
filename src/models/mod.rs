// src/models/mod.rs
pub mod certificate;
pub mod fields;
pub mod lifecycle;
pub mod response;
pub mod verification;
