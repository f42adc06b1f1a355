// src/blockchain/mod.rs
pub mod minting;
