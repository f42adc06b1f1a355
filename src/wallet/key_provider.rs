// src/wallet/key_provider.rs
//! Issuer key lookup.
//!
//! The key provider is an external collaborator (a secrets store, an
//! encrypted profile column, an HSM front-end). The issuance flow only needs
//! the issuer's declared identity and, when available, its private key bytes.

use crate::error::KeyProviderError;
use async_trait::async_trait;
use std::collections::HashMap;

/// What a key provider knows about one issuer.
#[derive(Clone)]
pub struct IssuerCredentials {
    pub name: String,
    /// Declared public identity (wallet address) signatures must recover to.
    pub identity: String,
    /// Raw secp256k1 scalar; `None` when the issuer never configured a key.
    pub private_key: Option<Vec<u8>>,
}

impl std::fmt::Debug for IssuerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerCredentials")
            .field("name", &self.name)
            .field("identity", &self.identity)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
pub trait KeyProvider: Send + Sync {
    /// Looks up an issuer. `Ok(None)` means the issuer is unknown.
    async fn issuer_credentials(&self, issuer_id: &str) -> Result<Option<IssuerCredentials>, KeyProviderError>;
}

/// Fixed in-memory issuer table.
#[derive(Debug, Default, Clone)]
pub struct StaticKeyProvider {
    issuers: HashMap<String, IssuerCredentials>,
}

impl StaticKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) an issuer.
    pub fn with_issuer(mut self, issuer_id: impl Into<String>, credentials: IssuerCredentials) -> Self {
        self.issuers.insert(issuer_id.into(), credentials);
        self
    }
}

#[async_trait]
impl KeyProvider for StaticKeyProvider {
    async fn issuer_credentials(&self, issuer_id: &str) -> Result<Option<IssuerCredentials>, KeyProviderError> {
        Ok(self.issuers.get(issuer_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_redacted_debug() {
        let provider = StaticKeyProvider::new().with_issuer(
            "instructor-1",
            IssuerCredentials {
                name: "Dr. Rivera".into(),
                identity: "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23".into(),
                private_key: Some(vec![7u8; 32]),
            },
        );

        let found = tokio_test::block_on(provider.issuer_credentials("instructor-1")).unwrap();
        let found = found.expect("issuer registered");
        assert_eq!(found.name, "Dr. Rivera");
        assert!(!format!("{:?}", found).contains("7, 7"));

        let missing = tokio_test::block_on(provider.issuer_credentials("nobody")).unwrap();
        assert!(missing.is_none());
    }
}
