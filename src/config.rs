// src/config.rs
//! Deployment configuration.
//!
//! Values come from built-in defaults overridden by `CERTICHAIN_*`
//! environment variables (`CERTICHAIN_TRUST_THRESHOLD=60`,
//! `CERTICHAIN_ISSUER_PRIVATE_KEY=0x...`). The binary loads a `.env` file
//! first. Library code never reads configuration itself; the binary turns an
//! [`AppConfig`] into the explicit settings each service takes.

use crate::error::ConfigError;
use crate::services::certificate_issuer::IssuanceSettings;
use crate::services::trust_evaluator::{TrustEvaluator, DEFAULT_TRUST_THRESHOLD};
use config::{Config, Environment};
use ethers::utils::hex;
use serde::Deserialize;

const ENV_PREFIX: &str = "CERTICHAIN";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub app_url: String,
    pub trust_threshold: u32,
    pub chain: String,
    pub explorer_base_url: String,
    pub mint_collection_id: String,
    pub allow_unauthenticated_signing: bool,
    pub issuer_id: String,
    pub issuer_name: String,
    pub issuer_wallet: String,
    #[serde(default)]
    pub issuer_private_key: Option<String>,
}

impl AppConfig {
    /// Loads defaults plus `CERTICHAIN_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads defaults overridden by the given environment source.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app_url", "http://localhost:3000")?
            .set_default("trust_threshold", i64::from(DEFAULT_TRUST_THRESHOLD))?
            .set_default("chain", "polygon")?
            .set_default("explorer_base_url", "https://polygonscan.com")?
            .set_default("mint_collection_id", "default-certichain-collection")?
            .set_default("allow_unauthenticated_signing", true)?
            .set_default("issuer_id", "demo-issuer")?
            .set_default("issuer_name", "CertiChain Demo Academy")?
            .set_default("issuer_wallet", "")?
            .add_source(environment.try_parsing(true))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.trust_threshold > 100 {
            return Err(ConfigError::ThresholdOutOfRange(self.trust_threshold));
        }
        self.issuer_key_bytes()?;
        Ok(())
    }

    /// Decodes `issuer_private_key` (hex, optional `0x`). Blank means no key.
    pub fn issuer_key_bytes(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        let raw = match self.issuer_private_key.as_deref().map(str::trim) {
            None | Some("") => return Ok(None),
            Some(raw) => raw,
        };
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .unwrap_or(raw);
        hex::decode(digits)
            .map(Some)
            .map_err(|e| ConfigError::InvalidIssuerKey(e.to_string()))
    }

    pub fn issuance_settings(&self) -> IssuanceSettings {
        IssuanceSettings {
            app_url: self.app_url.clone(),
            chain: self.chain.clone(),
            collection_id: self.mint_collection_id.clone(),
            allow_unauthenticated_signing: self.allow_unauthenticated_signing,
        }
    }

    pub fn trust_evaluator(&self) -> TrustEvaluator {
        // validated to be <= 100
        TrustEvaluator::new(u8::try_from(self.trust_threshold).unwrap_or(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_with(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let source: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::load(Environment::with_prefix(ENV_PREFIX).source(Some(source)))
    }

    #[test]
    fn test_defaults() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.app_url, "http://localhost:3000");
        assert_eq!(config.trust_threshold, 80);
        assert_eq!(config.chain, "polygon");
        assert!(config.allow_unauthenticated_signing);
        assert_eq!(config.issuer_key_bytes().unwrap(), None);
        assert_eq!(config.trust_evaluator().threshold(), 80);
    }

    #[test]
    fn test_environment_overrides() {
        let config = load_with(&[
            ("CERTICHAIN_TRUST_THRESHOLD", "60"),
            ("CERTICHAIN_APP_URL", "https://certs.example.edu"),
            ("CERTICHAIN_ALLOW_UNAUTHENTICATED_SIGNING", "false"),
        ])
        .unwrap();
        assert_eq!(config.trust_threshold, 60);
        assert!(!config.allow_unauthenticated_signing);
        assert_eq!(config.issuance_settings().app_url, "https://certs.example.edu");
    }

    #[test]
    fn test_threshold_above_100_is_rejected() {
        let err = load_with(&[("CERTICHAIN_TRUST_THRESHOLD", "101")]).unwrap_err();
        assert!(matches!(err, ConfigError::ThresholdOutOfRange(101)));
    }

    #[test]
    fn test_issuer_key_hex() {
        let config = load_with(&[(
            "CERTICHAIN_ISSUER_PRIVATE_KEY",
            "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
        )])
        .unwrap();
        assert_eq!(config.issuer_key_bytes().unwrap().map(|k| k.len()), Some(32));

        let err = load_with(&[("CERTICHAIN_ISSUER_PRIVATE_KEY", "zz")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIssuerKey(_)));
    }
}
