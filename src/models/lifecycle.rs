// src/models/lifecycle.rs
//! Certificate issuance lifecycle.
//!
//! ```text
//! created -> canonicalized -> signed -> mint_requested -> minted      -> verifiable
//!                                                     \-> mint_failed -/
//! ```
//!
//! A pending mint leaves the lifecycle in `mint_requested`; it may still be
//! published. `verifiable` is terminal and verification never leaves it.
//! There are no backward transitions, so a record can only ever be signed
//! once.

use crate::error::LifecycleError;
use crate::models::certificate::MintStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Created,
    Canonicalized,
    Signed,
    MintRequested,
    Minted,
    MintFailed,
    Verifiable,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Created => "created",
            LifecycleState::Canonicalized => "canonicalized",
            LifecycleState::Signed => "signed",
            LifecycleState::MintRequested => "mint_requested",
            LifecycleState::Minted => "minted",
            LifecycleState::MintFailed => "mint_failed",
            LifecycleState::Verifiable => "verifiable",
        };
        f.write_str(name)
    }
}

/// Tracks one record through issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Lifecycle {
            state: LifecycleState::Created,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn canonicalize(&mut self) -> Result<(), LifecycleError> {
        self.step(LifecycleState::Created, LifecycleState::Canonicalized, "canonicalize")
    }

    pub fn sign(&mut self) -> Result<(), LifecycleError> {
        self.step(LifecycleState::Canonicalized, LifecycleState::Signed, "sign")
    }

    pub fn request_mint(&mut self) -> Result<(), LifecycleError> {
        self.step(LifecycleState::Signed, LifecycleState::MintRequested, "request mint for")
    }

    /// Applies the status reported by the minting collaborator.
    pub fn record_mint(&mut self, status: MintStatus) -> Result<(), LifecycleError> {
        match (self.state, status) {
            (LifecycleState::MintRequested, MintStatus::Minted) => {
                self.state = LifecycleState::Minted;
                Ok(())
            }
            (LifecycleState::MintRequested, MintStatus::Failed) => {
                self.state = LifecycleState::MintFailed;
                Ok(())
            }
            (LifecycleState::MintRequested, MintStatus::Pending) => Ok(()),
            (from, _) => Err(LifecycleError::InvalidTransition {
                from,
                action: "record mint outcome for",
            }),
        }
    }

    pub fn publish(&mut self) -> Result<(), LifecycleError> {
        match self.state {
            LifecycleState::MintRequested | LifecycleState::Minted | LifecycleState::MintFailed => {
                self.state = LifecycleState::Verifiable;
                Ok(())
            }
            from => Err(LifecycleError::InvalidTransition {
                from,
                action: "publish",
            }),
        }
    }

    fn step(
        &mut self,
        expected: LifecycleState,
        next: LifecycleState,
        action: &'static str,
    ) -> Result<(), LifecycleError> {
        if self.state != expected {
            return Err(LifecycleError::InvalidTransition {
                from: self.state,
                action,
            });
        }
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed() -> Lifecycle {
        let mut lifecycle = Lifecycle::new();
        lifecycle.canonicalize().unwrap();
        lifecycle.sign().unwrap();
        lifecycle
    }

    #[test]
    fn test_happy_path_reaches_verifiable() {
        let mut lifecycle = signed();
        lifecycle.request_mint().unwrap();
        lifecycle.record_mint(MintStatus::Minted).unwrap();
        assert_eq!(lifecycle.state(), LifecycleState::Minted);
        lifecycle.publish().unwrap();
        assert_eq!(lifecycle.state(), LifecycleState::Verifiable);
    }

    #[test]
    fn test_failed_and_pending_mints_still_publish() {
        let mut failed = signed();
        failed.request_mint().unwrap();
        failed.record_mint(MintStatus::Failed).unwrap();
        assert_eq!(failed.state(), LifecycleState::MintFailed);
        failed.publish().unwrap();

        let mut pending = signed();
        pending.request_mint().unwrap();
        pending.record_mint(MintStatus::Pending).unwrap();
        assert_eq!(pending.state(), LifecycleState::MintRequested);
        pending.publish().unwrap();
        assert_eq!(pending.state(), LifecycleState::Verifiable);
    }

    #[test]
    fn test_cannot_sign_twice() {
        let mut lifecycle = signed();
        let err = lifecycle.sign().unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                from: LifecycleState::Signed,
                action: "sign"
            }
        );
    }

    #[test]
    fn test_cannot_skip_or_roll_back() {
        let mut lifecycle = Lifecycle::new();
        assert!(lifecycle.sign().is_err());
        assert!(lifecycle.publish().is_err());

        let mut published = signed();
        published.request_mint().unwrap();
        published.publish().unwrap();
        assert!(published.canonicalize().is_err());
        assert!(published.record_mint(MintStatus::Minted).is_err());
        assert!(published.publish().is_err());
        assert_eq!(published.state(), LifecycleState::Verifiable);
    }

    #[test]
    fn test_unminted_is_not_a_mint_outcome() {
        let mut lifecycle = signed();
        lifecycle.request_mint().unwrap();
        assert!(lifecycle.record_mint(MintStatus::Unminted).is_err());
    }
}
