//! Connected wallet identity.
//!
//! The service never signs anything; it only needs to know which wallet is
//! connected before reading program accounts on its behalf.

use serde::Serialize;

use crate::error::{ErrorCode, FailureKind};

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("wallet not found")]
    NotFound,
}

impl ErrorCode for WalletError {
    fn error_code(&self) -> &'static str {
        "E_WALLET_NOT_FOUND"
    }

    fn kind(&self) -> FailureKind {
        FailureKind::Configuration
    }
}

pub trait Wallet: Send + Sync {
    fn public_key(&self) -> &str;
}

/// Wallet identified by a public key supplied through configuration.
#[derive(Debug, Clone)]
pub struct ConfiguredWallet {
    public_key: String,
}

impl ConfiguredWallet {
    #[must_use]
    pub fn new(public_key: impl Into<String>) -> Self {
        Self { public_key: public_key.into() }
    }
}

impl Wallet for ConfiguredWallet {
    fn public_key(&self) -> &str {
        &self.public_key
    }
}

/// Wallet connection as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletStatus {
    pub connected: bool,
    pub public_key: Option<String>,
}

impl WalletStatus {
    #[must_use]
    pub fn of(wallet: Option<&dyn Wallet>) -> Self {
        Self { connected: wallet.is_some(), public_key: wallet.map(|w| w.public_key().to_string()) }
    }
}
