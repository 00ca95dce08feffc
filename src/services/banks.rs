//! Account-balance reader: bank share figures from on-chain accounts.
//!
//! DESIGN
//! ======
//! Reads both fixed bank accounts in sequence, decodes each with the `Bank`
//! schema and extracts the asset/liability share totals. The view is only
//! written once both accounts decode cleanly; any failure resets both
//! snapshots to zero and records a single error message. No retries.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::{RAY_BANK, WIF_BANK};
use crate::error::{ErrorCode, FailureKind};
use crate::ledger::{LedgerError, LedgerRpc};
use crate::schema::{AccountDecoder, FieldValue, Record, SchemaError};
use crate::state::FlowState;
use crate::tokens::TokenSymbol;
use crate::wallet::{Wallet, WalletError};

pub const BANK_SCHEMA: &str = "Bank";
pub const ASSET_SHARES_FIELD: &str = "totalAssetShares";
pub const LIABILITY_SHARES_FIELD: &str = "totalLiabilityShares";

/// Bank accounts read by the service, in read order.
pub const TRACKED_BANKS: [(TokenSymbol, &str); 2] = [(TokenSymbol::Ray, RAY_BANK), (TokenSymbol::Wif, WIF_BANK)];

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BankReadError {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("{0} Bank account not found")]
    AccountMissing(TokenSymbol),
    #[error("{symbol} Bank field {field} is not a non-negative integer")]
    NotNumeric { symbol: TokenSymbol, field: &'static str },
}

impl ErrorCode for BankReadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Wallet(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Schema(e) => e.error_code(),
            Self::AccountMissing(_) => "E_BANK_NOT_FOUND",
            Self::NotNumeric { .. } => "E_BANK_FIELD_NOT_NUMERIC",
        }
    }

    fn kind(&self) -> FailureKind {
        match self {
            Self::Wallet(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
            Self::Schema(e) => e.kind(),
            Self::AccountMissing(_) => FailureKind::NotFound,
            Self::NotNumeric { .. } => FailureKind::Decode,
        }
    }
}

/// Share totals of one bank, as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSnapshot {
    pub asset_shares: String,
    pub liability_shares: String,
}

impl AccountSnapshot {
    #[must_use]
    pub fn zero() -> Self {
        Self { asset_shares: "0".into(), liability_shares: "0".into() }
    }
}

impl Default for AccountSnapshot {
    fn default() -> Self {
        Self::zero()
    }
}

/// What the bank panel shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankView {
    pub ray: AccountSnapshot,
    pub wif: AccountSnapshot,
    pub error: Option<String>,
    pub status: FlowState<()>,
}

impl BankView {
    #[must_use]
    pub fn new() -> Self {
        Self { ray: AccountSnapshot::zero(), wif: AccountSnapshot::zero(), error: None, status: FlowState::Idle }
    }

    /// Replace both snapshots wholesale, or reset both on failure.
    pub fn apply(&mut self, result: Result<(AccountSnapshot, AccountSnapshot), BankReadError>) {
        match result {
            Ok((ray, wif)) => {
                self.ray = ray;
                self.wif = wif;
                self.error = None;
                self.status = FlowState::Success(());
            }
            Err(e) => {
                let message = e.to_string();
                self.ray = AccountSnapshot::zero();
                self.wif = AccountSnapshot::zero();
                self.error = Some(message.clone());
                self.status = FlowState::Failed(message);
            }
        }
    }
}

impl Default for BankView {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// READER
// =============================================================================

pub struct BankReader {
    ledger: Arc<dyn LedgerRpc>,
    decoder: Arc<dyn AccountDecoder>,
    wallet: Option<Arc<dyn Wallet>>,
}

impl BankReader {
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerRpc>, decoder: Arc<dyn AccountDecoder>, wallet: Option<Arc<dyn Wallet>>) -> Self {
        Self { ledger, decoder, wallet }
    }

    #[must_use]
    pub fn wallet(&self) -> Option<&dyn Wallet> {
        self.wallet.as_deref()
    }

    /// Read and decode both banks. Fails as a whole if either read fails.
    ///
    /// # Errors
    ///
    /// Returns a [`BankReadError`] if no wallet is connected, an account is
    /// missing, the node is unreachable, or a record lacks a share field.
    pub async fn read(&self) -> Result<(AccountSnapshot, AccountSnapshot), BankReadError> {
        let wallet = self.wallet.as_ref().ok_or(WalletError::NotFound)?;
        info!(wallet = wallet.public_key(), "banks: reading bank accounts");

        let [(ray_symbol, ray_address), (wif_symbol, wif_address)] = TRACKED_BANKS;
        let ray = self.read_bank(ray_symbol, ray_address).await?;
        let wif = self.read_bank(wif_symbol, wif_address).await?;
        Ok((ray, wif))
    }

    async fn read_bank(&self, symbol: TokenSymbol, address: &str) -> Result<AccountSnapshot, BankReadError> {
        let data = self
            .ledger
            .get_account_info(address)
            .await?
            .ok_or(BankReadError::AccountMissing(symbol))?;
        let record = self.decoder.decode_account(BANK_SCHEMA, &data)?;
        snapshot_from_record(symbol, &record)
    }

    /// Run one read and store the outcome in `view`. Returns the new view.
    pub async fn refresh(&self, view: &RwLock<BankView>) -> BankView {
        view.write().await.status = FlowState::Loading;

        let result = self.read().await;
        if let Err(e) = &result {
            warn!(error = %e, code = e.error_code(), kind = ?e.kind(), "banks: read failed");
        }

        let mut guard = view.write().await;
        guard.apply(result);
        guard.clone()
    }
}

fn snapshot_from_record(symbol: TokenSymbol, record: &Record) -> Result<AccountSnapshot, BankReadError> {
    Ok(AccountSnapshot {
        asset_shares: numeric_field(symbol, record, ASSET_SHARES_FIELD)?,
        liability_shares: numeric_field(symbol, record, LIABILITY_SHARES_FIELD)?,
    })
}

fn numeric_field(symbol: TokenSymbol, record: &Record, field: &'static str) -> Result<String, BankReadError> {
    match record.require(field)? {
        FieldValue::Unsigned(v) => Ok(v.to_string()),
        FieldValue::Signed(v) if *v >= 0 => Ok(v.to_string()),
        _ => Err(BankReadError::NotNumeric { symbol, field }),
    }
}

#[cfg(test)]
#[path = "banks_test.rs"]
mod tests;
