//! Bank panel and wallet routes.

use axum::extract::State;
use axum::response::Json;

use crate::services::banks::BankView;
use crate::state::AppState;
use crate::wallet::WalletStatus;

/// `GET /api/banks`: last stored bank view. Does not touch the ledger.
pub async fn get_banks(State(state): State<AppState>) -> Json<BankView> {
    Json(state.banks.read().await.clone())
}

/// `POST /api/banks/refresh`: re-read both banks and return the new view.
///
/// Read failures are part of the view, so this always answers 200.
pub async fn refresh_banks(State(state): State<AppState>) -> Json<BankView> {
    Json(state.reader.refresh(&state.banks).await)
}

/// `GET /api/wallet`: whether a wallet is connected, and its key.
pub async fn wallet(State(state): State<AppState>) -> Json<WalletStatus> {
    Json(WalletStatus::of(state.reader.wallet()))
}

#[cfg(test)]
#[path = "banks_test.rs"]
mod tests;
