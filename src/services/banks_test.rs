use super::*;
use crate::config::PROGRAM_ID;
use crate::schema::AnchorCoder;
use crate::state::test_helpers::{MockLedger, bank_bytes, test_wallet};

fn reader(ledger: Arc<MockLedger>) -> BankReader {
    BankReader::new(ledger, Arc::new(AnchorCoder::builtin(PROGRAM_ID)), Some(test_wallet()))
}

fn snapshot(assets: &str, liabilities: &str) -> AccountSnapshot {
    AccountSnapshot { asset_shares: assets.into(), liability_shares: liabilities.into() }
}

// =========================================================================
// read
// =========================================================================

#[tokio::test]
async fn read_decodes_both_banks() {
    let ledger = Arc::new(MockLedger::with_banks(bank_bytes(1_500, 700), bank_bytes(u128::MAX, 0)));
    let (ray, wif) = reader(ledger.clone()).read().await.unwrap();
    assert_eq!(ray, snapshot("1500", "700"));
    assert_eq!(wif, snapshot(&u128::MAX.to_string(), "0"));
    assert_eq!(
        ledger.calls(),
        vec![format!("getAccountInfo:{RAY_BANK}"), format!("getAccountInfo:{WIF_BANK}")]
    );
}

#[tokio::test]
async fn read_without_wallet_fails_before_any_fetch() {
    let ledger = Arc::new(MockLedger::with_banks(bank_bytes(1, 1), bank_bytes(1, 1)));
    let reader = BankReader::new(ledger.clone(), Arc::new(AnchorCoder::builtin(PROGRAM_ID)), None);
    let err = reader.read().await.unwrap_err();
    assert!(matches!(err, BankReadError::Wallet(WalletError::NotFound)));
    assert!(ledger.calls().is_empty());
}

#[tokio::test]
async fn read_missing_account_names_the_bank() {
    let ledger = Arc::new(MockLedger::with_banks(bank_bytes(1, 1), bank_bytes(1, 1)));
    ledger.accounts.lock().unwrap().remove(WIF_BANK);
    let err = reader(ledger).read().await.unwrap_err();
    assert_eq!(err.to_string(), "WIF Bank account not found");
    assert_eq!(err.kind(), FailureKind::NotFound);
}

#[tokio::test]
async fn read_decode_mismatch_is_decode_error() {
    let ledger = Arc::new(MockLedger::with_banks(vec![0u8; 72], bank_bytes(1, 1)));
    let err = reader(ledger).read().await.unwrap_err();
    assert!(matches!(err, BankReadError::Schema(SchemaError::DiscriminatorMismatch(_))));
    assert_eq!(err.kind(), FailureKind::Decode);
}

#[tokio::test]
async fn read_record_without_share_field_fails() {
    use crate::schema::types::FieldKind;
    use crate::schema::anchor::AccountLayout;

    let mut coder = AnchorCoder::builtin(PROGRAM_ID);
    coder.register(AccountLayout::new("Bank", &[("mint", FieldKind::PublicKey), ("totalAssetShares", FieldKind::U128)]));
    let ledger = Arc::new(MockLedger::with_banks(bank_bytes(1, 1), bank_bytes(1, 1)));
    let reader = BankReader::new(ledger, Arc::new(coder), Some(test_wallet()));
    let err = reader.read().await.unwrap_err();
    assert!(matches!(err, BankReadError::Schema(SchemaError::MissingField { .. })));
}

#[test]
fn numeric_field_rejects_public_keys() {
    let mut record = Record { schema: "Bank".into(), fields: std::collections::BTreeMap::new() };
    record.fields.insert(ASSET_SHARES_FIELD.into(), FieldValue::PublicKey([0u8; 32]));
    let err = numeric_field(TokenSymbol::Ray, &record, ASSET_SHARES_FIELD).unwrap_err();
    assert!(matches!(err, BankReadError::NotNumeric { symbol: TokenSymbol::Ray, .. }));
}

#[test]
fn numeric_field_rejects_negative_values() {
    let mut record = Record { schema: "Bank".into(), fields: std::collections::BTreeMap::new() };
    record.fields.insert(LIABILITY_SHARES_FIELD.into(), FieldValue::Signed(-1));
    assert!(numeric_field(TokenSymbol::Wif, &record, LIABILITY_SHARES_FIELD).is_err());
    record.fields.insert(LIABILITY_SHARES_FIELD.into(), FieldValue::Signed(12));
    assert_eq!(numeric_field(TokenSymbol::Wif, &record, LIABILITY_SHARES_FIELD).unwrap(), "12");
}

// =========================================================================
// refresh / apply
// =========================================================================

#[tokio::test]
async fn refresh_success_replaces_both_snapshots() {
    let ledger = Arc::new(MockLedger::with_banks(bank_bytes(10, 4), bank_bytes(20, 8)));
    let view = RwLock::new(BankView::new());
    let result = reader(ledger).refresh(&view).await;
    assert_eq!(result.ray, snapshot("10", "4"));
    assert_eq!(result.wif, snapshot("20", "8"));
    assert_eq!(result.error, None);
    assert_eq!(result.status, FlowState::Success(()));
    assert_eq!(*view.read().await, result);
}

#[tokio::test]
async fn refresh_failure_resets_both_snapshots() {
    let ledger = Arc::new(MockLedger::with_banks(bank_bytes(10, 4), bank_bytes(20, 8)));
    let view = RwLock::new(BankView::new());
    let reader = reader(ledger.clone());
    reader.refresh(&view).await;

    // Only the second bank disappears; the first one must still be zeroed.
    ledger.accounts.lock().unwrap().remove(WIF_BANK);
    let result = reader.refresh(&view).await;
    assert_eq!(result.ray, AccountSnapshot::zero());
    assert_eq!(result.wif, AccountSnapshot::zero());
    assert_eq!(result.error.as_deref(), Some("WIF Bank account not found"));
    assert!(matches!(result.status, FlowState::Failed(_)));
}

#[tokio::test]
async fn refresh_after_failure_clears_error() {
    let ledger = Arc::new(MockLedger::with_banks(bank_bytes(10, 4), bank_bytes(20, 8)));
    *ledger.fail_accounts.lock().unwrap() = true;
    let view = RwLock::new(BankView::new());
    let reader = reader(ledger.clone());
    let failed = reader.refresh(&view).await;
    assert!(failed.error.unwrap().contains("connection refused"));

    *ledger.fail_accounts.lock().unwrap() = false;
    let recovered = reader.refresh(&view).await;
    assert_eq!(recovered.error, None);
    assert_eq!(recovered.ray, snapshot("10", "4"));
}

#[test]
fn new_view_is_zero_and_idle() {
    let view = BankView::default();
    assert_eq!(view.ray, AccountSnapshot::zero());
    assert_eq!(view.wif, AccountSnapshot::zero());
    assert_eq!(view.status, FlowState::Idle);
}

#[test]
fn view_serializes_for_clients() {
    let mut view = BankView::new();
    view.apply(Err(BankReadError::AccountMissing(TokenSymbol::Ray)));
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["ray"], serde_json::json!({ "asset_shares": "0", "liability_shares": "0" }));
    assert_eq!(json["error"], "RAY Bank account not found");
    assert_eq!(json["status"]["status"], "failed");
}
