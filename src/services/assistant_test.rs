use super::*;
use crate::state::test_helpers::{MockLedger, MockNlu, RAY_ACCOUNT, WIF_ACCOUNT, token_accounts};
use serde_json::json;

fn assistant(ledger: &Arc<MockLedger>, nlu: Option<&Arc<MockNlu>>) -> Assistant {
    let nlu = nlu.map(|n| n.clone() as Arc<dyn IntentParser>);
    Assistant::new(ledger.clone(), nlu, token_accounts())
}

fn entity(value: serde_json::Value) -> serde_json::Value {
    json!([{ "value": value, "confidence": 0.9, "body": "x" }])
}

// =========================================================================
// shortcuts
// =========================================================================

#[tokio::test]
async fn shortcut_fetches_balance_without_nlu() {
    let ledger = Arc::new(MockLedger::default());
    ledger.set_balance(RAY_ACCOUNT, Ok(12.5));
    let nlu = Arc::new(MockNlu::default());
    let reply = assistant(&ledger, Some(&nlu)).reply("ray").await;

    assert_eq!(reply.branch, Branch::Shortcut(TokenSymbol::Ray));
    assert_eq!(reply.text, "Your RAY balance is: 12.5");
    assert!(nlu.queries().is_empty());
    assert_eq!(ledger.calls(), vec![format!("getTokenAccountBalance:{RAY_ACCOUNT}")]);
}

#[tokio::test]
async fn shortcut_ignores_case_and_whitespace() {
    let ledger = Arc::new(MockLedger::default());
    ledger.set_balance(WIF_ACCOUNT, Ok(3.0));
    let nlu = Arc::new(MockNlu::default());
    let reply = assistant(&ledger, Some(&nlu)).reply("  WIF ").await;

    assert_eq!(reply.branch, Branch::Shortcut(TokenSymbol::Wif));
    assert_eq!(reply.text, "Your WIF balance is: 3");
    assert!(nlu.queries().is_empty());
}

#[tokio::test]
async fn shortcut_fetch_failure_uses_fetch_error_template() {
    let ledger = Arc::new(MockLedger::default());
    ledger.set_balance(RAY_ACCOUNT, Err("timeout".into()));
    let reply = assistant(&ledger, None).reply("ray").await;
    assert_eq!(reply.text, "Sorry, I couldn't fetch your RAY balance at the moment.");
}

#[tokio::test]
async fn shortcut_without_token_account_uses_fetch_error_template() {
    let ledger = Arc::new(MockLedger::default());
    let assistant = Assistant::new(ledger.clone(), None, TokenAccounts::default());
    let reply = assistant.reply("wif").await;
    assert_eq!(reply.text, "Sorry, I couldn't fetch your WIF balance at the moment.");
    assert!(ledger.calls().is_empty());
}

#[tokio::test]
async fn longer_text_mentioning_token_goes_to_nlu() {
    let ledger = Arc::new(MockLedger::default());
    let nlu = Arc::new(MockNlu::default());
    assistant(&ledger, Some(&nlu)).reply(" my ray please ").await;
    assert_eq!(nlu.queries(), vec!["my ray please".to_string()]);
}

// =========================================================================
// NLU dispatch
// =========================================================================

#[tokio::test]
async fn no_intents_is_not_understood() {
    let ledger = Arc::new(MockLedger::default());
    let nlu = Arc::new(MockNlu::replying(json!({ "text": "hmm", "intents": [] })));
    let reply = assistant(&ledger, Some(&nlu)).reply("hmm").await;
    assert_eq!(reply.branch, Branch::NoIntent);
    assert_eq!(reply.text, NOT_UNDERSTOOD);
}

#[tokio::test]
async fn balance_intent_uses_transfer_token_entity() {
    let ledger = Arc::new(MockLedger::default());
    ledger.set_balance(RAY_ACCOUNT, Ok(42.0));
    let nlu = Arc::new(MockNlu::replying(json!({
        "text": "what's my ray balance",
        "intents": [{ "name": "balance", "confidence": 0.97 }],
        "entities": { "transfer_token:transfer_token": entity(json!("ray")) }
    })));
    let reply = assistant(&ledger, Some(&nlu)).reply("what's my ray balance").await;
    assert_eq!(reply.branch, Branch::Balance);
    assert_eq!(reply.text, "Your RAY balance is: 42");
}

#[tokio::test]
async fn balance_intent_fetch_failure_uses_fetch_error_template() {
    let ledger = Arc::new(MockLedger::default());
    ledger.set_balance(RAY_ACCOUNT, Err("down".into()));
    let nlu = Arc::new(MockNlu::replying(json!({
        "intents": [{ "name": "balance", "confidence": 0.95 }],
        "entities": { "transfer_token:transfer_token": entity(json!("ray")) }
    })));
    let reply = assistant(&ledger, Some(&nlu)).reply("ray balance please").await;
    assert_eq!(reply.branch, Branch::Balance);
    assert_eq!(reply.text, "Sorry, I couldn't fetch your RAY balance at the moment.");
    assert_eq!(ledger.calls(), vec![format!("getTokenAccountBalance:{RAY_ACCOUNT}")]);
}

#[tokio::test]
async fn balance_intent_falls_back_to_balance_token_entity() {
    let ledger = Arc::new(MockLedger::default());
    ledger.set_balance(WIF_ACCOUNT, Ok(0.25));
    let nlu = Arc::new(MockNlu::replying(json!({
        "intents": [{ "name": "balance", "confidence": 0.9 }],
        "entities": { "balance_token:balance_token": entity(json!("WIF")) }
    })));
    let reply = assistant(&ledger, Some(&nlu)).reply("how much wif").await;
    assert_eq!(reply.text, "Your WIF balance is: 0.25");
}

#[tokio::test]
async fn balance_intent_without_token_asks_which() {
    let ledger = Arc::new(MockLedger::default());
    let nlu = Arc::new(MockNlu::replying(json!({
        "intents": [{ "name": "balance", "confidence": 0.9 }]
    })));
    let reply = assistant(&ledger, Some(&nlu)).reply("balance").await;
    assert_eq!(reply.text, ASK_FOR_TOKEN);
    assert!(ledger.calls().is_empty());
}

#[tokio::test]
async fn balance_intent_with_untracked_token_asks_which() {
    let ledger = Arc::new(MockLedger::default());
    let nlu = Arc::new(MockNlu::replying(json!({
        "intents": [{ "name": "balance", "confidence": 0.9 }],
        "entities": { "transfer_token:transfer_token": entity(json!("bonk")) }
    })));
    let reply = assistant(&ledger, Some(&nlu)).reply("bonk balance").await;
    assert_eq!(reply.text, ASK_FOR_TOKEN);
}

#[tokio::test]
async fn transfer_intent_formats_template_without_ledger_call() {
    let ledger = Arc::new(MockLedger::default());
    let nlu = Arc::new(MockNlu::replying(json!({
        "intents": [{ "name": "transfer", "confidence": 0.99 }],
        "entities": {
            "amount:amount": entity(json!(5)),
            "transfer_token:transfer_token": entity(json!("wif")),
            "to_addr:to_addr": entity(json!("abc"))
        }
    })));
    let reply = assistant(&ledger, Some(&nlu)).reply("send 5 wif to abc").await;
    assert_eq!(reply.branch, Branch::Transfer);
    assert_eq!(reply.text, "I'll help you transfer 5 wif to abc. (Implementation pending)");
    assert!(ledger.calls().is_empty());
}

#[tokio::test]
async fn transfer_intent_missing_entities_leaves_blanks() {
    let ledger = Arc::new(MockLedger::default());
    let nlu = Arc::new(MockNlu::replying(json!({
        "intents": [{ "name": "transfer", "confidence": 0.8 }]
    })));
    let reply = assistant(&ledger, Some(&nlu)).reply("send").await;
    assert_eq!(reply.text, "I'll help you transfer   to . (Implementation pending)");
}

#[tokio::test]
async fn only_first_intent_counts() {
    let ledger = Arc::new(MockLedger::default());
    let nlu = Arc::new(MockNlu::replying(json!({
        "intents": [
            { "name": "swap", "confidence": 0.6 },
            { "name": "balance", "confidence": 0.5 }
        ]
    })));
    let reply = assistant(&ledger, Some(&nlu)).reply("swap it").await;
    assert_eq!(reply.branch, Branch::UnknownIntent);
    assert_eq!(reply.text, UNHANDLED_INTENT);
}

#[tokio::test]
async fn nlu_error_is_generic_apology() {
    let ledger = Arc::new(MockLedger::default());
    let nlu = Arc::new(MockNlu::new(vec![Err(NluError::ApiResponse { status: 500, body: "boom".into() })]));
    let reply = assistant(&ledger, Some(&nlu)).reply("hello").await;
    assert_eq!(reply.branch, Branch::Failed);
    assert_eq!(reply.text, GENERIC_APOLOGY);
}

#[tokio::test]
async fn missing_nlu_is_generic_apology() {
    let ledger = Arc::new(MockLedger::default());
    let reply = assistant(&ledger, None).reply("hello").await;
    assert_eq!(reply.branch, Branch::Failed);
    assert_eq!(reply.text, GENERIC_APOLOGY);
}
