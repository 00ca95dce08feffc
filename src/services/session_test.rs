use std::sync::Arc;

use super::*;
use crate::services::assistant::{GENERIC_APOLOGY, GREETING};
use crate::services::questionnaire::SUBMIT_FAILED;
use crate::state::FlowState;
use crate::state::test_helpers::{
    MockLedger, MockNlu, MockSurvey, RAY_ACCOUNT, bank_bytes, seed_session, test_app_state, test_app_state_with,
};

fn answers() -> SurveyAnswers {
    SurveyAnswers {
        managing_liquidity: "split across pools".into(),
        liquidation_strategies: "keep health above 1.5".into(),
        token_pledge: "RAY".into(),
    }
}

// =========================================================================
// conversation
// =========================================================================

#[tokio::test]
async fn create_session_opens_with_greeting() {
    let state = test_app_state();
    let (id, conversation) = create_session(&state).await;
    assert_eq!(conversation.messages().len(), 1);
    assert_eq!(conversation.messages()[0].role, Role::Assistant);
    assert_eq!(conversation.messages()[0].content, GREETING);
    assert!(state.sessions.read().await.contains_key(&id));
}

#[tokio::test]
async fn each_turn_appends_user_then_assistant() {
    let state = test_app_state();
    let id = seed_session(&state).await;

    for text in ["hello", "again", "third"] {
        let exchange = post_message(&state, id, text).await.unwrap();
        assert_eq!(exchange.user.content, text);
        assert_eq!(exchange.assistant.content, GENERIC_APOLOGY);
    }

    let conversation = conversation(&state, id).await.unwrap();
    let messages = conversation.messages();
    assert_eq!(messages.len(), 1 + 2 * 3);
    assert_eq!(messages[1].content, "hello");
    assert_eq!(messages[3].content, "again");
    for pair in messages[1..].chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
    }
    assert!(messages.windows(2).all(|w| w[0].ts <= w[1].ts));
    assert!(!conversation.is_loading());
}

#[tokio::test]
async fn shortcut_turn_replies_with_balance() {
    let ledger = Arc::new(MockLedger::with_banks(bank_bytes(1, 1), bank_bytes(1, 1)));
    ledger.set_balance(RAY_ACCOUNT, Ok(9.0));
    let nlu = Arc::new(MockNlu::default());
    let state = test_app_state_with(ledger, Some(nlu.clone()), Arc::new(MockSurvey::new(Ok("ok".into()))));
    let id = seed_session(&state).await;

    let exchange = post_message(&state, id, "RAY").await.unwrap();
    assert_eq!(exchange.assistant.content, "Your RAY balance is: 9");
    assert!(nlu.queries().is_empty());
}

#[tokio::test]
async fn blank_message_is_rejected_and_not_appended() {
    let state = test_app_state();
    let id = seed_session(&state).await;

    let err = post_message(&state, id, "   \n").await.unwrap_err();
    assert!(matches!(err, SessionError::EmptyMessage));
    assert_eq!(err.error_code(), "E_EMPTY_MESSAGE");
    assert_eq!(conversation(&state, id).await.unwrap().messages().len(), 1);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let state = test_app_state();
    let missing = Uuid::new_v4();

    let err = post_message(&state, missing, "hi").await.unwrap_err();
    assert!(matches!(err, SessionError::NotFound(id) if id == missing));
    assert_eq!(err.kind(), FailureKind::NotFound);
    assert!(conversation(&state, missing).await.is_err());
    assert!(questionnaire(&state, missing).await.is_err());
    assert!(submit_survey(&state, missing, &answers()).await.is_err());
}

#[tokio::test]
async fn sessions_are_isolated() {
    let state = test_app_state();
    let a = seed_session(&state).await;
    let b = seed_session(&state).await;
    post_message(&state, a, "hello").await.unwrap();
    assert_eq!(conversation(&state, a).await.unwrap().messages().len(), 3);
    assert_eq!(conversation(&state, b).await.unwrap().messages().len(), 1);
}

// =========================================================================
// questionnaire
// =========================================================================

#[tokio::test]
async fn survey_success_records_answer() {
    let survey = Arc::new(MockSurvey::new(Ok("Diversify across pools.".into())));
    let ledger = Arc::new(MockLedger::default());
    let state = test_app_state_with(ledger, None, survey.clone());
    let id = seed_session(&state).await;

    let result = submit_survey(&state, id, &answers()).await.unwrap();
    assert!(!result.is_submitting);
    assert_eq!(result.answer(), Some("Diversify across pools."));
    assert_eq!(survey.submitted.lock().unwrap().as_slice(), &[answers()]);
    assert_eq!(questionnaire(&state, id).await.unwrap(), result);
}

#[tokio::test]
async fn survey_rejection_takes_failure_path() {
    let ledger = Arc::new(MockLedger::default());
    let state = test_app_state_with(ledger, None, Arc::new(MockSurvey::new(Err(500))));
    let id = seed_session(&state).await;

    let result = submit_survey(&state, id, &answers()).await.unwrap();
    assert!(!result.is_submitting);
    assert_eq!(result.response, FlowState::Failed(SUBMIT_FAILED.to_string()));
    assert_eq!(result.answer(), None);
}

#[tokio::test]
async fn fresh_questionnaire_is_idle() {
    let state = test_app_state();
    let id = seed_session(&state).await;
    let q = questionnaire(&state, id).await.unwrap();
    assert!(!q.is_submitting);
    assert_eq!(q.response, FlowState::Idle);
}

// =========================================================================
// lifecycle
// =========================================================================

#[tokio::test]
async fn delete_session_frees_the_entry() {
    let state = test_app_state();
    let mut ids = Vec::new();
    for _ in 0..50 {
        ids.push(create_session(&state).await.0);
    }
    assert_eq!(state.sessions.read().await.len(), 50);

    for id in &ids {
        delete_session(&state, *id).await.unwrap();
    }
    assert!(state.sessions.read().await.is_empty());
    assert!(matches!(conversation(&state, ids[0]).await, Err(SessionError::NotFound(_))));
}

#[tokio::test]
async fn delete_unknown_session_is_not_found() {
    let state = test_app_state();
    let keep = seed_session(&state).await;
    let err = delete_session(&state, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, SessionError::NotFound(_)));
    assert!(state.sessions.read().await.contains_key(&keep));
}
