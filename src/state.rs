//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the injected flow services, the bank view written by the
//! balance reader, and a map of live sessions. Each session owns its own
//! append-only conversation and questionnaire state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::services::assistant::{Assistant, GREETING};
use crate::services::banks::{BankReader, BankView};
use crate::services::questionnaire::Questionnaire;
use crate::survey::SurveySubmitter;

// =============================================================================
// FLOW STATE
// =============================================================================

/// Progress of one user-triggered flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum FlowState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Failed(String),
}

impl<T> FlowState<T> {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

// =============================================================================
// CONVERSATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One chat line. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
}

/// Current time as milliseconds since Unix epoch.
fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(i64::MAX)
}

/// Append-only message log. Append order is display order.
///
/// `reply` is `Loading` while an assistant reply is being produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    reply: FlowState<()>,
}

impl Conversation {
    /// Conversation opened by the assistant greeting.
    #[must_use]
    pub fn with_greeting() -> Self {
        let mut conversation = Self::default();
        conversation.push(Role::Assistant, GREETING);
        conversation
    }

    /// Append a message stamped no earlier than the previous one.
    pub fn push(&mut self, role: Role, content: impl Into<String>) -> ChatMessage {
        let last = self.messages.last().map_or(i64::MIN, |m| m.ts);
        let message = ChatMessage { role, content: content.into(), ts: now_ms().max(last) };
        self.messages.push(message.clone());
        message
    }

    #[cfg(test)]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.reply.is_loading()
    }

    pub fn begin_reply(&mut self) {
        self.reply = FlowState::Loading;
    }

    /// The assistant always produces a reply, so a turn never ends `Failed`.
    pub fn finish_reply(&mut self) {
        self.reply = FlowState::Success(());
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Per-visitor state. Lives as long as the server process.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub conversation: Conversation,
    pub questionnaire: Questionnaire,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self { id: Uuid::new_v4(), conversation: Conversation::with_greeting(), questionnaire: Questionnaire::default() }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub reader: Arc<BankReader>,
    pub assistant: Arc<Assistant>,
    pub survey: Arc<dyn SurveySubmitter>,
    pub banks: Arc<RwLock<BankView>>,
    pub sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl AppState {
    #[must_use]
    pub fn new(reader: BankReader, assistant: Assistant, survey: Arc<dyn SurveySubmitter>) -> Self {
        Self {
            reader: Arc::new(reader),
            assistant: Arc::new(assistant),
            survey,
            banks: Arc::new(RwLock::new(BankView::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
