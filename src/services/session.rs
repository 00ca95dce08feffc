//! Session service: conversation and questionnaire flows per visitor.
//!
//! DESIGN
//! ======
//! The sessions lock is never held across a network call. A chat turn
//! appends the user message and raises the loading flag, releases the lock
//! while the assistant works, then appends the reply and clears the flag.
//! Overlapping turns in one session are neither cancelled nor coalesced.

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{ErrorCode, FailureKind};
use crate::services::questionnaire::Questionnaire;
use crate::state::{AppState, ChatMessage, Conversation, Role, Session};
use crate::survey::SurveyAnswers;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(Uuid),
    #[error("message is empty")]
    EmptyMessage,
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_SESSION_NOT_FOUND",
            Self::EmptyMessage => "E_EMPTY_MESSAGE",
        }
    }

    fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound(_) => FailureKind::NotFound,
            Self::EmptyMessage => FailureKind::UnrecognizedInput,
        }
    }
}

/// The pair of messages one chat turn appends.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub user: ChatMessage,
    pub assistant: ChatMessage,
}

pub async fn create_session(state: &AppState) -> (Uuid, Conversation) {
    let session = Session::new();
    let id = session.id;
    let conversation = session.conversation.clone();
    state.sessions.write().await.insert(id, session);
    info!(%id, "session: created");
    (id, conversation)
}

/// Drop a session and everything it owns.
///
/// # Errors
///
/// Returns [`SessionError::NotFound`] for an unknown session.
pub async fn delete_session(state: &AppState, id: Uuid) -> Result<(), SessionError> {
    state.sessions.write().await.remove(&id).ok_or(SessionError::NotFound(id))?;
    info!(%id, "session: deleted");
    Ok(())
}

/// # Errors
///
/// Returns [`SessionError::NotFound`] for an unknown session.
pub async fn conversation(state: &AppState, id: Uuid) -> Result<Conversation, SessionError> {
    let sessions = state.sessions.read().await;
    sessions
        .get(&id)
        .map(|s| s.conversation.clone())
        .ok_or(SessionError::NotFound(id))
}

/// Run one chat turn.
///
/// # Errors
///
/// Returns [`SessionError::EmptyMessage`] for blank input (nothing is
/// appended) or [`SessionError::NotFound`] for an unknown session.
pub async fn post_message(state: &AppState, id: Uuid, content: &str) -> Result<Exchange, SessionError> {
    if content.trim().is_empty() {
        return Err(SessionError::EmptyMessage);
    }

    let user = {
        let mut sessions = state.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        if session.conversation.is_loading() {
            info!(%id, "session: turn started while a reply is in flight");
        }
        let message = session.conversation.push(Role::User, content);
        session.conversation.begin_reply();
        message
    };

    let reply = state.assistant.reply(content).await;
    info!(%id, branch = ?reply.branch, "session: assistant replied");

    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
    let assistant = session.conversation.push(Role::Assistant, reply.text);
    session.conversation.finish_reply();
    Ok(Exchange { user, assistant })
}

/// # Errors
///
/// Returns [`SessionError::NotFound`] for an unknown session.
pub async fn questionnaire(state: &AppState, id: Uuid) -> Result<Questionnaire, SessionError> {
    let sessions = state.sessions.read().await;
    sessions
        .get(&id)
        .map(|s| s.questionnaire.clone())
        .ok_or(SessionError::NotFound(id))
}

/// Submit questionnaire answers and record the outcome.
///
/// # Errors
///
/// Returns [`SessionError::NotFound`] for an unknown session. Submission
/// failures are recorded in the returned state, not returned as errors.
pub async fn submit_survey(state: &AppState, id: Uuid, answers: &SurveyAnswers) -> Result<Questionnaire, SessionError> {
    {
        let mut sessions = state.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        session.questionnaire.begin();
    }

    let result = state.survey.submit(answers).await;
    info!(%id, ok = result.is_ok(), "session: survey submitted");

    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
    session.questionnaire.finish(result);
    Ok(session.questionnaire.clone())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
