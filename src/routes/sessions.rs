//! Chat and questionnaire routes, scoped to a session.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiError;
use crate::services::questionnaire::Questionnaire;
use crate::services::session::{self, Exchange};
use crate::state::{AppState, Conversation};
use crate::survey::SurveyAnswers;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub conversation: Conversation,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageBody {
    pub content: String,
}

/// `POST /api/sessions`: open a session with the greeting.
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionResponse>) {
    let (id, conversation) = session::create_session(&state).await;
    (StatusCode::CREATED, Json(SessionResponse { id, conversation }))
}

/// `DELETE /api/sessions/:id`: end a session.
pub async fn delete_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    session::delete_session(&state, id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|e| ApiError::from_error(&e))
}

/// `GET /api/sessions/:id/messages`: full conversation in display order.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Conversation>, ApiError> {
    session::conversation(&state, id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_error(&e))
}

/// `POST /api/sessions/:id/messages`: one chat turn.
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<PostMessageBody>,
) -> Result<Json<Exchange>, ApiError> {
    session::post_message(&state, id, &body.content)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_error(&e))
}

/// `GET /api/sessions/:id/survey`: questionnaire state.
pub async fn get_survey(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Questionnaire>, ApiError> {
    session::questionnaire(&state, id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_error(&e))
}

/// `POST /api/sessions/:id/survey`: submit answers.
///
/// A rejected submission is reported inside the questionnaire state with 200.
pub async fn submit_survey(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(answers): Json<SurveyAnswers>,
) -> Result<Json<Questionnaire>, ApiError> {
    session::submit_survey(&state, id, &answers)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_error(&e))
}

#[cfg(test)]
#[path = "sessions_test.rs"]
mod tests;
