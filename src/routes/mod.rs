//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the JSON API consumed by the dashboard and the CLI. Bank and wallet
//! routes are process-wide; chat and questionnaire routes are scoped to a
//! session created with `POST /api/sessions` and ended with
//! `DELETE /api/sessions/{id}`.

pub mod banks;
pub mod sessions;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{ErrorBody, ErrorCode, FailureKind};
use crate::state::AppState;

/// Build the full API router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/banks", get(banks::get_banks))
        .route("/api/banks/refresh", post(banks::refresh_banks))
        .route("/api/wallet", get(banks::wallet))
        .route("/api/sessions", post(sessions::create_session))
        .route("/api/sessions/{id}", delete(sessions::delete_session))
        .route(
            "/api/sessions/{id}/messages",
            get(sessions::list_messages).post(sessions::post_message),
        )
        .route(
            "/api/sessions/{id}/survey",
            get(sessions::get_survey).post(sessions::submit_survey),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Error response carrying an `E_*` code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn from_error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { status: status_for(err.kind()), body: ErrorBody::from_error(err) }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub(crate) fn status_for(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::NotFound => StatusCode::NOT_FOUND,
        FailureKind::UnrecognizedInput => StatusCode::BAD_REQUEST,
        FailureKind::Decode => StatusCode::UNPROCESSABLE_ENTITY,
        FailureKind::Connectivity => StatusCode::BAD_GATEWAY,
        FailureKind::Configuration => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::SessionError;

    #[test]
    fn session_errors_map_to_client_statuses() {
        let missing = ApiError::from_error(&SessionError::NotFound(uuid::Uuid::nil()));
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.body.code, "E_SESSION_NOT_FOUND");

        let empty = ApiError::from_error(&SessionError::EmptyMessage);
        assert_eq!(empty.status, StatusCode::BAD_REQUEST);
        assert_eq!(empty.body.code, "E_EMPTY_MESSAGE");
    }

    #[test]
    fn upstream_failures_are_bad_gateway() {
        assert_eq!(status_for(FailureKind::Connectivity), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        assert_eq!(healthz().await, StatusCode::OK);
    }

    #[test]
    fn app_builds_with_test_state() {
        let _router = app(crate::state::test_helpers::test_app_state());
    }
}
