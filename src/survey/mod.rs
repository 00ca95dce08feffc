//! Survey: forwarding questionnaire answers to a hosted AI workflow.

pub mod relevance;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, FailureKind};

pub use relevance::RelevanceClient;

/// Answer used when the workflow succeeds without producing text.
pub const DEFAULT_ANSWER: &str = "Thank you for your feedback!";

#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    #[error("survey request failed: {0}")]
    Request(String),

    /// Any non-2xx reply. The body is kept for logs only.
    #[error("survey rejected: status {status}")]
    Rejected { status: u16, body: String },

    #[error("survey response parse failed: {0}")]
    Parse(String),
}

impl ErrorCode for SurveyError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_SURVEY_REQUEST",
            Self::Rejected { .. } => "E_SURVEY_REJECTED",
            Self::Parse(_) => "E_SURVEY_PARSE",
        }
    }

    fn kind(&self) -> FailureKind {
        match self {
            Self::Parse(_) => FailureKind::Decode,
            _ => FailureKind::Connectivity,
        }
    }
}

/// The three free-text questionnaire answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAnswers {
    #[serde(default)]
    pub managing_liquidity: String,
    #[serde(default)]
    pub liquidation_strategies: String,
    #[serde(default)]
    pub token_pledge: String,
}

/// Submission capability. Enables mocking in tests.
#[async_trait::async_trait]
pub trait SurveySubmitter: Send + Sync {
    /// Submit answers and return the workflow's answer text.
    ///
    /// # Errors
    ///
    /// Returns a [`SurveyError`] on transport failure, non-2xx status, or a
    /// malformed success body.
    async fn submit(&self, answers: &SurveyAnswers) -> Result<String, SurveyError>;
}
