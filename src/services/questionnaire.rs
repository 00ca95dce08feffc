//! Questionnaire submission state.

use serde::Serialize;
use tracing::warn;

use crate::error::ErrorCode;
use crate::state::FlowState;
use crate::survey::SurveyError;

pub const SUBMIT_FAILED: &str = "Failed to submit survey. Please try again.";

/// `response` is `Success` only after a 2xx reply; every failure collapses
/// into the same message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Questionnaire {
    pub is_submitting: bool,
    pub response: FlowState<String>,
}

impl Questionnaire {
    pub fn begin(&mut self) {
        self.is_submitting = true;
        self.response = FlowState::Loading;
    }

    pub fn finish(&mut self, result: Result<String, SurveyError>) {
        self.is_submitting = false;
        self.response = match result {
            Ok(answer) => FlowState::Success(answer),
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "survey: submission failed");
                FlowState::Failed(SUBMIT_FAILED.to_string())
            }
        };
    }

    /// The AI answer, when one should be shown.
    #[cfg(test)]
    pub fn answer(&self) -> Option<&str> {
        match &self.response {
            FlowState::Success(answer) if !self.is_submitting => Some(answer),
            _ => None,
        }
    }
}
