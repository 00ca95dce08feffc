//! Relevance studio trigger client.

use serde::{Deserialize, Serialize};

use super::{DEFAULT_ANSWER, SurveyAnswers, SurveyError, SurveySubmitter};
use crate::config::SurveyConfig;

pub struct RelevanceClient {
    http: reqwest::Client,
    url: String,
    project_id: String,
}

impl RelevanceClient {
    #[must_use]
    pub fn new(http: reqwest::Client, config: SurveyConfig) -> Self {
        Self { http, url: config.url, project_id: config.project_id }
    }
}

#[async_trait::async_trait]
impl SurveySubmitter for RelevanceClient {
    async fn submit(&self, answers: &SurveyAnswers) -> Result<String, SurveyError> {
        let body = TriggerRequest { params: answers, project: &self.project_id };

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SurveyError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| SurveyError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(SurveyError::Rejected { status, body: text });
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct TriggerRequest<'a> {
    params: &'a SurveyAnswers,
    project: &'a str,
}

#[derive(Deserialize)]
struct TriggerResponse {
    output: TriggerOutput,
}

#[derive(Deserialize)]
struct TriggerOutput {
    #[serde(default)]
    answer: Option<String>,
}

fn parse_response(json: &str) -> Result<String, SurveyError> {
    let parsed: TriggerResponse = serde_json::from_str(json).map_err(|e| SurveyError::Parse(e.to_string()))?;
    Ok(parsed
        .output
        .answer
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| DEFAULT_ANSWER.to_string()))
}
