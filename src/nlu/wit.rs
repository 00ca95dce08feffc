//! Wit.ai message API client.
//!
//! `GET <base>?v=<version>&q=<text>` with a bearer token. Pure parsing in
//! `parse_response` for testability.

use tracing::debug;

use super::IntentParser;
use super::types::{IntentResult, NluError};
use crate::config::NluConfig;

pub struct WitClient {
    http: reqwest::Client,
    base_url: String,
    version: String,
    token: String,
}

impl WitClient {
    #[must_use]
    pub fn new(http: reqwest::Client, config: NluConfig) -> Self {
        Self { http, base_url: config.base_url, version: config.version, token: config.token }
    }

    fn request(&self, text: &str) -> reqwest::RequestBuilder {
        self.http
            .get(&self.base_url)
            .query(&[("v", self.version.as_str()), ("q", text)])
            .bearer_auth(&self.token)
    }
}

#[async_trait::async_trait]
impl IntentParser for WitClient {
    async fn parse(&self, text: &str) -> Result<IntentResult, NluError> {
        let response = self
            .request(text)
            .send()
            .await
            .map_err(|e| NluError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| NluError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(NluError::ApiResponse { status, body });
        }

        debug!(response = %body, "nlu: full response");
        parse_response(&body)
    }
}

fn parse_response(json: &str) -> Result<IntentResult, NluError> {
    serde_json::from_str(json).map_err(|e| NluError::Parse(e.to_string()))
}
