//! NLU types: wire response and errors.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ErrorCode, FailureKind};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum NluError {
    /// No NLU credential is configured.
    #[error("NLU not configured")]
    NotConfigured,

    #[error("NLU request failed: {0}")]
    Request(String),

    #[error("NLU response error: status {status}")]
    ApiResponse { status: u16, body: String },

    #[error("NLU response parse failed: {0}")]
    Parse(String),
}

impl ErrorCode for NluError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_NLU_NOT_CONFIGURED",
            Self::Request(_) => "E_NLU_REQUEST",
            Self::ApiResponse { .. } => "E_NLU_RESPONSE",
            Self::Parse(_) => "E_NLU_PARSE",
        }
    }

    fn kind(&self) -> FailureKind {
        match self {
            Self::NotConfigured => FailureKind::Configuration,
            Self::Request(_) | Self::ApiResponse { .. } => FailureKind::Connectivity,
            Self::Parse(_) => FailureKind::Decode,
        }
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
}

/// One candidate value for an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCandidate {
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub body: Option<String>,
}

/// Parsed NLU response. Intents arrive ranked by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub intents: Vec<Intent>,
    #[serde(default)]
    pub entities: HashMap<String, Vec<EntityCandidate>>,
    #[serde(default)]
    pub traits: HashMap<String, Value>,
}

impl IntentResult {
    /// Highest-ranked intent name as returned by the service.
    #[must_use]
    pub fn top_intent(&self) -> Option<&str> {
        self.intents.first().map(|i| i.name.as_str())
    }

    /// First candidate value of entity `name`, looked up under the key
    /// `"<name>:<name>"`. Empty strings count as absent.
    #[must_use]
    pub fn entity_value(&self, name: &str) -> Option<String> {
        let key = format!("{name}:{name}");
        let candidate = self.entities.get(&key)?.first()?;
        let text = match &candidate.value {
            Value::String(s) => s.clone(),
            Value::Null => return None,
            other => other.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
