//! Ledger types: errors and token amounts.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, FailureKind};

/// Errors produced by ledger client operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The HTTP request to the node failed.
    #[error("ledger request failed: {0}")]
    Request(String),

    /// The node returned a non-success HTTP status.
    #[error("ledger response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The node answered with a JSON-RPC error object.
    #[error("ledger rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The reply could not be parsed.
    #[error("ledger response parse failed: {0}")]
    Parse(String),

    /// No token account is configured for the requested token.
    #[error("no token account configured for {0}")]
    NotConfigured(&'static str),
}

impl ErrorCode for LedgerError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_LEDGER_REQUEST",
            Self::ApiResponse { .. } => "E_LEDGER_RESPONSE",
            Self::Rpc { .. } => "E_LEDGER_RPC",
            Self::Parse(_) => "E_LEDGER_PARSE",
            Self::NotConfigured(_) => "E_TOKEN_ACCOUNT_NOT_CONFIGURED",
        }
    }

    fn kind(&self) -> FailureKind {
        match self {
            Self::Request(_) | Self::ApiResponse { .. } | Self::Rpc { .. } => FailureKind::Connectivity,
            Self::Parse(_) => FailureKind::Decode,
            Self::NotConfigured(_) => FailureKind::Configuration,
        }
    }
}

/// Token account balance as reported by the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    /// Raw integer amount in base units.
    pub amount: String,
    pub decimals: u8,
    /// Decimal-adjusted amount. The node sends `null` when it would overflow.
    pub ui_amount: Option<f64>,
    #[serde(default)]
    pub ui_amount_string: Option<String>,
}

impl TokenAmount {
    /// Human-readable amount in plain decimal notation (`12.5`, `3`,
    /// `0.000000001`). Whole numbers carry no fraction; exponents are never used.
    #[must_use]
    pub fn display(&self) -> String {
        match (self.ui_amount, self.ui_amount_string.as_deref()) {
            (Some(v), _) => v.to_string(),
            (None, Some(s)) => s.to_string(),
            (None, None) => self.amount.clone(),
        }
    }
}
