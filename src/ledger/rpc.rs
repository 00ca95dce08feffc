//! Solana JSON-RPC client.
//!
//! Thin HTTP wrapper for `getAccountInfo` and `getTokenAccountBalance`.
//! Pure parsing in `parse_*` functions for testability.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use super::LedgerRpc;
use super::types::{LedgerError, TokenAmount};

// =============================================================================
// CLIENT
// =============================================================================

pub struct SolanaRpcClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SolanaRpcClient {
    /// Open a connection handle to `endpoint`. No request is made until the
    /// first call.
    #[must_use]
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self { http, endpoint: endpoint.into() }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, method: &str, params: Value) -> Result<String, LedgerError> {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
        debug!(%method, "ledger: rpc call");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LedgerError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(LedgerError::ApiResponse { status, body: text });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl LedgerRpc for SolanaRpcClient {
    async fn get_account_info(&self, address: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let text = self
            .call("getAccountInfo", json!([address, { "encoding": "base64" }]))
            .await?;
        parse_account_info(&text)
    }

    async fn get_token_account_balance(&self, address: &str) -> Result<TokenAmount, LedgerError> {
        let text = self
            .call("getTokenAccountBalance", json!([address]))
            .await?;
        parse_token_balance(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct RpcEnvelope<T> {
    result: Option<RpcResult<T>>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcResult<T> {
    value: Option<T>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// `data` arrives as `[payload, encoding]`.
#[derive(Deserialize)]
struct AccountValue {
    data: (String, String),
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_envelope<T: DeserializeOwned>(json: &str) -> Result<Option<T>, LedgerError> {
    let envelope: RpcEnvelope<T> = serde_json::from_str(json).map_err(|e| LedgerError::Parse(e.to_string()))?;

    if let Some(err) = envelope.error {
        return Err(LedgerError::Rpc { code: err.code, message: err.message });
    }
    let result = envelope
        .result
        .ok_or_else(|| LedgerError::Parse("missing result".into()))?;
    Ok(result.value)
}

fn parse_account_info(json: &str) -> Result<Option<Vec<u8>>, LedgerError> {
    let Some(account) = parse_envelope::<AccountValue>(json)? else {
        return Ok(None);
    };

    let (payload, encoding) = account.data;
    if encoding != "base64" {
        return Err(LedgerError::Parse(format!("unexpected account encoding {encoding:?}")));
    }
    STANDARD
        .decode(payload.as_bytes())
        .map(Some)
        .map_err(|e| LedgerError::Parse(e.to_string()))
}

fn parse_token_balance(json: &str) -> Result<TokenAmount, LedgerError> {
    parse_envelope::<TokenAmount>(json)?.ok_or_else(|| LedgerError::Parse("missing token amount".into()))
}

#[cfg(test)]
#[path = "rpc_test.rs"]
mod tests;
