//! Service configuration parsed from environment variables.
//!
//! Endpoint URLs and credentials come from the environment. On-chain bank
//! addresses and the program ID are compiled in.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ErrorCode, FailureKind};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_WIT_AI_BASE_URL: &str = "https://api.wit.ai/message";
pub const DEFAULT_WIT_AI_VERSION: &str = "20241224";
pub const DEFAULT_SURVEY_URL: &str =
    "https://api-d7b62b.stack.tryrelevance.com/latest/studios/78e515ba-acab-47a9-a790-f7cc94108b41/trigger_limited";
pub const DEFAULT_SURVEY_PROJECT_ID: &str = "060debf85845-4c22-b5e1-1454566534c2";

/// Lending program whose account schemas the decoder is bound to.
pub const PROGRAM_ID: &str = "QoB7dVkkZr3oLb95DMpSptvUF8mTygDHNjFQh5y5RAb";
pub const RAY_BANK: &str = "DeNFenr4diuZP8hTYeW8Rw9C7dm5Z5DSu8URkSpt8Tmj";
pub const WIF_BANK: &str = "GBmyafm37crVXMZuUYHYZ8d73gbyjxpEeXqCbM8Np9hy";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidValue { .. } => "E_CONFIG_INVALID",
            Self::Empty { .. } => "E_CONFIG_EMPTY",
        }
    }

    fn kind(&self) -> FailureKind {
        FailureKind::Configuration
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NluConfig {
    pub token: String,
    pub base_url: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyConfig {
    pub url: String,
    pub project_id: String,
}

/// Token accounts whose balances the assistant reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenAccounts {
    pub ray: Option<String>,
    pub wif: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub rpc_url: String,
    /// `None` when `WIT_AI_TOKEN` is unset; the NLU branch is then disabled.
    pub nlu: Option<NluConfig>,
    pub survey: SurveyConfig,
    pub token_accounts: TokenAccounts,
    pub wallet_pubkey: Option<String>,
    pub idl_path: Option<PathBuf>,
    /// Outbound HTTP timeout. Unset means requests may wait indefinitely.
    pub request_timeout: Option<Duration>,
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable fails to parse or a URL is empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same conditions as [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue { var: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let rpc_url = url_or_default(lookup("ORBITLEN_RPC_URL"), "ORBITLEN_RPC_URL", DEFAULT_RPC_URL)?;

        let nlu = match get("WIT_AI_TOKEN") {
            Some(token) => Some(NluConfig {
                token,
                base_url: url_or_default(lookup("WIT_AI_BASE_URL"), "WIT_AI_BASE_URL", DEFAULT_WIT_AI_BASE_URL)?,
                version: get("WIT_AI_VERSION").unwrap_or_else(|| DEFAULT_WIT_AI_VERSION.to_string()),
            }),
            None => None,
        };

        let survey = SurveyConfig {
            url: url_or_default(lookup("SURVEY_URL"), "SURVEY_URL", DEFAULT_SURVEY_URL)?,
            project_id: get("SURVEY_PROJECT_ID").unwrap_or_else(|| DEFAULT_SURVEY_PROJECT_ID.to_string()),
        };

        let token_accounts = TokenAccounts { ray: get("RAY_TOKEN_ACCOUNT"), wif: get("WIF_TOKEN_ACCOUNT") };

        let request_timeout = match get("HTTP_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue { var: "HTTP_REQUEST_TIMEOUT_SECS", value: raw })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            port,
            rpc_url,
            nlu,
            survey,
            token_accounts,
            wallet_pubkey: get("WALLET_PUBKEY"),
            idl_path: get("ORBITLEN_IDL_PATH").map(PathBuf::from),
            request_timeout,
        })
    }
}

/// A set-but-blank URL is a mistake worth failing on; unset falls back.
fn url_or_default(raw: Option<String>, var: &'static str, default: &str) -> Result<String, ConfigError> {
    match raw {
        None => Ok(default.to_string()),
        Some(v) if v.trim().is_empty() => Err(ConfigError::Empty { var }),
        Some(v) => Ok(v.trim().trim_end_matches('/').to_string()),
    }
}

/// Build the shared outbound HTTP client.
///
/// # Errors
///
/// Returns the underlying reqwest error if the TLS backend fails to initialise.
pub fn http_client(timeout: Option<Duration>) -> Result<reqwest::Client, reqwest::Error> {
    let builder = reqwest::Client::builder();
    let builder = match timeout {
        Some(t) => builder.timeout(t),
        None => builder,
    };
    builder.build()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
