//! Assistant dispatcher: one user message in, one reply out.
//!
//! DESIGN
//! ======
//! Three branches, evaluated in order:
//! 1. Shortcut: the trimmed input is exactly a tracked token symbol. The
//!    balance is fetched directly and the NLU service is never called.
//! 2. NLU: the trimmed input goes to the intent parser. The first intent
//!    returned selects `transfer`, `balance`, or the "don't know" reply.
//! 3. Any NLU failure becomes one generic apology.
//!
//! Transfers are described, never executed.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::TokenAccounts;
use crate::error::ErrorCode;
use crate::ledger::{LedgerError, LedgerRpc};
use crate::nlu::{IntentParser, IntentResult, NluError};
use crate::tokens::TokenSymbol;

pub const GREETING: &str = "Hi! I'm your DeFi investment assistant. How can I help you today?";
pub const NOT_UNDERSTOOD: &str = "I'm sorry, I couldn't understand your request. Please try rephrasing it.";
pub const UNHANDLED_INTENT: &str = "I'm sorry, I don't know how to handle that request yet.";
pub const ASK_FOR_TOKEN: &str = "Which token's balance would you like to check? (RAY or WIF)";
pub const GENERIC_APOLOGY: &str = "I apologize, but I encountered an error. Please try again.";

pub const INTENT_TRANSFER: &str = "transfer";
pub const INTENT_BALANCE: &str = "balance";

/// Which branch handled a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Shortcut(TokenSymbol),
    NoIntent,
    Transfer,
    Balance,
    UnknownIntent,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub branch: Branch,
    pub text: String,
}

pub struct Assistant {
    ledger: Arc<dyn LedgerRpc>,
    nlu: Option<Arc<dyn IntentParser>>,
    accounts: TokenAccounts,
}

impl Assistant {
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerRpc>, nlu: Option<Arc<dyn IntentParser>>, accounts: TokenAccounts) -> Self {
        Self { ledger, nlu, accounts }
    }

    /// Produce exactly one reply for `input`. Never fails.
    pub async fn reply(&self, input: &str) -> Reply {
        let trimmed = input.trim();

        if let Some(token) = TokenSymbol::parse(trimmed) {
            info!(%token, "assistant: shortcut balance");
            return Reply { branch: Branch::Shortcut(token), text: self.balance_text(token).await };
        }

        match self.dispatch_nlu(trimmed).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "assistant: NLU dispatch failed");
                Reply { branch: Branch::Failed, text: GENERIC_APOLOGY.to_string() }
            }
        }
    }

    async fn dispatch_nlu(&self, text: &str) -> Result<Reply, NluError> {
        let nlu = self.nlu.as_ref().ok_or(NluError::NotConfigured)?;
        let parsed = nlu.parse(text).await?;

        let Some(intent) = parsed.top_intent() else {
            info!("assistant: no intents in NLU response");
            return Ok(Reply { branch: Branch::NoIntent, text: NOT_UNDERSTOOD.to_string() });
        };
        info!(%intent, "assistant: intent resolved");

        let reply = match intent {
            INTENT_TRANSFER => Reply { branch: Branch::Transfer, text: transfer_text(&parsed) },
            INTENT_BALANCE => {
                let token = parsed
                    .entity_value("transfer_token")
                    .or_else(|| parsed.entity_value("balance_token"))
                    .and_then(|raw| TokenSymbol::parse(&raw));
                let text = match token {
                    Some(token) => self.balance_text(token).await,
                    None => ASK_FOR_TOKEN.to_string(),
                };
                Reply { branch: Branch::Balance, text }
            }
            _ => Reply { branch: Branch::UnknownIntent, text: UNHANDLED_INTENT.to_string() },
        };
        Ok(reply)
    }

    async fn balance_text(&self, token: TokenSymbol) -> String {
        match self.fetch_balance(token).await {
            Ok(amount) => format!("Your {token} balance is: {amount}"),
            Err(e) => {
                warn!(%token, error = %e, "assistant: balance fetch failed");
                format!("Sorry, I couldn't fetch your {token} balance at the moment.")
            }
        }
    }

    async fn fetch_balance(&self, token: TokenSymbol) -> Result<String, LedgerError> {
        let account = match token {
            TokenSymbol::Ray => self.accounts.ray.as_deref(),
            TokenSymbol::Wif => self.accounts.wif.as_deref(),
        }
        .ok_or(LedgerError::NotConfigured(token.ticker()))?;

        let amount = self.ledger.get_token_account_balance(account).await?;
        Ok(amount.display())
    }
}

fn transfer_text(parsed: &IntentResult) -> String {
    let amount = parsed.entity_value("amount").unwrap_or_default();
    let token = parsed.entity_value("transfer_token").unwrap_or_default();
    let to_addr = parsed.entity_value("to_addr").unwrap_or_default();
    format!("I'll help you transfer {amount} {token} to {to_addr}. (Implementation pending)")
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
