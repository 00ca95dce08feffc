//! Ledger: read-only access to the remote ledger node.
//!
//! DESIGN
//! ======
//! Flows depend on the [`LedgerRpc`] trait only. [`rpc::SolanaRpcClient`] is
//! the production implementation speaking JSON-RPC 2.0 over HTTP; tests inject
//! in-memory fakes.

pub mod rpc;
pub mod types;

pub use rpc::SolanaRpcClient;
pub use types::{LedgerError, TokenAmount};

/// Read-only ledger capability. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Fetch the raw data bytes of an account, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if the node cannot be reached or replies
    /// with an error or malformed payload.
    async fn get_account_info(&self, address: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Fetch the balance held by a token account.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if the node cannot be reached, the account
    /// is not a token account, or the reply is malformed.
    async fn get_token_account_balance(&self, address: &str) -> Result<TokenAmount, LedgerError>;
}
