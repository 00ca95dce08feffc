//! NLU: intent and entity extraction by a hosted service.
//!
//! DESIGN
//! ======
//! The assistant depends on [`IntentParser`]; [`wit::WitClient`] is the
//! HTTP implementation. Responses are kept close to the wire shape in
//! [`types::IntentResult`] and only the top intent and first entity value
//! are ever consulted.

pub mod types;
pub mod wit;

pub use types::{IntentResult, NluError};
pub use wit::WitClient;

/// Provider-neutral async trait for intent parsing. Enables mocking in tests.
#[async_trait::async_trait]
pub trait IntentParser: Send + Sync {
    /// Send `text` to the NLU service and return its parse.
    ///
    /// # Errors
    ///
    /// Returns an [`NluError`] if the request fails or the body is malformed.
    async fn parse(&self, text: &str) -> Result<IntentResult, NluError>;
}
