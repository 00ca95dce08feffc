//! Shared error classification.
//!
//! DESIGN
//! ======
//! Every adapter owns its own `thiserror` enum. This module gives them a
//! common vocabulary: a stable `E_*` code for JSON bodies and logs, and a
//! coarse [`FailureKind`] so flows can treat connectivity, missing accounts,
//! decode mismatches and unusable NLU output uniformly. No failure is ever
//! retried automatically; the user re-triggers the action.

use serde::Serialize;

/// Coarse failure taxonomy shared by all flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// An RPC, NLU or HTTP call failed.
    Connectivity,
    /// An expected on-chain account is absent.
    NotFound,
    /// Schema decode did not yield the expected fields.
    Decode,
    /// The NLU service returned no usable intent.
    UnrecognizedInput,
    /// Missing or invalid local configuration.
    Configuration,
}

/// Stable error code and failure kind for an error value.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn kind(&self) -> FailureKind {
        FailureKind::Connectivity
    }
}

/// JSON body returned by routes when a request cannot be served.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl ErrorBody {
    #[must_use]
    pub fn from_error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { code: err.error_code(), message: err.to_string() }
    }
}
