//! Decoded record types and errors.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ErrorCode, FailureKind};

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown account schema: {0}")]
    UnknownSchema(String),

    #[error("account data too short for {schema}: need {needed} bytes, have {have}")]
    TooShort { schema: String, needed: usize, have: usize },

    #[error("account discriminator does not match {0}")]
    DiscriminatorMismatch(String),

    #[error("decoded {schema} record has no field {field}")]
    MissingField { schema: String, field: String },

    #[error("IDL load failed: {0}")]
    Idl(String),
}

impl ErrorCode for SchemaError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSchema(_) => "E_UNKNOWN_SCHEMA",
            Self::TooShort { .. } => "E_ACCOUNT_TOO_SHORT",
            Self::DiscriminatorMismatch(_) => "E_DISCRIMINATOR_MISMATCH",
            Self::MissingField { .. } => "E_MISSING_FIELD",
            Self::Idl(_) => "E_IDL_LOAD",
        }
    }

    fn kind(&self) -> FailureKind {
        match self {
            Self::Idl(_) => FailureKind::Configuration,
            _ => FailureKind::Decode,
        }
    }
}

/// Field types a layout may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    U16,
    U32,
    U64,
    U128,
    I64,
    Bool,
    PublicKey,
}

impl FieldKind {
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            Self::U8 | Self::Bool => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 | Self::I64 => 8,
            Self::U128 => 16,
            Self::PublicKey => 32,
        }
    }

    /// Parse an IDL type name. Accepts both `publicKey` and `pubkey`.
    #[must_use]
    pub fn from_idl(name: &str) -> Option<Self> {
        match name {
            "u8" => Some(Self::U8),
            "u16" => Some(Self::U16),
            "u32" => Some(Self::U32),
            "u64" => Some(Self::U64),
            "u128" => Some(Self::U128),
            "i64" => Some(Self::I64),
            "bool" => Some(Self::Bool),
            "publicKey" | "pubkey" => Some(Self::PublicKey),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Unsigned(u128),
    Signed(i64),
    Bool(bool),
    PublicKey([u8; 32]),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::Signed(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::PublicKey(bytes) => f.write_str(&hex::encode(bytes)),
        }
    }
}

/// A decoded account: field name → value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub schema: String,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Look up a field that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingField`] if the record lacks `field`.
    pub fn require(&self, field: &str) -> Result<&FieldValue, SchemaError> {
        self.fields.get(field).ok_or_else(|| SchemaError::MissingField {
            schema: self.schema.clone(),
            field: field.to_string(),
        })
    }
}
