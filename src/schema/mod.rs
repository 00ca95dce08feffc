//! Schema: decoding raw account bytes into named records.
//!
//! DESIGN
//! ======
//! Flows see only [`AccountDecoder`]. [`anchor::AnchorCoder`] implements it
//! for programs that prefix accounts with an 8-byte discriminator and lay
//! fields out in Borsh order. Layouts are registered per account name.

pub mod anchor;
pub mod types;

pub use anchor::AnchorCoder;
pub use types::{FieldValue, Record, SchemaError};

/// Decode raw account data into a field-name → value record.
pub trait AccountDecoder: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the schema is unknown or the bytes do
    /// not match its layout.
    fn decode_account(&self, schema_name: &str, data: &[u8]) -> Result<Record, SchemaError>;
}
