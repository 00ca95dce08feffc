//! Anchor-style account coder.
//!
//! Accounts start with `sha256("account:<Name>")[..8]`, followed by fields
//! in declaration order, little-endian, no padding. Field names are exposed
//! in camelCase regardless of how the IDL spells them.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::warn;

use super::AccountDecoder;
use super::types::{FieldKind, FieldValue, Record, SchemaError};

pub const DISCRIMINATOR_LEN: usize = 8;

/// Layout of the lending program's `Bank` account as read by this service.
pub const BANK_FIELDS: &[(&str, FieldKind)] = &[
    ("mint", FieldKind::PublicKey),
    ("totalAssetShares", FieldKind::U128),
    ("totalLiabilityShares", FieldKind::U128),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLayout {
    pub name: String,
    pub discriminator: [u8; DISCRIMINATOR_LEN],
    pub fields: Vec<(String, FieldKind)>,
}

impl AccountLayout {
    #[must_use]
    pub fn new(name: &str, fields: &[(&str, FieldKind)]) -> Self {
        Self {
            name: name.to_string(),
            discriminator: account_discriminator(name),
            fields: fields.iter().map(|(n, k)| ((*n).to_string(), *k)).collect(),
        }
    }

    #[must_use]
    pub fn encoded_len(&self) -> usize {
        DISCRIMINATOR_LEN + self.fields.iter().map(|(_, k)| k.size()).sum::<usize>()
    }
}

/// First eight bytes of `sha256("account:<name>")`.
#[must_use]
pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = Sha256::digest(format!("account:{name}").as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

// =============================================================================
// CODER
// =============================================================================

/// Layout registry for a single program.
#[derive(Debug, Clone)]
pub struct AnchorCoder {
    program_id: String,
    layouts: HashMap<String, AccountLayout>,
}

impl AnchorCoder {
    /// Coder with only the built-in `Bank` layout.
    #[must_use]
    pub fn builtin(program_id: impl Into<String>) -> Self {
        let mut coder = Self { program_id: program_id.into(), layouts: HashMap::new() };
        coder.register(AccountLayout::new("Bank", BANK_FIELDS));
        coder
    }

    /// Coder with layouts taken from an IDL document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Idl`] if the JSON is malformed.
    pub fn from_idl_json(program_id: impl Into<String>, json: &str) -> Result<Self, SchemaError> {
        let idl: Idl = serde_json::from_str(json).map_err(|e| SchemaError::Idl(e.to_string()))?;
        let mut coder = Self { program_id: program_id.into(), layouts: HashMap::new() };
        for layout in layouts_from_idl(&idl) {
            coder.register(layout);
        }
        Ok(coder)
    }

    /// # Errors
    ///
    /// Returns [`SchemaError::Idl`] if the file cannot be read or parsed.
    pub fn from_idl_file(program_id: impl Into<String>, path: &Path) -> Result<Self, SchemaError> {
        let json = std::fs::read_to_string(path).map_err(|e| SchemaError::Idl(format!("{}: {e}", path.display())))?;
        Self::from_idl_json(program_id, &json)
    }

    pub fn register(&mut self, layout: AccountLayout) {
        self.layouts.insert(layout.name.clone(), layout);
    }

    #[must_use]
    pub fn program_id(&self) -> &str {
        &self.program_id
    }

    #[must_use]
    pub fn layout(&self, name: &str) -> Option<&AccountLayout> {
        self.layouts.get(name)
    }
}

impl AccountDecoder for AnchorCoder {
    fn decode_account(&self, schema_name: &str, data: &[u8]) -> Result<Record, SchemaError> {
        let layout = self
            .layouts
            .get(schema_name)
            .ok_or_else(|| SchemaError::UnknownSchema(schema_name.to_string()))?;
        decode_with_layout(layout, data)
    }
}

fn decode_with_layout(layout: &AccountLayout, data: &[u8]) -> Result<Record, SchemaError> {
    let needed = layout.encoded_len();
    if data.len() < needed {
        return Err(SchemaError::TooShort { schema: layout.name.clone(), needed, have: data.len() });
    }
    if data[..DISCRIMINATOR_LEN] != layout.discriminator {
        return Err(SchemaError::DiscriminatorMismatch(layout.name.clone()));
    }

    let mut offset = DISCRIMINATOR_LEN;
    let mut fields = std::collections::BTreeMap::new();
    for (name, kind) in &layout.fields {
        let end = offset + kind.size();
        let value = read_field(*kind, &data[offset..end]);
        fields.insert(name.clone(), value);
        offset = end;
    }
    // Trailing bytes belong to fields this service does not read.
    Ok(Record { schema: layout.name.clone(), fields })
}

/// `bytes` is exactly `kind.size()` long.
fn read_field(kind: FieldKind, bytes: &[u8]) -> FieldValue {
    match kind {
        FieldKind::Bool => FieldValue::Bool(bytes[0] != 0),
        FieldKind::I64 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(bytes);
            FieldValue::Signed(i64::from_le_bytes(buf))
        }
        FieldKind::PublicKey => {
            let mut key = [0u8; 32];
            key.copy_from_slice(bytes);
            FieldValue::PublicKey(key)
        }
        FieldKind::U8 | FieldKind::U16 | FieldKind::U32 | FieldKind::U64 | FieldKind::U128 => {
            let mut wide = [0u8; 16];
            wide[..bytes.len()].copy_from_slice(bytes);
            FieldValue::Unsigned(u128::from_le_bytes(wide))
        }
    }
}

// =============================================================================
// IDL
// =============================================================================

/// Subset of the Anchor IDL. Older IDLs inline the struct under
/// `accounts[].type`; newer ones reference `types[]` and carry an explicit
/// discriminator.
#[derive(Deserialize)]
struct Idl {
    #[serde(default)]
    accounts: Vec<IdlAccount>,
    #[serde(default)]
    types: Vec<IdlTypeDef>,
}

#[derive(Deserialize)]
struct IdlAccount {
    name: String,
    #[serde(default)]
    discriminator: Option<Vec<u8>>,
    #[serde(default, rename = "type")]
    ty: Option<IdlStruct>,
}

#[derive(Deserialize)]
struct IdlTypeDef {
    name: String,
    #[serde(rename = "type")]
    ty: IdlStruct,
}

#[derive(Deserialize)]
struct IdlStruct {
    #[serde(default)]
    fields: Vec<IdlField>,
}

#[derive(Deserialize)]
struct IdlField {
    name: String,
    #[serde(rename = "type")]
    ty: serde_json::Value,
}

fn layouts_from_idl(idl: &Idl) -> Vec<AccountLayout> {
    idl.accounts
        .iter()
        .filter_map(|account| {
            let fields = account
                .ty
                .as_ref()
                .or_else(|| idl.types.iter().find(|t| t.name == account.name).map(|t| &t.ty))
                .map(|s| s.fields.as_slice())?;

            let discriminator = match account.discriminator.as_deref() {
                Some(bytes) if bytes.len() == DISCRIMINATOR_LEN => {
                    let mut out = [0u8; DISCRIMINATOR_LEN];
                    out.copy_from_slice(bytes);
                    out
                }
                _ => account_discriminator(&account.name),
            };

            Some(AccountLayout { name: account.name.clone(), discriminator, fields: layout_fields(&account.name, fields) })
        })
        .collect()
}

/// Offsets past a field of unknown size are unknowable, so the layout
/// stops at the first such field.
fn layout_fields(account: &str, fields: &[IdlField]) -> Vec<(String, FieldKind)> {
    let mut out = Vec::new();
    for field in fields {
        let Some(kind) = field.ty.as_str().and_then(FieldKind::from_idl) else {
            warn!(%account, field = %field.name, ty = %field.ty, "schema: unsupported IDL field type, truncating layout");
            break;
        };
        out.push((camel_case(&field.name), kind));
    }
    out
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
#[path = "anchor_test.rs"]
mod tests;
