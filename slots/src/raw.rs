//! Raw-response schema handed over by the query layer.
//!
//! Every field is optional. The query layer fills in what it could decode and
//! leaves the rest out; [`crate::normalize`] turns whatever arrived into a
//! [`crate::SlotRecord`] without failing.

use crate::address::{ADDRESS_LEN, Address};

/// One loosely-typed value from a decoded query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    Bytes(Vec<u8>),
    Address(Address),
    /// Decimal digits of an integer of any width.
    Number(String),
    Bool(bool),
    List(Vec<RawValue>),
}

impl RawValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Generic text conversion.
    ///
    /// Buffers are read as UTF-8 (lossy), lists are joined with `,`.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Self::Address(address) => address.to_bech32(),
            Self::Number(digits) => digits.clone(),
            Self::Bool(flag) => flag.to_string(),
            Self::List(items) => items
                .iter()
                .map(Self::to_text)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Text conversion for values that are expected to be accounts.
    ///
    /// A bare 32-byte buffer is taken to be an untyped public key and rendered
    /// as bech32; everything else falls back to [`RawValue::to_text`].
    pub fn to_address_text(&self) -> String {
        match self {
            Self::Address(address) => address.to_bech32(),
            Self::Bytes(bytes) if bytes.len() == ADDRESS_LEN => Address::from_slice(bytes)
                .map(|address| address.to_bech32())
                .unwrap_or_else(|_| self.to_text()),
            other => other.to_text(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Address> for RawValue {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

/// Status tag of a slot plus the data carried by its variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawStatus {
    pub name: Option<RawValue>,
    pub fields: Vec<RawValue>,
}

impl RawStatus {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(RawValue::Text(name.into())),
            fields: Vec::new(),
        }
    }
}

/// The slot structure as reported by the contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSlot {
    pub version: Option<RawValue>,
    pub hash: Option<RawValue>,
    pub url: Option<RawValue>,
    pub status: Option<RawStatus>,
    pub approvals: Vec<RawValue>,
    pub creator: Option<RawValue>,
}

/// One entry of the `getSlots` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSlotItem {
    /// A slot structure on its own.
    Record(RawSlot),
    /// A `(key, slot)` pairing. The key stands in for the version when the
    /// slot itself carries none; either side may be missing.
    Pair {
        key: Option<RawValue>,
        record: Option<RawSlot>,
    },
    /// Anything the query layer could not map; normalizes to defaults.
    Unrecognized,
}

impl From<RawSlot> for RawSlotItem {
    fn from(value: RawSlot) -> Self {
        Self::Record(value)
    }
}
