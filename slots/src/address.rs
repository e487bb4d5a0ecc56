//! Account addresses.
//!
//! Accounts (and contracts) are 32-byte public keys. Their canonical text form
//! is bech32 with the `erd` human-readable part, which is what approvals and
//! creators are rendered as.

use std::fmt;
use std::str::FromStr;

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Human-readable part of every account address.
pub const ADDRESS_HRP: &str = "erd";

/// Length of an account public key.
pub const ADDRESS_LEN: usize = 32;

const HRP: Hrp = Hrp::parse_unchecked(ADDRESS_HRP);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("invalid bech32 address {input:?}: {reason}")]
    Bech32 { input: String, reason: String },

    #[error("address {input:?} has prefix {found:?}, expected {ADDRESS_HRP:?}")]
    WrongPrefix { input: String, found: String },

    #[error("address must be {ADDRESS_LEN} bytes, got {len}")]
    WrongLength { len: usize },
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let raw: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| AddressError::WrongLength { len: bytes.len() })?;
        Ok(Self(raw))
    }

    /// Parse an `erd1...` string.
    pub fn from_bech32(input: &str) -> Result<Self, AddressError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AddressError::Empty);
        }
        let (hrp, data) = bech32::decode(input).map_err(|e| AddressError::Bech32 {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        let found = hrp.to_lowercase();
        if found != ADDRESS_HRP {
            return Err(AddressError::WrongPrefix {
                input: input.to_string(),
                found,
            });
        }
        Self::from_slice(&data)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn to_bech32(&self) -> String {
        // Encoding only fails for payloads beyond the bech32 length limit.
        bech32::encode::<Bech32>(HRP, &self.0).unwrap_or_else(|_| self.to_hex())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Contract addresses start with eight zero bytes.
    pub fn is_smart_contract(&self) -> bool {
        self.0[..8].iter().all(|b| *b == 0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bech32())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_bech32())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bech32(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_bech32())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_bech32(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONTRACT: &str = "erd1qqqqqqqqqqqqqpgqes4jwfnk7qtueqets44dccecfm43cngk6zmsrjyhxr";

    #[test]
    fn bech32_round_trip_keeps_text() {
        let addr = Address::from_bech32(CONTRACT).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(addr.to_bech32(), CONTRACT);
        assert_eq!(addr.to_string(), CONTRACT);
        assert!(addr.is_smart_contract());
    }

    #[test]
    fn zero_key_encodes_with_erd_prefix() {
        let addr = Address::new([0u8; ADDRESS_LEN]);
        let text = addr.to_bech32();
        assert!(text.starts_with("erd1"), "{text}");
        assert_eq!(Address::from_bech32(&text), Ok(addr));
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert_eq!(Address::from_bech32("  "), Err(AddressError::Empty));
        assert!(matches!(
            Address::from_bech32("not-an-address"),
            Err(AddressError::Bech32 { .. })
        ));
    }

    #[test]
    fn rejects_foreign_prefix() {
        let foreign = bech32::encode::<Bech32>(Hrp::parse_unchecked("bc"), &[7u8; ADDRESS_LEN])
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            Address::from_bech32(&foreign),
            Err(AddressError::WrongPrefix { found, .. }) if found == "bc"
        ));
    }

    #[test]
    fn rejects_short_payload() {
        let short = bech32::encode::<Bech32>(HRP, &[1u8; 20]).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            Address::from_bech32(&short),
            Err(AddressError::WrongLength { len: 20 })
        );
    }
}
