//! 20-byte account and contract addresses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::hash::blake2b_256_multi;

/// An account, component or token address.
///
/// Users, the three core components and every fungible asset are identified
/// by an `Address`. The all-zero address is the null address and is never a
/// valid receiver.
///
/// The serialized form is a `0x`-prefixed hex string. When parsing, any string
/// that is not a 40-digit hex address is treated as a label and hashed with
/// [`Address::from_label`], which keeps configuration files and scripts
/// readable (`"alice"`, `"wbtc"`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Address([u8; 20]);

impl Address {
    /// The null address.
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive a deterministic address from a human-readable label.
    pub fn from_label(label: &str) -> Self {
        let digest = blake2b_256_multi(&[b"sova-address", label.as_bytes()]);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Self(bytes)
    }

    /// Parse a `0x`-prefixed, 40-digit hex address.
    pub fn from_hex(s: &str) -> Result<Self, AddressParseError> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| AddressParseError(s.to_string()))?;
        let raw = hex::decode(digits).map_err(|_| AddressParseError(s.to_string()))?;
        let bytes: [u8; 20] = raw
            .try_into()
            .map_err(|_| AddressParseError(s.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

/// Returned when a string looks like a hex address but is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed address: {0}")]
pub struct AddressParseError(pub String);

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") {
            Self::from_hex(s)
        } else if s.is_empty() {
            Err(AddressParseError(String::new()))
        } else {
            Ok(Self::from_label(s))
        }
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(&self.0[..4]))
    }
}

/// Token contracts are addressed like accounts.
pub type AssetId = Address;
