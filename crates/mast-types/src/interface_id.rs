//! Opaque 8-byte interface identifiers.
//!
//! An interface id is derived externally from a service's shape (a hash
//! over its functions and events); this crate only stores, compares and
//! transports it. The all-zero id is reserved for program constructors,
//! which are not part of any service interface.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of bytes in an interface id.
pub const INTERFACE_ID_LEN: usize = 8;

/// Opaque 8-byte key identifying a service interface.
///
/// Compared byte-wise. Displayed and parsed as 16 lowercase hex digits
/// with a `0x` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InterfaceId([u8; INTERFACE_ID_LEN]);

impl InterfaceId {
    /// The all-zero id, used for constructor dispatch.
    pub const fn zero() -> Self {
        Self([0u8; INTERFACE_ID_LEN])
    }

    pub const fn from_bytes(bytes: [u8; INTERFACE_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Truncating construction from a 32-byte hash: the first 8 bytes.
    pub fn from_bytes32(hash: &[u8; 32]) -> Self {
        let mut id = [0u8; INTERFACE_ID_LEN];
        id.copy_from_slice(&hash[..INTERFACE_ID_LEN]);
        Self(id)
    }

    /// Parse from exactly 16 hex digits, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, InterfaceIdParseError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != INTERFACE_ID_LEN * 2 {
            return Err(InterfaceIdParseError::BadLength { got: digits.len() });
        }
        let raw = hex::decode(digits).map_err(|_| InterfaceIdParseError::BadDigit)?;
        let mut id = [0u8; INTERFACE_ID_LEN];
        id.copy_from_slice(&raw);
        Ok(Self(id))
    }

    pub const fn as_bytes(&self) -> &[u8; INTERFACE_ID_LEN] {
        &self.0
    }

    /// Big-endian numeric view, matching the textual hex form.
    pub fn as_u64(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; INTERFACE_ID_LEN]
    }
}

impl From<u64> for InterfaceId {
    fn from(value: u64) -> Self {
        Self(value.to_be_bytes())
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for InterfaceId {
    type Err = InterfaceIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for InterfaceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for InterfaceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

/// Failure to parse an interface id from hex text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceIdParseError {
    /// Wrong number of hex digits (16 expected).
    BadLength { got: usize },
    /// A character outside `[0-9a-fA-F]`.
    BadDigit,
}

impl fmt::Display for InterfaceIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadLength { got } => {
                write!(f, "interface id must be 16 hex digits, got {}", got)
            }
            Self::BadDigit => write!(f, "interface id contains a non-hex digit"),
        }
    }
}

impl std::error::Error for InterfaceIdParseError {}
