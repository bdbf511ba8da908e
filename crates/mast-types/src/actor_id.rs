//! 32-byte actor (program) addresses.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of bytes in an actor id.
pub const ACTOR_ID_LEN: usize = 32;

/// Address of a program or user on the message bus.
///
/// The all-zero address is the broadcast destination: events a program
/// emits are addressed to it rather than to a specific recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActorId([u8; ACTOR_ID_LEN]);

impl ActorId {
    /// The broadcast (all-zero) address.
    pub const fn zero() -> Self {
        Self([0u8; ACTOR_ID_LEN])
    }

    pub const fn from_bytes(bytes: [u8; ACTOR_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse from exactly 64 hex digits, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, ActorIdParseError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != ACTOR_ID_LEN * 2 {
            return Err(ActorIdParseError::BadLength { got: digits.len() });
        }
        let raw = hex::decode(digits).map_err(|_| ActorIdParseError::BadDigit)?;
        let mut id = [0u8; ACTOR_ID_LEN];
        id.copy_from_slice(&raw);
        Ok(Self(id))
    }

    pub const fn as_bytes(&self) -> &[u8; ACTOR_ID_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ACTOR_ID_LEN]
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for ActorId {
    type Err = ActorIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for ActorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ActorId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

/// Failure to parse an actor id from hex text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorIdParseError {
    /// Wrong number of hex digits (64 expected).
    BadLength { got: usize },
    /// A character outside `[0-9a-fA-F]`.
    BadDigit,
}

impl fmt::Display for ActorIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadLength { got } => {
                write!(f, "actor id must be 64 hex digits, got {}", got)
            }
            Self::BadDigit => write!(f, "actor id contains a non-hex digit"),
        }
    }
}

impl std::error::Error for ActorIdParseError {}
