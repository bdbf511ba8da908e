//! Canonical wire-type descriptors.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Fully expanded description of how a value is encoded on the wire.
///
/// Serializes to the registry JSON convention: plain names as strings,
/// structs as ordered field maps, enums under an `_enum` key (a name
/// list when no variant carries data, a variant map otherwise).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireDef {
    /// No data at all (unit struct, empty variant).
    Null,
    /// A canonical type name: `"u32"`, `"Vec<u8>"`, `"(String, u32)"`,
    /// `"Pair<u8,String>"`.
    Name(String),
    /// Ordered field name -> canonical type name.
    Struct(Vec<(String, String)>),
    /// Ordered variant names, none carrying data.
    UnitEnum(Vec<String>),
    /// Ordered variant name -> payload descriptor (empty variants as
    /// [`WireDef::Null`]).
    DataEnum(Vec<(String, WireDef)>),
}

impl WireDef {
    pub fn name(text: impl Into<String>) -> Self {
        Self::Name(text.into())
    }
}

impl Serialize for WireDef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_str("Null"),
            Self::Name(name) => serializer.serialize_str(name),
            Self::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, ty) in fields {
                    map.serialize_entry(name, ty)?;
                }
                map.end()
            }
            Self::UnitEnum(names) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("_enum", &VariantNames(names))?;
                map.end()
            }
            Self::DataEnum(variants) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("_enum", &VariantMap(variants))?;
                map.end()
            }
        }
    }
}

struct VariantNames<'a>(&'a [String]);

impl Serialize for VariantNames<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for name in self.0 {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

struct VariantMap<'a>(&'a [(String, WireDef)]);

impl Serialize for VariantMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, def) in self.0 {
            map.serialize_entry(name, def)?;
        }
        map.end()
    }
}
