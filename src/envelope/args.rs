//! Explicitly typed wire arguments.
//!
//! The destination has no implicit type inference, so every argument carries
//! its wire type tag. 128-bit integers travel as decimal strings since the
//! wire's number type cannot hold them.

use serde::{Deserialize, Serialize};

/// One positional contract-call argument with its wire type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ScArg {
    /// Account or contract identifier in strkey form.
    Address(String),
    /// Signed 128-bit integer, string-encoded on the wire.
    I128(#[serde(with = "i128_as_string")] i128),
    U32(u32),
    U64(u64),
    #[serde(rename = "string")]
    Str(String),
}

mod i128_as_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
