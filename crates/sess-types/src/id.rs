use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Content-addressed identifier for a stored session.
///
/// A `SessionId` is a 32-byte BLAKE3 digest over the session's
/// `(source, type, data)` triple, assigned once at creation. It is rendered
/// as 64 lowercase hex characters everywhere it leaves the process (JSON,
/// URLs, logs).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId([u8; 32]);

impl SessionId {
    /// Length of the printable form.
    pub const HEX_LEN: usize = 64;

    /// Create a `SessionId` from a pre-computed hash.
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters), for logs.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a 64-character lowercase hex string.
    ///
    /// Uppercase digits are rejected so every id has exactly one spelling.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(TypeError::InvalidHex(format!("{s:?} is not lowercase")));
        }
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.short_hex())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for SessionId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for SessionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let id = SessionId::from_hash([0xab; 32]);
        let parsed = SessionId::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn display_is_full_hex() {
        let id = SessionId::from_hash([7; 32]);
        let display = format!("{id}");
        assert_eq!(display.len(), SessionId::HEX_LEN);
        assert_eq!(display, id.to_hex());
    }

    #[test]
    fn short_hex_is_8_chars() {
        assert_eq!(SessionId::from_hash([1; 32]).short_hex().len(), 8);
    }

    #[test]
    fn rejects_non_hex() {
        assert!(matches!(
            SessionId::from_hex("id"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn rejects_uppercase() {
        let id = SessionId::from_hash([0xab; 32]);
        assert!(matches!(
            SessionId::from_hex(&id.to_hex().to_uppercase()),
            Err(TypeError::InvalidHex(_))
        ));
        let mixed = format!("AB{}", &id.to_hex()[2..]);
        assert!(mixed.parse::<SessionId>().is_err());
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(
            SessionId::from_hex("abcd"),
            Err(TypeError::InvalidLength {
                expected: 32,
                actual: 2
            })
        );
    }

    #[test]
    fn serializes_as_hex_string() {
        let id = SessionId::from_hash([0x10; 32]);
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_hex()));
        let back: SessionId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn deserialize_rejects_garbage() {
        let result: Result<SessionId, _> = serde_json::from_str("\"not-an-id\"");
        assert!(result.is_err());
    }
}
