//! Slot identifiers.
//!
//! A slot identifier is an opaque, unguessable token naming a slot and, after
//! upload, the stored object. Two textual grammars are accepted:
//!
//! - *Hardened*: 160 bits from a cryptographically secure RNG, base64url
//!   encoded without padding (exactly 27 characters). This is the only form
//!   newly generated.
//! - *Legacy*: a hyphenated UUID, accepted on input for backward
//!   compatibility with identifiers issued by older deployments.
//!
//! Callers never branch on the variant: equality, ordering, and hashing are
//! value-based on the textual form.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Number of random bytes backing a hardened identifier.
const HARDENED_ENTROPY_BYTES: usize = 20;

/// Textual length of a hardened identifier: 20 bytes base64-encoded without
/// padding.
pub const HARDENED_TEXT_LEN: usize = 27;

/// An opaque slot identifier.
#[derive(Clone)]
pub enum SlotId {
    /// Hardened random token, 27 base64url characters.
    Hardened(String),
    /// Legacy UUID form, stored in canonical hyphenated text.
    Legacy(String),
}

impl SlotId {
    /// Generate a new hardened identifier from a cryptographically secure
    /// random source.
    ///
    /// 160 bits of entropy make collisions probabilistically impossible; no
    /// explicit collision check is performed.
    pub fn generate() -> Self {
        let mut buf = [0u8; HARDENED_ENTROPY_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut buf);
        Self::Hardened(URL_SAFE_NO_PAD.encode(buf))
    }

    /// Generate a legacy (random UUID) identifier.
    ///
    /// The negotiation path never calls this; it exists for compatibility
    /// with identifiers minted by older deployments and for tests.
    pub fn generate_legacy() -> Self {
        Self::Legacy(Uuid::new_v4().as_hyphenated().to_string())
    }

    /// Parse an identifier from text.
    ///
    /// The hardened grammar is tried first, then the legacy UUID grammar.
    pub fn parse(s: &str) -> crate::Result<Self> {
        if s.len() == HARDENED_TEXT_LEN && s.bytes().all(is_hardened_byte) {
            return Ok(Self::Hardened(s.to_string()));
        }

        if let Ok(uuid) = Uuid::parse_str(s) {
            return Ok(Self::Legacy(uuid.as_hyphenated().to_string()));
        }

        Err(crate::Error::InvalidIdentifier(s.to_string()))
    }

    /// The textual form of this identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hardened(s) | Self::Legacy(s) => s,
        }
    }
}

/// Hardened identifiers use the base64url alphabet.
fn is_hardened_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

impl PartialEq for SlotId {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for SlotId {}

impl PartialOrd for SlotId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SlotId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for SlotId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({})", self.as_str())
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SlotId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SlotId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_id_roundtrip() {
        let id = SlotId::generate();
        let parsed = SlotId::parse(id.as_str()).unwrap();
        assert_eq!(id, parsed);
        assert!(matches!(parsed, SlotId::Hardened(_)));
    }

    #[test]
    fn test_generated_id_shape() {
        for _ in 0..32 {
            let id = SlotId::generate();
            assert_eq!(id.as_str().len(), HARDENED_TEXT_LEN);
            assert!(id.as_str().bytes().all(is_hardened_byte));
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<String> = (0..1000)
            .map(|_| SlotId::generate().as_str().to_string())
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_parse_legacy_uuid() {
        let uuid = Uuid::new_v4();
        let parsed = SlotId::parse(&uuid.to_string()).unwrap();
        assert!(matches!(parsed, SlotId::Legacy(_)));
        assert_eq!(parsed.as_str(), uuid.as_hyphenated().to_string());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in [
            "",
            "not an id",
            "short",
            "............................",
            // Right length, wrong alphabet.
            "abcdefghijklmnopqrstuvwxy+/",
            // One character short of the hardened length and not a UUID.
            "abcdefghijklmnopqrstuvwxyz",
        ] {
            assert!(
                SlotId::parse(input).is_err(),
                "expected parse failure for {input:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_path_separators() {
        assert!(SlotId::parse("../../../../etc/passwd-xxxxxx").is_err());
        assert!(SlotId::parse("aaaaaaaaaaaa/aaaaaaaaaaaaaa").is_err());
    }

    #[test]
    fn test_ordering_is_textual() {
        let a = SlotId::parse("AAAAAAAAAAAAAAAAAAAAAAAAAAA").unwrap();
        let b = SlotId::parse("BBBBBBBBBBBBBBBBBBBBBBBBBBB").unwrap();
        assert!(a < b);

        let legacy = SlotId::generate_legacy();
        let hardened = SlotId::generate();
        assert_eq!(
            legacy.cmp(&hardened),
            legacy.as_str().cmp(hardened.as_str())
        );
    }

    #[test]
    fn test_serde_as_string() {
        let id = SlotId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_str()));
        let back: SlotId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
