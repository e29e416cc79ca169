//! Model digests
//!
//! Provides [`ModelDigest`], a 32-byte Blake3 digest of a serialized model.
//! Two runs over identical inputs must produce the same digest.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte Blake3 digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ModelDigest([u8; 32]);

impl ModelDigest {
    /// Create digest from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Digest arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Digest the compact JSON encoding of a value
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn compute_serializable<T>(value: &T) -> Result<Self, DigestError>
    where
        T: serde::Serialize,
    {
        let json = serde_json::to_vec(value)?;
        Ok(Self::compute(&json))
    }

    /// Short form (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for ModelDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ModelDigest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| DigestError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl serde::Serialize for ModelDigest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for ModelDigest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when working with digests
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// Wrong number of bytes
    #[error("invalid digest length: expected 32, got {0}")]
    InvalidLength(usize),

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_deterministic() {
        assert_eq!(ModelDigest::compute(b"model"), ModelDigest::compute(b"model"));
        assert_ne!(ModelDigest::compute(b"model a"), ModelDigest::compute(b"model b"));
    }

    #[test]
    fn display_and_parse() {
        let digest = ModelDigest::compute(b"test");
        let parsed: ModelDigest = digest.to_string().parse().unwrap();
        assert_eq!(digest, parsed);
        assert!(digest.to_string().starts_with(&digest.short()));
        assert_eq!(digest.short().len(), 16);
    }

    #[test]
    fn parse_rejects_short_hex() {
        assert!(matches!("abcd".parse::<ModelDigest>(), Err(DigestError::InvalidLength(2))));
        assert!("zz".parse::<ModelDigest>().is_err());
    }

    #[test]
    fn serde_as_hex_string() {
        let digest = ModelDigest::compute(b"test");
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json.len(), 66);
        let back: ModelDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }
}
