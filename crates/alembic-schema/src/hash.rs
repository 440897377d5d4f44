//! SHA-256 digest newtype and content verification.

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

/// Errors produced while constructing a [`Sha256Digest`].
#[derive(thiserror::Error, Debug)]
pub enum DigestError {
    /// The hex string is not exactly 64 characters long.
    #[error("invalid SHA256 digest: expected 64 hex characters, got {0}")]
    InvalidLength(usize),

    /// The string contains characters outside `[0-9a-fA-F]`.
    #[error("invalid SHA256 digest: contains non-hex characters in '{0}'")]
    NonHex(String),
}

/// A validated SHA-256 digest (64 lowercase hex characters).
///
/// Validation happens at construction and at deserialization time, so an
/// invalid hex string can never propagate into a [`crate::Recipe`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Create a new digest, validating the input.
    ///
    /// Accepts strings with or without a `sha256:` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError`] if the hex portion is not exactly 64 ASCII
    /// hex characters.
    pub fn new(s: impl Into<String>) -> Result<Self, DigestError> {
        let s = s.into();
        let hex = s.strip_prefix("sha256:").unwrap_or(&s);

        if hex.len() != 64 {
            return Err(DigestError::InvalidLength(hex.len()));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DigestError::NonHex(s));
        }

        Ok(Self(hex.to_lowercase()))
    }

    /// Compute the digest of a byte slice.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hex::encode(hasher.finalize()))
    }

    /// Whether `data` hashes to this digest.
    ///
    /// This is the pure half of the checksum verifier: fetched content must
    /// pass this check before any later step may reference it.
    pub fn matches(&self, data: &[u8]) -> bool {
        Self::compute(data) == *self
    }

    /// Return the digest as a lowercase hex string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
