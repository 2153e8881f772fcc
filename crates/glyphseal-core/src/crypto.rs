//! Digest primitive: SHA-256 with a strong type.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::CoreError;

/// Length of a SHA-256 digest in hex characters.
pub const SHA256_HEX_LEN: usize = 64;

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sha256Digest(pub [u8; 32]);

impl Sha256Digest {
    /// Compute the SHA-256 digest of data.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a lowercase hex string of exactly 64 characters.
    ///
    /// Uppercase input is rejected so that a digest has exactly one spelling.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        if s.len() != SHA256_HEX_LEN {
            return Err(CoreError::DecodingError(format!(
                "digest must be {} hex characters, got {}",
                SHA256_HEX_LEN,
                s.len()
            )));
        }
        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(CoreError::DecodingError(
                "digest must be lowercase hex".into(),
            ));
        }
        let bytes = hex::decode(s).map_err(|e| CoreError::DecodingError(e.to_string()))?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHA256({}...)", &self.to_hex()[..16])
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Sha256Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha256Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        // FIPS 180-2 "abc"
        assert_eq!(
            Sha256Digest::hash(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256_deterministic() {
        let h1 = Sha256Digest::hash(b"test data");
        let h2 = Sha256Digest::hash(b"test data");
        assert_eq!(h1, h2);
        assert_ne!(h1, Sha256Digest::hash(b"different data"));
    }

    #[test]
    fn test_hex_roundtrip() {
        let digest = Sha256Digest::hash(b"roundtrip");
        let recovered = Sha256Digest::from_hex(&digest.to_hex()).unwrap();
        assert_eq!(digest, recovered);
    }

    #[test]
    fn test_from_hex_rejects_uppercase_and_bad_length() {
        let hex = Sha256Digest::hash(b"x").to_hex();
        assert!(Sha256Digest::from_hex(&hex.to_uppercase()).is_err());
        assert!(Sha256Digest::from_hex(&hex[..62]).is_err());
        assert!(Sha256Digest::from_hex("zz").is_err());
    }
}
