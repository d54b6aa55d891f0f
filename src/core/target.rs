//! Target type for share validation

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Size of the target in bytes
pub const TARGET_SIZE: usize = 32;

/// A 256-bit share target as pushed by `mining.set_target`.
///
/// Bytes are kept in wire order (most significant byte first). Hashes are
/// compared against it from their last byte backwards, see
/// [`Target::compare_hash`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Target(pub [u8; TARGET_SIZE]);

impl Target {
    /// Create a target from wire-order bytes
    pub fn from_bytes(bytes: [u8; TARGET_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create a target from a byte slice of exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; TARGET_SIZE] = bytes.try_into().map_err(|_| {
            Error::invalid_target(format!("Expected {} bytes, got {}", TARGET_SIZE, bytes.len()))
        })?;
        Ok(Self(array))
    }

    /// Create a target from a hex string
    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes =
            hex::decode(hex).map_err(|e| Error::invalid_target(format!("Invalid hex: {}", e)))?;
        Self::from_slice(&bytes)
    }

    /// The all-zero target; no hash meets it
    pub const fn zero() -> Self {
        Self([0u8; TARGET_SIZE])
    }

    /// Get the target as bytes
    pub fn as_bytes(&self) -> &[u8; TARGET_SIZE] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Order a hash relative to this target.
    ///
    /// `hash[i]` is paired with `target[31 - i]`, scanning `i` from 31 down to
    /// 0; the first differing pair decides. This reads the hash as a
    /// little-endian number and the target as a big-endian one.
    pub fn compare_hash(&self, hash: &[u8; TARGET_SIZE]) -> Ordering {
        hash.iter()
            .rev()
            .zip(self.0.iter())
            .map(|(h, t)| h.cmp(t))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Check if a hash is strictly below this target
    pub fn is_met_by(&self, hash: &[u8; TARGET_SIZE]) -> bool {
        self.compare_hash(hash) == Ordering::Less
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Target {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}
