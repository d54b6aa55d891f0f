//! Hex encoding utilities for Stratum protocol
//!
//! Every binary field on the wire (pool nonce, header fragments, target,
//! client nonce, solution) travels as a hex string.

use crate::error::{Error, Result};

/// Encode bytes as a lowercase hex string
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode a hex string to bytes
pub fn decode_hex(hex_str: &str) -> Result<Vec<u8>> {
    hex::decode(hex_str).map_err(|e| Error::stratum(format!("Invalid hex string: {}", e)))
}

/// Decode a hex string into a fixed-size array
pub fn decode_hex_array<const N: usize>(hex_str: &str) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    hex::decode_to_slice(hex_str, &mut out).map_err(|e| {
        Error::stratum(format!(
            "Invalid hex string for {} bytes ({} chars): {}",
            N,
            hex_str.len(),
            e
        ))
    })?;
    Ok(out)
}

/// Decode the concatenation of several hex fragments
pub fn decode_hex_concat<'a>(fragments: impl IntoIterator<Item = &'a str>) -> Result<Vec<u8>> {
    let joined: String = fragments.into_iter().collect();
    decode_hex(&joined)
}
