//! Hex transport encoding for ciphertext.

use crate::error::{WrapError, WrapResult};

/// Encode bytes as lowercase hex, two characters per byte.
pub fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(bytes)
}

/// Decode a hex string of either case.
///
/// Odd lengths and characters outside `[0-9a-fA-F]` are rejected.
pub fn decode_hex(text: &str) -> WrapResult<Vec<u8>> {
    hex::decode(text).map_err(|_| WrapError::MalformedInput)
}
