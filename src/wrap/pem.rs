//! PEM envelope decoding.
//!
//! Only the envelope is handled here: markers are located, the payload
//! between them is stripped of whitespace and base64-decoded. Whether the
//! bytes describe a usable key is decided by [`crate::wrap::key`].

use crate::error::{WrapError, WrapResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Label of an SPKI public key envelope.
pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

/// Decode the payload of a `-----BEGIN <label>-----` envelope.
///
/// Text before the header or after the footer is ignored. A missing marker,
/// an empty payload or a payload that is not base64 yields
/// [`WrapError::MalformedKey`].
pub fn decode_pem(pem_text: &str, expected_label: &str) -> WrapResult<Vec<u8>> {
    let header = format!("-----BEGIN {expected_label}-----");
    let footer = format!("-----END {expected_label}-----");

    let body_start = pem_text
        .find(&header)
        .map(|idx| idx + header.len())
        .ok_or(WrapError::MalformedKey)?;
    let body_len = pem_text[body_start..]
        .find(&footer)
        .ok_or(WrapError::MalformedKey)?;

    let payload: String = pem_text[body_start..body_start + body_len]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if payload.is_empty() {
        return Err(WrapError::MalformedKey);
    }

    BASE64.decode(payload).map_err(|_| WrapError::MalformedKey)
}
