//! Text encoding of [`SecretParts`].
//!
//! A token is four standard-alphabet base64 segments joined by `.`:
//!
//! ```text
//! <ciphertext>.<iv>.<salt>.<tag>
//! ```
//!
//! The base64 alphabet never contains `.`, so no escaping is needed.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{Result, SecretError};
use crate::types::SecretParts;

/// Separator between token segments.
pub const DELIMITER: &str = ".";

const SEGMENTS: usize = 4;

/// Encode `parts` as a token.
pub fn serialize(parts: &SecretParts) -> String {
    [
        BASE64.encode(&parts.encrypted_data),
        BASE64.encode(parts.iv),
        BASE64.encode(&parts.salt),
        BASE64.encode(parts.tag),
    ]
    .join(DELIMITER)
}

/// Decode a token back into its parts.
///
/// Fails with [`SecretError::MalformedToken`] on a wrong segment count,
/// invalid base64, or an IV/tag of the wrong length. No cryptography runs here.
pub fn deserialize(token: &str) -> Result<SecretParts> {
    let segments: Vec<&str> = token.split(DELIMITER).collect();
    if segments.len() != SEGMENTS {
        return Err(SecretError::MalformedToken(format!(
            "expected {SEGMENTS} segments, found {}",
            segments.len()
        )));
    }

    Ok(SecretParts {
        encrypted_data: decode("ciphertext", segments[0])?,
        iv: fixed("iv", decode("iv", segments[1])?)?,
        salt: decode("salt", segments[2])?,
        tag: fixed("tag", decode("tag", segments[3])?)?,
    })
}

fn decode(field: &str, segment: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(segment)
        .map_err(|e| SecretError::MalformedToken(format!("{field}: {e}")))
}

fn fixed<const N: usize>(field: &str, bytes: Vec<u8>) -> Result<[u8; N]> {
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        SecretError::MalformedToken(format!(
            "{field}: expected {N} bytes, found {}",
            bytes.len()
        ))
    })
}
