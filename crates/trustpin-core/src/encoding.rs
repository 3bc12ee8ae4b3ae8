//! Base64url (RFC 4648 §5) decoding via the standard alphabet.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::{PinningError, PinningResult};

/// Decode an unpadded base64url string.
///
/// Substitutes `-`/`_` with `+`/`/`, restores `=` padding to a multiple of
/// four, and decodes with the standard engine. Inputs whose length is
/// `1 mod 4` cannot be valid base64url and are rejected outright.
pub fn decode_base64url(input: &str) -> PinningResult<Vec<u8>> {
    if input.len() % 4 == 1 {
        return Err(PinningError::validation(
            "base64url segment has invalid length",
        ));
    }

    let mut converted: String = input
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    let pad = (4 - converted.len() % 4) % 4;
    for _ in 0..pad {
        converted.push('=');
    }

    BASE64
        .decode(converted)
        .map_err(|e| PinningError::validation(format!("invalid base64url segment: {e}")))
}
