//! Compact-JWS envelope handling.
//!
//! The policy document travels as three base64url segments
//! `header.payload.signature`; the signature covers the ASCII bytes of the
//! first two segments joined by a literal `.`.

use serde::{Deserialize, Serialize};

use crate::encoding::decode_base64url;
use crate::error::{PinningError, PinningResult};

/// Recognized header fields of the policy envelope.
///
/// Informational only; the configured public key is what gates trust.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwsHeader {
    #[serde(default)]
    pub alg: String,
    #[serde(default)]
    pub typ: String,
}

/// A split envelope, ready for signature verification.
#[derive(Debug, Clone)]
pub struct SignedEnvelope {
    /// The ASCII signing input: `header.payload` as received.
    pub signing_input: String,
    /// Decoded payload bytes.
    pub payload: Vec<u8>,
    /// Decoded raw signature bytes.
    pub signature: Vec<u8>,
}

/// Split a compact serialization into its verified parts.
pub fn split_compact(token: &str) -> PinningResult<SignedEnvelope> {
    let token = token.trim();
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(PinningError::validation(format!(
            "expected 3 envelope segments, got {}",
            segments.len()
        )));
    }

    let payload = decode_base64url(segments[1])?;
    let signature = decode_base64url(segments[2])?;

    Ok(SignedEnvelope {
        signing_input: format!("{}.{}", segments[0], segments[1]),
        payload,
        signature,
    })
}

/// Best-effort decode of the header segment, for diagnostics only.
pub fn peek_header(token: &str) -> Option<JwsHeader> {
    let header_segment = token.trim().split('.').next()?;
    let bytes = decode_base64url(header_segment).ok()?;
    serde_json::from_slice(&bytes).ok()
}
