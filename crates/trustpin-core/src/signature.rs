//! ECDSA P-256 verification of the signed policy envelope.

use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use p256::pkcs8::DecodePublicKey;

use crate::error::{PinningError, PinningResult};

/// Length of a raw `r‖s` ES256 signature.
pub const RAW_SIGNATURE_LEN: usize = 64;

/// Length of a compressed SEC1 point inside a P-256 SPKI key.
const SEC1_COMPRESSED_LEN: usize = 33;

/// Verify a raw 64-byte `r‖s` signature over `message`.
///
/// The wire format is the JWS ES256 raw encoding; it is re-encoded to ASN.1
/// DER before handing it to the verifier.
pub fn verify_es256(
    public_key_der: &[u8],
    message: &[u8],
    signature_raw: &[u8],
) -> PinningResult<()> {
    if signature_raw.len() != RAW_SIGNATURE_LEN {
        return Err(PinningError::validation(format!(
            "expected {RAW_SIGNATURE_LEN}-byte raw signature, got {}",
            signature_raw.len()
        )));
    }

    let der = raw_signature_to_der(signature_raw);
    let signature = Signature::from_der(&der)
        .map_err(|e| PinningError::validation(format!("invalid signature encoding: {e}")))?;
    let key = decode_verifying_key(public_key_der)?;

    key.verify(message, &signature)
        .map_err(|_| PinningError::validation("policy signature does not verify"))
}

/// Decode a P-256 public key from SPKI DER, falling back to the trailing
/// compressed SEC1 point for keys exported without the SPKI envelope.
pub(crate) fn decode_verifying_key(der: &[u8]) -> PinningResult<VerifyingKey> {
    if let Ok(key) = VerifyingKey::from_public_key_der(der) {
        return Ok(key);
    }
    if der.len() >= SEC1_COMPRESSED_LEN {
        let tail = &der[der.len() - SEC1_COMPRESSED_LEN..];
        if let Ok(key) = VerifyingKey::from_sec1_bytes(tail) {
            return Ok(key);
        }
    }
    Err(PinningError::validation("unparsable P-256 public key"))
}

/// Re-encode a raw `r‖s` signature as `SEQUENCE { INTEGER r, INTEGER s }`.
fn raw_signature_to_der(raw: &[u8]) -> Vec<u8> {
    let (r, s) = raw.split_at(raw.len() / 2);
    let r = encode_asn1_integer(r);
    let s = encode_asn1_integer(s);

    // Two 33-byte integers at most, so a single length byte always fits.
    let mut der = Vec::with_capacity(2 + r.len() + s.len());
    der.push(0x30);
    der.push((r.len() + s.len()) as u8);
    der.extend_from_slice(&r);
    der.extend_from_slice(&s);
    der
}

/// ASN.1 INTEGER framing for an unsigned big-endian scalar: leading zeros
/// dropped, `0x00` prefixed when the high bit would read as a sign bit.
fn encode_asn1_integer(scalar: &[u8]) -> Vec<u8> {
    let mut start = 0;
    while start < scalar.len() - 1 && scalar[start] == 0 {
        start += 1;
    }
    let trimmed = &scalar[start..];
    let needs_pad = trimmed[0] & 0x80 != 0;

    let len = trimmed.len() + usize::from(needs_pad);
    let mut out = Vec::with_capacity(2 + len);
    out.push(0x02);
    out.push(len as u8);
    if needs_pad {
        out.push(0x00);
    }
    out.extend_from_slice(trimmed);
    out
}
