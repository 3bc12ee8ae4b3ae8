//! PEM handling for leaf certificates.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::{PinningError, PinningResult};

const BEGIN_MARKER: &str = "-----BEGIN CERTIFICATE-----";
const END_MARKER: &str = "-----END CERTIFICATE-----";

/// Extract the DER bytes of the first certificate in a PEM string.
///
/// Marker lines and blank lines are dropped, the remaining body lines are
/// joined and base64-decoded. Bundles with more than one certificate yield
/// only the first block; the rest is ignored.
pub fn extract_leaf_der(pem: &str) -> PinningResult<Vec<u8>> {
    let mut body = String::new();
    let mut in_block = false;
    let mut complete = false;

    for line in pem.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == BEGIN_MARKER {
            in_block = true;
            continue;
        }
        if line == END_MARKER {
            if !in_block {
                return Err(PinningError::bad_cert("END marker before BEGIN marker"));
            }
            complete = true;
            break;
        }
        if in_block {
            body.push_str(line);
        }
    }

    if !in_block {
        return Err(PinningError::bad_cert("missing BEGIN CERTIFICATE marker"));
    }
    if !complete {
        return Err(PinningError::bad_cert("missing END CERTIFICATE marker"));
    }
    if body.is_empty() {
        return Err(PinningError::bad_cert("certificate body is empty"));
    }

    let der = BASE64
        .decode(body)
        .map_err(|e| PinningError::bad_cert(format!("certificate body is not base64: {e}")))?;
    if der.is_empty() {
        return Err(PinningError::bad_cert("certificate decodes to zero bytes"));
    }
    Ok(der)
}

/// Encode certificate DER bytes as PEM with 64-character line wrapping.
pub fn encode_der_to_pem(der: &[u8]) -> String {
    let body = BASE64.encode(der);
    let mut pem = String::with_capacity(body.len() + body.len() / 64 + 64);
    pem.push_str(BEGIN_MARKER);
    pem.push('\n');
    for chunk in body.as_bytes().chunks(64) {
        // base64 output is ASCII, so chunking cannot split a code point
        pem.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        pem.push('\n');
    }
    pem.push_str(END_MARKER);
    pem.push('\n');
    pem
}
