//! Boundary helpers for host-TLS-stack adapters.
//!
//! An adapter sits between a TLS server-trust callback and the engine: the
//! host TLS stack completes its default chain, time, and hostname validation
//! first, then hands the leaf certificate here. On any error the adapter is
//! expected to cancel the authentication challenge.

use crate::engine::TrustPin;
use crate::error::PinningResult;
use crate::pem;

/// Verify a server-trust challenge that already passed host TLS validation.
///
/// Wraps the leaf DER in PEM markers with 64-character line wrapping and
/// runs the full verification workflow for `host`.
pub async fn verify_server_trust(
    engine: &TrustPin,
    host: &str,
    leaf_der: &[u8],
) -> PinningResult<()> {
    let pem = pem::encode_der_to_pem(leaf_der);
    engine.verify(host, &pem).await
}
