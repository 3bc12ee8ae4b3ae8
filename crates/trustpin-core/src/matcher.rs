//! Pin matching over a leaf certificate.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256, Sha512};

use crate::error::{PinningError, PinningResult};
use crate::logging;
use crate::types::DomainEntry;

/// Supported pin hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Parse a policy algorithm tag. Unknown tags are rejected so that the
    /// matcher can skip them instead of failing the whole policy.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sha256" => Some(Self::Sha256),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Hash certificate DER bytes under this algorithm.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

/// Match leaf certificate DER bytes against a domain's pins.
///
/// Expired pins are skipped outright so that a lapsed maintenance window is
/// distinguishable from an actual mismatch; pins with an unknown algorithm
/// tag still count as live but cannot match.
pub fn match_pins(der: &[u8], entry: &DomainEntry, now: i64) -> PinningResult<()> {
    let mut any_unexpired = false;

    for pin in &entry.pins {
        if pin.is_expired(now) {
            logging::debug(&format!("skipping expired pin for {}", entry.domain));
            continue;
        }
        any_unexpired = true;

        let alg = match HashAlgorithm::from_tag(&pin.alg) {
            Some(alg) => alg,
            None => {
                logging::error(&format!(
                    "unknown pin algorithm {:?} for {}",
                    pin.alg, entry.domain
                ));
                continue;
            }
        };

        let computed = BASE64.encode(alg.digest(der));
        if computed == pin.pin {
            logging::debug(&format!("certificate matched a pin for {}", entry.domain));
            return Ok(());
        }
    }

    if any_unexpired {
        Err(PinningError::PinsMismatch {
            host: entry.domain.clone(),
        })
    } else {
        Err(PinningError::AllPinsExpired {
            host: entry.domain.clone(),
        })
    }
}
