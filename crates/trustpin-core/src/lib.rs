//! Client-side certificate pinning against a remotely signed policy.
//!
//! This crate implements the client half of a pinning deployment:
//!
//! - Fetches a compact-JWS policy document from a CDN and verifies its
//!   ECDSA-P256 signature against a caller-supplied public key
//! - Caches the verified policy with a freshness TTL, falls back to a
//!   bounded stale copy when the network is down, and coordinates
//!   concurrent callers so at most one fetch is in flight
//! - Matches a server's leaf certificate against the policy's pins
//!   (SHA-256/SHA-512 over the full DER), honoring per-pin expiration and a
//!   strict/permissive stance for unregistered hosts
//!
//! The engine pins only the leaf; chain, time, and hostname validation stay
//! with the host TLS stack.
//!
//! # Quick Start
//!
//! ```no_run
//! use trustpin_core::{CdnConfig, PinningMode, TrustPin};
//!
//! # async fn example() -> trustpin_core::PinningResult<()> {
//! let engine = TrustPin::new(CdnConfig::from_env())?;
//! engine
//!     .setup("my-org", "my-project", "<base64 SPKI public key>", PinningMode::Strict)
//!     .await?;
//!
//! let pem = std::fs::read_to_string("server.pem").expect("readable certificate");
//! engine.verify("api.example.com", &pem).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `TRUSTPIN_CDN_URL` | Policy CDN base URL (default: `https://cdn.trustpin.cloud`) |
//! | `TRUSTPIN_HTTP_TIMEOUT` | Per-attempt timeout in seconds (default: 30) |
//! | `TRUSTPIN_MAX_ATTEMPTS` | Total fetch attempts (default: 3) |
//! | `TRUSTPIN_CACHE_TTL` | Cache freshness window in seconds (default: 600) |
//! | `TRUSTPIN_STALE_MAX_AGE` | Stale-fallback window in seconds (default: 86400) |

pub mod adapter;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod host;
pub mod jws;
pub mod logging;
pub mod matcher;
pub mod pem;
pub mod signature;
pub mod store;
pub mod types;

pub use engine::TrustPin;
pub use error::{PinningError, PinningResult};
pub use logging::{set_log_level, LogLevel};
pub use matcher::HashAlgorithm;
pub use store::ConfigStore;
pub use types::{CdnConfig, Credentials, DomainEntry, Pin, PinningMode, PinningPolicy};
