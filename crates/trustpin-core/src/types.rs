//! Policy payload types and client configuration.

use serde::{Deserialize, Serialize};

/// A pinned certificate hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    /// Hash algorithm tag (`"sha256"` or `"sha512"`; unknown tags are
    /// tolerated and skipped at match time).
    pub alg: String,

    /// Standard base64 (padded) of the hash of the full leaf DER.
    pub pin: String,

    /// Unix seconds after which the pin no longer matches.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl Pin {
    /// A pin is expired iff `expires_at` is present and strictly before `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        matches!(self.expires_at, Some(at) if at < now)
    }
}

/// Pins for a single domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEntry {
    /// Lowercase DNS name, no scheme or path.
    pub domain: String,

    /// When the entry was last updated (unix seconds).
    pub last_updated: i64,

    /// Ordered pin list; order only affects which match is reported first.
    pub pins: Vec<Pin>,
}

/// The signed policy payload.
///
/// `iat`/`nbf`/`exp` are carried but not enforced; the envelope signature is
/// what gates trust, and only per-pin `expires_at` gates matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinningPolicy {
    pub version: u32,
    pub domains: Vec<DomainEntry>,
    pub iat: i64,
    pub nbf: i64,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Engine-wide policy for hosts absent from the pinning policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinningMode {
    /// Unregistered hosts fail with `DomainNotRegistered`.
    #[default]
    Strict,
    /// Unregistered hosts are allowed (logged at INFO).
    Permissive,
}

/// Validated setup credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub organization_id: String,
    pub project_id: String,
    /// Decoded public key bytes (SPKI DER, or a legacy raw point).
    pub public_key_der: Vec<u8>,
    pub mode: PinningMode,
}

/// CDN client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdnConfig {
    /// Base URL for the policy CDN.
    #[serde(default = "default_cdn_url")]
    pub url: String,

    /// Per-attempt HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Total fetch attempts per policy refresh.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed back-off between transient failures, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// How long a cached policy stays fresh, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// How long a stale cached policy remains usable as a last resort.
    #[serde(default = "default_stale_max_age")]
    pub stale_max_age_secs: u64,
}

fn default_cdn_url() -> String {
    "https://cdn.trustpin.cloud".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    5_000
}

fn default_cache_ttl() -> u64 {
    600
}

fn default_stale_max_age() -> u64 {
    24 * 60 * 60
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            url: default_cdn_url(),
            timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            cache_ttl_secs: default_cache_ttl(),
            stale_max_age_secs: default_stale_max_age(),
        }
    }
}

impl CdnConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `TRUSTPIN_CDN_URL` | Policy CDN base URL |
    /// | `TRUSTPIN_HTTP_TIMEOUT` | Per-attempt timeout in seconds |
    /// | `TRUSTPIN_MAX_ATTEMPTS` | Total fetch attempts |
    /// | `TRUSTPIN_CACHE_TTL` | Cache freshness window in seconds |
    /// | `TRUSTPIN_STALE_MAX_AGE` | Stale-fallback window in seconds |
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("TRUSTPIN_CDN_URL").unwrap_or_else(|_| default_cdn_url()),
            timeout_secs: env_u64("TRUSTPIN_HTTP_TIMEOUT").unwrap_or_else(default_timeout),
            max_attempts: std::env::var("TRUSTPIN_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_max_attempts),
            retry_backoff_ms: default_retry_backoff_ms(),
            cache_ttl_secs: env_u64("TRUSTPIN_CACHE_TTL").unwrap_or_else(default_cache_ttl),
            stale_max_age_secs: env_u64("TRUSTPIN_STALE_MAX_AGE")
                .unwrap_or_else(default_stale_max_age),
        }
    }

    /// Set the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the total attempt count.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the back-off between transient failures.
    pub fn with_retry_backoff_ms(mut self, ms: u64) -> Self {
        self.retry_backoff_ms = ms;
        self
    }

    /// Set the cache freshness window.
    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// Set the stale-fallback window.
    pub fn with_stale_max_age_secs(mut self, secs: u64) -> Self {
        self.stale_max_age_secs = secs;
        self
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
