//! Error types for the pinning engine.

/// Pinning errors.
///
/// This is the closed set of outcomes the engine can produce. Results are
/// fanned out to concurrent policy waiters, so the type is `Clone`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PinningError {
    /// Credentials empty, not base64, public key unparsable, or the engine
    /// was used before `setup`.
    #[error("invalid project configuration: {message}")]
    InvalidProjectConfig { message: String },

    /// All network attempts failed and no usable (even stale) cache exists.
    #[error("error fetching pinning info: {message}")]
    ErrorFetchingPinningInfo { message: String },

    /// The signed policy failed an integrity check: malformed envelope,
    /// signature mismatch, or invalid payload JSON.
    #[error("configuration validation failed: {reason}")]
    ConfigurationValidationFailed { reason: String },

    /// The server certificate PEM could not be reduced to leaf DER bytes.
    #[error("invalid server certificate: {reason}")]
    InvalidServerCert { reason: String },

    /// Strict mode and the host is absent from the policy.
    #[error("domain not registered: {host}")]
    DomainNotRegistered { host: String },

    /// At least one non-expired pin exists for the host but none matched.
    #[error("certificate does not match any pin for {host}")]
    PinsMismatch { host: String },

    /// Every pin for the host is expired.
    #[error("all pins expired for {host}")]
    AllPinsExpired { host: String },
}

impl PinningError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidProjectConfig {
            message: message.into(),
        }
    }

    pub(crate) fn fetch(message: impl Into<String>) -> Self {
        Self::ErrorFetchingPinningInfo {
            message: message.into(),
        }
    }

    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Self::ConfigurationValidationFailed {
            reason: reason.into(),
        }
    }

    pub(crate) fn bad_cert(reason: impl Into<String>) -> Self {
        Self::InvalidServerCert {
            reason: reason.into(),
        }
    }

    /// Whether the caller may reasonably retry with back-off.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ErrorFetchingPinningInfo { .. })
    }

    /// Exit code for CLI.
    ///
    /// 1 = pin failure (potential attack or rotation problem),
    /// 2 = project configuration, 3 = policy integrity,
    /// 4 = certificate input, 5 = network.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PinsMismatch { .. }
            | Self::AllPinsExpired { .. }
            | Self::DomainNotRegistered { .. } => 1,
            Self::InvalidProjectConfig { .. } => 2,
            Self::ConfigurationValidationFailed { .. } => 3,
            Self::InvalidServerCert { .. } => 4,
            Self::ErrorFetchingPinningInfo { .. } => 5,
        }
    }
}

/// Result type for pinning operations.
pub type PinningResult<T> = Result<T, PinningError>;
