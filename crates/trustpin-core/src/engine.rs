//! Engine façade: lifecycle, mode policy, and error classification.

use crate::error::{PinningError, PinningResult};
use crate::host;
use crate::logging::{self, LogLevel};
use crate::matcher;
use crate::pem;
use crate::store::ConfigStore;
use crate::types::{CdnConfig, PinningMode};

/// The certificate pinning engine.
///
/// Holds a [`ConfigStore`] and layers the verification workflow on top:
/// normalize the host, reduce the PEM to leaf DER, look up the policy entry,
/// and match pins. Clones share state, and independent instances never
/// affect each other.
#[derive(Debug, Clone)]
pub struct TrustPin {
    store: ConfigStore,
}

impl TrustPin {
    /// Create an engine against the given CDN configuration.
    pub fn new(config: CdnConfig) -> PinningResult<Self> {
        Ok(Self {
            store: ConfigStore::new(config)?,
        })
    }

    /// Create an engine with the production defaults.
    pub fn with_defaults() -> PinningResult<Self> {
        Self::new(CdnConfig::default())
    }

    /// Register project credentials and prefetch the policy.
    ///
    /// The prefetch warms the cache so the first `verify` usually avoids a
    /// network round-trip; a prefetch failure is logged and deferred to
    /// `verify`, where it gets its own classification.
    pub async fn setup(
        &self,
        organization_id: &str,
        project_id: &str,
        public_key_b64: &str,
        mode: PinningMode,
    ) -> PinningResult<()> {
        self.store
            .set_credentials(organization_id, project_id, public_key_b64, mode)
            .await?;

        if let Err(err) = self.store.get_policy().await {
            logging::info(&format!("policy prefetch failed: {err}"));
        }
        Ok(())
    }

    /// Verify a PEM-encoded server certificate for a hostname.
    ///
    /// Every failure is classified into exactly one [`PinningError`] and
    /// emits one ERROR-level log line naming the host.
    pub async fn verify(&self, host: &str, certificate_pem: &str) -> PinningResult<()> {
        match self.verify_inner(host, certificate_pem).await {
            Ok(()) => Ok(()),
            Err(err) => {
                logging::error(&format!("pinning verification failed for {host}: {err}"));
                Err(err)
            }
        }
    }

    async fn verify_inner(&self, host: &str, certificate_pem: &str) -> PinningResult<()> {
        let mode = self.store.mode().await?;

        let policy = self.store.get_policy().await.map_err(remap_fetch_error)?;

        let canonical = host::normalize(host);
        let der = pem::extract_leaf_der(certificate_pem)?;

        let mut entries = policy
            .domains
            .iter()
            .filter(|entry| entry.domain == canonical);
        let entry = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            (Some(_), Some(_)) => {
                return Err(PinningError::invalid_config(format!(
                    "multiple policy entries for domain {canonical}"
                )))
            }
            (None, _) => {
                return match mode {
                    PinningMode::Strict => Err(PinningError::DomainNotRegistered {
                        host: canonical,
                    }),
                    PinningMode::Permissive => {
                        logging::info(&format!(
                            "{canonical} is not registered; permissive mode allows it"
                        ));
                        Ok(())
                    }
                };
            }
        };

        let now = chrono::Utc::now().timestamp();
        matcher::match_pins(&der, entry, now)
    }

    /// Clear credentials, cache, and any in-flight fetch. Test hook.
    pub async fn reset(&self) {
        self.store.reset().await;
    }

    /// Set the process-wide diagnostic level.
    pub fn set_log_level(&self, level: LogLevel) {
        logging::set_log_level(level);
    }
}

/// Fetch failures surface as `ErrorFetchingPinningInfo`; integrity and
/// project-configuration failures keep their own classification.
fn remap_fetch_error(err: PinningError) -> PinningError {
    match err {
        PinningError::ConfigurationValidationFailed { .. }
        | PinningError::InvalidProjectConfig { .. }
        | PinningError::ErrorFetchingPinningInfo { .. } => err,
        other => PinningError::fetch(other.to_string()),
    }
}
