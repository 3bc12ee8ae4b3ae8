//! Signed policy acquisition: fetch, verify, cache, single-flight.

use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tokio::sync::{broadcast, Mutex, RwLock};

use crate::error::{PinningError, PinningResult};
use crate::jws;
use crate::logging;
use crate::signature;
use crate::types::{CdnConfig, Credentials, PinningMode, PinningPolicy};

/// User agent for CDN requests.
const USER_AGENT: &str = concat!("trustpin/", env!("CARGO_PKG_VERSION"));

type SharedPolicy = Arc<PinningPolicy>;
type FetchOutcome = PinningResult<SharedPolicy>;

/// A verified policy with its fetch timestamp.
#[derive(Debug, Clone)]
struct CacheEntry {
    policy: SharedPolicy,
    fetched_at: Instant,
}

#[derive(Debug)]
struct StoreState {
    credentials: Option<Arc<Credentials>>,
    cache: Option<CacheEntry>,
}

/// Owns the credentials, the policy cache, and the in-flight fetch handle.
///
/// All mutations go through the serialized `state`/`in_flight` locks, so
/// concurrent readers always observe a consistent snapshot. While a fetch is
/// running, every caller awaits the same broadcast result and exactly one
/// request sequence hits the network.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config: CdnConfig,
    client: reqwest::Client,
    state: Arc<RwLock<StoreState>>,
    in_flight: Arc<Mutex<Option<broadcast::Sender<FetchOutcome>>>>,
}

impl ConfigStore {
    /// Create a store with its own ephemeral HTTP context (no cookies, no
    /// shared connection cache with other stores).
    pub fn new(config: CdnConfig) -> PinningResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PinningError::fetch(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            state: Arc::new(RwLock::new(StoreState {
                credentials: None,
                cache: None,
            })),
            in_flight: Arc::new(Mutex::new(None)),
        })
    }

    /// Register credentials, invalidating any cached or in-flight policy.
    ///
    /// Inputs are trimmed; empty strings and undecodable public keys are
    /// rejected before anything is stored.
    pub async fn set_credentials(
        &self,
        organization_id: &str,
        project_id: &str,
        public_key_b64: &str,
        mode: PinningMode,
    ) -> PinningResult<()> {
        let organization_id = organization_id.trim();
        let project_id = project_id.trim();
        let public_key_b64 = public_key_b64.trim();

        if organization_id.is_empty() || project_id.is_empty() || public_key_b64.is_empty() {
            return Err(PinningError::invalid_config(
                "organization, project, and public key must be non-empty",
            ));
        }

        let public_key_der = BASE64.decode(public_key_b64).map_err(|e| {
            PinningError::invalid_config(format!("public key is not valid base64: {e}"))
        })?;
        if signature::decode_verifying_key(&public_key_der).is_err() {
            return Err(PinningError::invalid_config(
                "public key is not a valid P-256 key",
            ));
        }

        {
            let mut state = self.state.write().await;
            state.credentials = Some(Arc::new(Credentials {
                organization_id: organization_id.to_string(),
                project_id: project_id.to_string(),
                public_key_der,
                mode,
            }));
            state.cache = None;
        }

        // Abandon any fetch started under the old credentials; its waiters
        // see a closed channel and retry against the new ones.
        let mut in_flight = self.in_flight.lock().await;
        *in_flight = None;

        Ok(())
    }

    /// The configured pinning mode.
    pub async fn mode(&self) -> PinningResult<PinningMode> {
        self.state
            .read()
            .await
            .credentials
            .as_ref()
            .map(|c| c.mode)
            .ok_or_else(|| PinningError::invalid_config("pinning engine is not set up"))
    }

    /// Whether credentials have been registered.
    pub async fn is_configured(&self) -> bool {
        self.state.read().await.credentials.is_some()
    }

    /// Clear credentials, cache, and any in-flight fetch. Test hook.
    pub async fn reset(&self) {
        {
            let mut state = self.state.write().await;
            state.credentials = None;
            state.cache = None;
        }
        let mut in_flight = self.in_flight.lock().await;
        *in_flight = None;
    }

    /// Return the current policy, fetching it if the cache is missing or
    /// past its TTL.
    pub async fn get_policy(&self) -> FetchOutcome {
        loop {
            let credentials = {
                let state = self.state.read().await;
                let credentials = state.credentials.clone().ok_or_else(|| {
                    PinningError::invalid_config("pinning engine is not set up")
                })?;
                if let Some(policy) = Self::fresh_policy(&state, self.cache_ttl()) {
                    return Ok(policy);
                }
                credentials
            };

            let mut rx = {
                let mut in_flight = self.in_flight.lock().await;
                match in_flight.as_ref() {
                    Some(tx) => tx.subscribe(),
                    None => {
                        // A fetch may have completed between the freshness
                        // check above and taking the in-flight slot.
                        {
                            let state = self.state.read().await;
                            if let Some(policy) = Self::fresh_policy(&state, self.cache_ttl()) {
                                return Ok(policy);
                            }
                        }
                        let (tx, rx) = broadcast::channel(1);
                        *in_flight = Some(tx.clone());
                        self.spawn_fetch(credentials, tx);
                        rx
                    }
                }
            };

            match rx.recv().await {
                Ok(result) => return result,
                // The fetch was abandoned (credentials changed); retry.
                Err(_) => continue,
            }
        }
    }

    fn fresh_policy(state: &StoreState, ttl: Duration) -> Option<SharedPolicy> {
        state
            .cache
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < ttl)
            .map(|entry| entry.policy.clone())
    }

    /// Run the fetch in its own task so a cancelled waiter never cancels the
    /// fetch for the others.
    fn spawn_fetch(&self, credentials: Arc<Credentials>, tx: broadcast::Sender<FetchOutcome>) {
        let store = self.clone();
        tokio::spawn(async move {
            let result = store.fetch_policy(&credentials).await;
            store.complete_fetch(tx, result).await;
        });
    }

    /// Publish a fetch outcome: cache on success, fall back to a usable
    /// stale entry on failure, then wake every waiter.
    async fn complete_fetch(&self, tx: broadcast::Sender<FetchOutcome>, result: FetchOutcome) {
        let mut in_flight = self.in_flight.lock().await;
        let still_current = in_flight
            .as_ref()
            .is_some_and(|current| current.same_channel(&tx));
        if !still_current {
            // Credentials changed mid-fetch; dropping the sender makes the
            // remaining waiters retry rather than observe a stale result.
            return;
        }

        let result = {
            let mut state = self.state.write().await;
            match result {
                Ok(policy) => {
                    state.cache = Some(CacheEntry {
                        policy: policy.clone(),
                        fetched_at: Instant::now(),
                    });
                    Ok(policy)
                }
                Err(err) => match &state.cache {
                    Some(entry) if entry.fetched_at.elapsed() <= self.stale_max_age() => {
                        logging::info(&format!(
                            "serving stale pinning policy after fetch failure: {err}"
                        ));
                        Ok(entry.policy.clone())
                    }
                    _ => Err(err),
                },
            }
        };

        *in_flight = None;
        let _ = tx.send(result);
    }

    /// Fetch and verify the signed policy, retrying transient failures.
    async fn fetch_policy(&self, credentials: &Credentials) -> FetchOutcome {
        let url = format!(
            "{}/{}/{}/jws.b64",
            self.config.url.trim_end_matches('/'),
            credentials.organization_id,
            credentials.project_id
        );

        let attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.fetch_policy_once(&url, credentials).await {
                Ok(policy) => return Ok(policy),
                Err(err) if err.is_retryable() && attempt < attempts => {
                    logging::debug(&format!(
                        "policy fetch attempt {attempt}/{attempts} failed: {err}"
                    ));
                    tokio::time::sleep(Duration::from_millis(self.config.retry_backoff_ms)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_policy_once(&self, url: &str, credentials: &Credentials) -> FetchOutcome {
        logging::debug(&format!("fetching pinning policy from {url}"));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PinningError::fetch(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PinningError::fetch(format!(
                "CDN returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PinningError::fetch(format!("failed to read response body: {e}")))?;

        if let Some(header) = jws::peek_header(&body) {
            logging::debug(&format!(
                "policy envelope header alg={} typ={}",
                header.alg, header.typ
            ));
        }

        let envelope = jws::split_compact(&body)?;
        signature::verify_es256(
            &credentials.public_key_der,
            envelope.signing_input.as_bytes(),
            &envelope.signature,
        )?;

        let policy: PinningPolicy = serde_json::from_slice(&envelope.payload)
            .map_err(|e| PinningError::validation(format!("invalid policy payload: {e}")))?;

        logging::info(&format!(
            "pinning policy v{} loaded with {} domain(s)",
            policy.version,
            policy.domains.len()
        ));
        Ok(Arc::new(policy))
    }

    fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config.cache_ttl_secs)
    }

    fn stale_max_age(&self) -> Duration {
        Duration::from_secs(self.config.stale_max_age_secs)
    }
}
