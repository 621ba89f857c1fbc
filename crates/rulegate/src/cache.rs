//! TTL cache with single-flight refresh for the decoded rules container.
//!
//! Verifying many envelopes re-uses one governance snapshot; fetching,
//! signature-checking and decoding the container on every call would be
//! wasteful. [`RulesContainerCache`] wraps the fetch + verify + decode
//! sequence behind a TTL, and collapses concurrent refreshes into a single
//! in-flight fetch shared by every waiter.
//!
//! The fetch future is a shared future rather than a lock held across the
//! fetch: a caller that goes away mid-refresh neither aborts nor poisons
//! the refresh the other callers are waiting on. If every waiter goes away
//! the refresh simply pauses until the next caller arrives and resumes
//! polling it.
//!
//! Verification failures are returned to every waiter of that refresh and
//! are never cached; the next call starts a fresh fetch.

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use rulegate_core::envelope::RuleUserSignature;
use rulegate_core::error::{FetchError, RuleGateError};
use rulegate_rules::DecodedRulesContainer;

use crate::config::VerifierConfig;
use crate::verifier::verify_governance_rules;

/// What the HTTP collaborator returns for a rules fetch: the raw container
/// bytes and the SuperAdmin signatures over exactly those bytes.
#[derive(Debug, Clone)]
pub struct FetchedRules {
    /// Raw, framed container bytes.
    pub container: Vec<u8>,
    /// SuperAdmin signatures over `container`.
    pub signatures: Vec<RuleUserSignature>,
}

/// The seam to the HTTP collaborator. Implementations perform the network
/// I/O, own their timeouts, and report failures as [`FetchError`]; the
/// cache itself never retries.
#[async_trait::async_trait]
pub trait RulesFetcher: Send + Sync {
    /// Fetch the current rules container and its signatures.
    async fn fetch(&self) -> Result<FetchedRules, FetchError>;
}

type SharedRefresh = Shared<BoxFuture<'static, Result<Arc<DecodedRulesContainer>, RuleGateError>>>;

#[derive(Default)]
struct CacheState {
    cached: Option<CachedEntry>,
    /// The current refresh, tagged with its generation so a late waiter
    /// cannot clear or overwrite a refresh it did not take part in.
    in_flight: Option<(u64, SharedRefresh)>,
    next_generation: u64,
}

struct CachedEntry {
    container: Arc<DecodedRulesContainer>,
    fetched_at: Instant,
}

/// TTL + single-flight cache over fetch + verify + decode.
pub struct RulesContainerCache {
    config: VerifierConfig,
    fetcher: Arc<dyn RulesFetcher>,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl RulesContainerCache {
    /// Create a cache.
    ///
    /// A `ttl` of zero is legal and means "always refetch": the cache then
    /// only provides single-flight collapsing, no reuse.
    #[must_use]
    pub fn new(config: VerifierConfig, fetcher: Arc<dyn RulesFetcher>, ttl: Duration) -> Self {
        Self {
            config,
            fetcher,
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Get the current decoded container, fetching and verifying if the
    /// cached one is absent or expired.
    ///
    /// Concurrent callers hitting an expired or empty cache share one
    /// fetch.
    ///
    /// # Errors
    ///
    /// Whatever the shared fetch + verify + decode produced; failures are
    /// not cached.
    pub async fn get(&self) -> Result<Arc<DecodedRulesContainer>, RuleGateError> {
        let (generation, refresh) = {
            let mut state = self.state.lock().await;

            if let Some(entry) = &state.cached {
                if !self.ttl.is_zero() && entry.fetched_at.elapsed() < self.ttl {
                    tracing::debug!("rules container cache hit");
                    return Ok(Arc::clone(&entry.container));
                }
            }

            match &state.in_flight {
                Some((generation, existing)) => (*generation, existing.clone()),
                None => {
                    tracing::debug!("rules container cache miss, starting refresh");
                    let refresh =
                        Self::refresh_future(self.config.clone(), Arc::clone(&self.fetcher));
                    let generation = state.next_generation;
                    state.next_generation += 1;
                    state.in_flight = Some((generation, refresh.clone()));
                    (generation, refresh)
                }
            }
        };

        let result = refresh.await;

        // Publish once: whichever waiter observes completion first installs
        // the result; the generation check keeps a newer refresh intact.
        let mut state = self.state.lock().await;
        if state
            .in_flight
            .as_ref()
            .is_some_and(|(current, _)| *current == generation)
        {
            state.in_flight = None;
            if let Ok(container) = &result {
                state.cached = Some(CachedEntry {
                    container: Arc::clone(container),
                    fetched_at: Instant::now(),
                });
            }
        }

        result
    }

    /// Drop the cached container. The next [`get`](Self::get) fetches
    /// afresh; an in-flight refresh is unaffected.
    pub async fn invalidate(&self) {
        self.state.lock().await.cached = None;
    }

    /// The fetch + verify + decode pipeline as a shareable future.
    fn refresh_future(config: VerifierConfig, fetcher: Arc<dyn RulesFetcher>) -> SharedRefresh {
        async move {
            let fetched = fetcher.fetch().await?;
            verify_governance_rules(
                &fetched.container,
                &fetched.signatures,
                config.min_valid_signatures(),
                config.super_admin_keys(),
            )?;
            let container = rulegate_rules::decode(&fetched.container)?;
            Ok(Arc::new(container))
        }
        .boxed()
        .shared()
    }
}

impl std::fmt::Debug for RulesContainerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulesContainerCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use rulegate_crypto::SigningKey;
    use rulegate_rules::ContainerWire;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fetcher over a fixed container, counting fetches and optionally
    /// delaying to widen race windows.
    struct FixtureFetcher {
        rules: FetchedRules,
        fetches: AtomicUsize,
        delay: Duration,
        fail_first: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RulesFetcher for FixtureFetcher {
        async fn fetch(&self) -> Result<FetchedRules, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail_first.load(Ordering::SeqCst) > 0 {
                self.fail_first.fetch_sub(1, Ordering::SeqCst);
                return Err(FetchError::unavailable("simulated outage"));
            }
            Ok(self.rules.clone())
        }
    }

    fn fixture(delay: Duration, fail_first: usize) -> (VerifierConfig, Arc<FixtureFetcher>) {
        let admin = SigningKey::random();
        let container = ContainerWire {
            enforced_rules_hash: "22".repeat(32),
            timestamp: 1_700_000_000_000,
            ..ContainerWire::default()
        }
        .encode()
        .unwrap();
        let signature = RuleUserSignature {
            user_id: "super-admin".to_string(),
            signature: STANDARD.encode(admin.sign(&container)),
            hashes: Vec::new(),
        };

        let config = VerifierConfig::builder()
            .super_admin_key(admin.public_key())
            .min_valid_signatures(1)
            .build()
            .unwrap();
        let fetcher = Arc::new(FixtureFetcher {
            rules: FetchedRules {
                container,
                signatures: vec![signature],
            },
            fetches: AtomicUsize::new(0),
            delay,
            fail_first: AtomicUsize::new(fail_first),
        });
        (config, fetcher)
    }

    #[tokio::test]
    async fn test_fresh_value_is_reused() {
        let (config, fetcher) = fixture(Duration::ZERO, 0);
        let cache = RulesContainerCache::new(config, fetcher.clone(), Duration::from_secs(60));

        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refetches() {
        let (config, fetcher) = fixture(Duration::ZERO, 0);
        let cache = RulesContainerCache::new(config, fetcher.clone(), Duration::ZERO);

        cache.get().await.unwrap();
        cache.get().await.unwrap();
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let (config, fetcher) = fixture(Duration::ZERO, 0);
        let cache = RulesContainerCache::new(config, fetcher.clone(), Duration::from_secs(60));

        cache.get().await.unwrap();
        cache.invalidate().await;
        cache.get().await.unwrap();
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let (config, fetcher) = fixture(Duration::from_millis(50), 0);
        let cache = Arc::new(RulesContainerCache::new(
            config,
            fetcher.clone(),
            Duration::from_secs(60),
        ));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get().await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let (config, fetcher) = fixture(Duration::ZERO, 1);
        let cache = RulesContainerCache::new(config, fetcher.clone(), Duration::from_secs(60));

        let err = cache.get().await.unwrap_err();
        assert!(matches!(err, RuleGateError::Fetch(_)));

        cache.get().await.unwrap();
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancelled_caller_does_not_poison_shared_fetch() {
        let (config, fetcher) = fixture(Duration::from_millis(80), 0);
        let cache = Arc::new(RulesContainerCache::new(
            config,
            fetcher.clone(),
            Duration::from_secs(60),
        ));

        // First caller starts the refresh, then is cancelled mid-fetch.
        let leader = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        leader.abort();
        assert!(leader.await.unwrap_err().is_cancelled());

        // A later caller resumes the same in-flight refresh.
        cache.get().await.unwrap();
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bad_governance_signature_fails_every_waiter() {
        let (_, good_fetcher) = fixture(Duration::ZERO, 0);
        // Trust a different admin than the one who signed the container.
        let other_admin = SigningKey::random();
        let config = VerifierConfig::builder()
            .super_admin_key(other_admin.public_key())
            .min_valid_signatures(1)
            .build()
            .unwrap();
        let cache = RulesContainerCache::new(config, good_fetcher, Duration::from_secs(60));

        let err = cache.get().await.unwrap_err();
        assert!(err.to_string().contains("0 valid signatures"));
    }
}
