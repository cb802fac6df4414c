use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Tokens inside this window of their expiry are treated as already expired
/// and refreshed proactively.
pub const REFRESH_SAFETY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token endpoint request failed: {0}")]
    Exchange(String),
    #[error("Token endpoint rejected credentials: {0}")]
    Rejected(String),
}

/// Raw result of one client-credentials exchange.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: u64,
}

/// Performs the actual credential exchange. Kept behind a trait so the cache
/// logic is testable without HTTP.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch(&self) -> Result<IssuedToken, AuthError>;
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn expires_within(&self, margin: Duration) -> bool {
        Instant::now() + margin >= self.expires_at
    }
}

/// Process-wide cache for one upstream's OAuth2 access token.
///
/// The mutex is held for the whole check-and-refresh sequence, so concurrent
/// callers hitting an expired token collapse into a single upstream request;
/// waiters re-check expiry once they acquire the lock and reuse the fresh
/// value.
pub struct TokenCache {
    source: Arc<dyn TokenSource>,
    slot: Mutex<Option<CachedToken>>,
    safety_margin: Duration,
}

impl TokenCache {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            slot: Mutex::new(None),
            safety_margin: REFRESH_SAFETY_MARGIN,
        }
    }

    #[cfg(test)]
    fn with_margin(source: Arc<dyn TokenSource>, safety_margin: Duration) -> Self {
        Self {
            source,
            slot: Mutex::new(None),
            safety_margin,
        }
    }

    /// Current bearer token, refreshing when none is cached or the cached one
    /// is within the safety margin of expiry. A failed refresh leaves the
    /// cache empty so the next call retries from scratch; there is no retry
    /// loop here.
    pub async fn bearer(&self) -> Result<String, AuthError> {
        let mut slot = self.slot.lock().await;

        if let Some(token) = slot.as_ref() {
            if !token.expires_within(self.safety_margin) {
                return Ok(token.value.clone());
            }
            tracing::debug!("cached upstream token is inside the refresh margin");
        }

        *slot = None;
        let issued = self.source.fetch().await?;
        tracing::info!(valid_for = issued.expires_in, "obtained new upstream access token");

        let token = CachedToken {
            value: issued.access_token,
            expires_at: Instant::now() + Duration::from_secs(issued.expires_in),
        };
        let value = token.value.clone();
        *slot = Some(token);
        Ok(value)
    }

    /// Drop the cached token so the next caller performs a fresh exchange.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
        tracing::info!("upstream access token invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        fetches: AtomicUsize,
        expires_in: u64,
        fail_first: AtomicUsize,
    }

    impl CountingSource {
        fn new(expires_in: u64) -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                expires_in,
                fail_first: AtomicUsize::new(0),
            }
        }

        fn failing_once(expires_in: u64) -> Self {
            let source = Self::new(expires_in);
            source.fail_first.store(1, Ordering::SeqCst);
            source
        }
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn fetch(&self) -> Result<IssuedToken, AuthError> {
            // Small delay so concurrent callers overlap the refresh window.
            tokio::time::sleep(Duration::from_millis(20)).await;
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first.load(Ordering::SeqCst) {
                return Err(AuthError::Exchange("simulated outage".into()));
            }
            Ok(IssuedToken {
                access_token: format!("token-{}", n),
                expires_in: self.expires_in,
            })
        }
    }

    #[tokio::test]
    async fn test_cached_token_is_reused() {
        let source = Arc::new(CountingSource::new(3600));
        let cache = TokenCache::new(source.clone());

        let first = cache.bearer().await.unwrap();
        let second = cache.bearer().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_token_inside_margin_is_refreshed() {
        let source = Arc::new(CountingSource::new(3600));
        // Margin larger than the token lifetime: every read sees an
        // about-to-expire token and refreshes.
        let cache = TokenCache::with_margin(source.clone(), Duration::from_secs(7200));

        cache.bearer().await.unwrap();
        cache.bearer().await.unwrap();

        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_trigger_single_refresh() {
        let source = Arc::new(CountingSource::new(3600));
        let cache = Arc::new(TokenCache::new(source.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move { cache.bearer().await.unwrap() }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_cache_and_next_call_retries() {
        let source = Arc::new(CountingSource::failing_once(3600));
        let cache = TokenCache::new(source.clone());

        assert!(cache.bearer().await.is_err());
        let token = cache.bearer().await.unwrap();

        assert_eq!(token, "token-1");
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_new_exchange() {
        let source = Arc::new(CountingSource::new(3600));
        let cache = TokenCache::new(source.clone());

        cache.bearer().await.unwrap();
        cache.invalidate().await;
        cache.bearer().await.unwrap();

        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }
}
