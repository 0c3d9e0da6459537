//! Handles the caching logic for keyword image lookups.

use std::collections::HashMap;
use std::time::Duration;

use dioxus_logger::tracing::warn;
use tokio::sync::RwLock;
use web_time::Instant;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::gif_providers::search_term;
use crate::gif_providers::GifError;
use crate::gif_providers::GifProvider;

/// How long a lookup result (including "no match") is reused.
pub const GIF_CACHE_DURATION: Duration = Duration::from_secs(600);

#[derive(Clone, Debug)]
struct CachedGif {
    url: Option<String>,
    last_fetched: Instant,
}

/// Keyword image lookups behind a time-based cache.
pub struct GifCache<P, C = SystemClock> {
    provider: P,
    clock: C,
    entries: RwLock<HashMap<String, CachedGif>>,
}

impl<P: GifProvider> GifCache<P> {
    pub fn new(provider: P) -> Self {
        Self::with_clock(provider, SystemClock)
    }
}

impl<P: GifProvider, C: Clock> GifCache<P, C> {
    pub fn with_clock(provider: P, clock: C) -> Self {
        Self {
            provider,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn fresh(&self, entry: Option<&CachedGif>) -> Option<Option<String>> {
        let entry = entry?;
        (self.clock.now().duration_since(entry.last_fetched) < GIF_CACHE_DURATION)
            .then(|| entry.url.clone())
    }

    /// Finds an image for `keyword`, consulting the provider only when the
    /// cached entry is missing or stale.
    pub async fn search(&self, keyword: &str) -> Result<Option<String>, GifError> {
        let key = search_term(keyword).to_lowercase();

        if let Some(url) = self.fresh(self.entries.read().await.get(&key)) {
            return Ok(url);
        }

        // no lock is held across the provider call; concurrent misses on the
        // same keyword each fetch and the last write wins
        let url = self.provider.search(keyword).await?;
        self.entries.write().await.insert(
            key,
            CachedGif {
                url: url.clone(),
                last_fetched: self.clock.now(),
            },
        );
        Ok(url)
    }

    /// Like `search`, but always yields something displayable.
    pub async fn lookup(&self, keyword: &str, fallback: &str) -> String {
        match self.search(keyword).await {
            Ok(Some(url)) => url,
            Ok(None) => fallback.to_string(),
            Err(e) => {
                warn!("gif lookup for {:?} failed: {}", keyword, e);
                fallback.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::cell::RefCell;

    use tokio::sync::Notify;

    use super::*;
    use crate::clock::ManualClock;

    const FALLBACK: &str = "https://example.invalid/fallback.gif";

    #[derive(Default)]
    struct CountingProvider {
        calls: Cell<usize>,
        fail: Cell<bool>,
        last_keyword: RefCell<String>,
    }

    impl GifProvider for &CountingProvider {
        async fn search(&self, keyword: &str) -> Result<Option<String>, GifError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_keyword.borrow_mut() = keyword.to_string();
            if self.fail.get() {
                return Err(GifError::Unavailable("rate limited".to_string()));
            }
            match search_term(keyword).as_str() {
                "" | "nothing" => Ok(None),
                term => Ok(Some(format!("https://media.giphy.com/{term}.gif"))),
            }
        }
    }

    /// Holds "slow" lookups until the gate opens.
    #[derive(Default)]
    struct GatedProvider {
        gate: Notify,
    }

    impl GifProvider for &GatedProvider {
        async fn search(&self, keyword: &str) -> Result<Option<String>, GifError> {
            if keyword == "slow" {
                self.gate.notified().await;
            }
            Ok(Some(format!("https://media.giphy.com/{keyword}.gif")))
        }
    }

    #[tokio::test]
    async fn test_slow_lookup_does_not_block_other_keywords() {
        let provider = GatedProvider::default();
        let cache = GifCache::with_clock(&provider, ManualClock::new());

        let slow = cache.lookup("slow", FALLBACK);
        let fast = async {
            let url = tokio::time::timeout(Duration::from_secs(1), cache.lookup("fast", FALLBACK))
                .await
                .expect("lookup for another keyword waited on the slow one");
            provider.gate.notify_one();
            url
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert_eq!(fast, "https://media.giphy.com/fast.gif");
        assert_eq!(slow, "https://media.giphy.com/slow.gif");
    }

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let provider = CountingProvider::default();
        let clock = ManualClock::new();
        let cache = GifCache::with_clock(&provider, clock.clone());

        assert_eq!(
            cache.lookup("wave", FALLBACK).await,
            "https://media.giphy.com/wave.gif"
        );
        clock.advance(Duration::from_secs(599));
        cache.lookup("wave", FALLBACK).await;
        assert_eq!(provider.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_refetch_after_ttl() {
        let provider = CountingProvider::default();
        let clock = ManualClock::new();
        let cache = GifCache::with_clock(&provider, clock.clone());

        cache.lookup("wave", FALLBACK).await;
        clock.advance(GIF_CACHE_DURATION);
        cache.lookup("wave", FALLBACK).await;
        assert_eq!(provider.calls.get(), 2);
    }

    #[tokio::test]
    async fn test_keywords_share_entries_ignoring_spaces_and_case() {
        let provider = CountingProvider::default();
        let cache = GifCache::with_clock(&provider, ManualClock::new());

        cache.lookup("Happy Birthday", FALLBACK).await;
        cache.lookup("happybirthday", FALLBACK).await;
        assert_eq!(provider.calls.get(), 1);
        assert_eq!(*provider.last_keyword.borrow(), "Happy Birthday");
    }

    #[tokio::test]
    async fn test_miss_is_cached_and_falls_back() {
        let provider = CountingProvider::default();
        let cache = GifCache::with_clock(&provider, ManualClock::new());

        assert_eq!(cache.lookup("nothing", FALLBACK).await, FALLBACK);
        assert_eq!(cache.lookup("nothing", FALLBACK).await, FALLBACK);
        assert_eq!(provider.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let provider = CountingProvider::default();
        provider.fail.set(true);
        let cache = GifCache::with_clock(&provider, ManualClock::new());

        assert_eq!(cache.lookup("wave", FALLBACK).await, FALLBACK);
        provider.fail.set(false);
        assert_eq!(
            cache.lookup("wave", FALLBACK).await,
            "https://media.giphy.com/wave.gif"
        );
        assert_eq!(provider.calls.get(), 2);
    }
}
