use tracing::{debug, error, info};

use crate::cache::{Clock, MemoryStorage, PostCache, SessionStorage, SystemClock};
use crate::config::FeedConfig;
use crate::error::{FeedError, FetchError};
use crate::fetcher::{first_success, Exhausted, FeedSource, HttpSource};
use crate::models::Post;
use crate::parser::parse_feed;

/// Produces the blog posts for one configured feed.
///
/// Posts come from the session cache while it is fresh; otherwise each
/// candidate URL is tried in order until one yields a non-empty feed.
///
/// Concurrent calls are not coalesced: two callers that both see a cache
/// miss will both hit the network.
pub struct FeedClient<F, S = MemoryStorage, C = SystemClock> {
    config: FeedConfig,
    candidates: Vec<String>,
    source: F,
    cache: PostCache<S, C>,
}

impl FeedClient<HttpSource> {
    /// HTTP client with a fresh in-memory session cache
    pub fn from_config(config: FeedConfig) -> Result<Self, FetchError> {
        let source = HttpSource::new(config.request_timeout)?;
        let cache = PostCache::new(MemoryStorage::new(), config.cache_duration);
        Ok(Self::new(config, source, cache))
    }
}

impl<F: FeedSource, S: SessionStorage, C: Clock> FeedClient<F, S, C> {
    pub fn new(config: FeedConfig, source: F, cache: PostCache<S, C>) -> Self {
        let candidates = config.candidates();
        Self { config, candidates, source, cache }
    }

    /// Candidate URLs in the order they are tried
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn cache(&self) -> &PostCache<S, C> {
        &self.cache
    }

    /// Returns posts in document order, at most `max_results` of them
    pub async fn fetch_posts(&self) -> Result<Vec<Post>, FeedError> {
        if let Some(posts) = self.cache.read() {
            debug!("Serving {} blog posts from cache", posts.len());
            return Ok(posts);
        }

        if self.config.strategy.is_proxied() {
            info!("Local development detected - will try {} proxy path(s)", self.candidates.len());
        }

        let result = first_success(&self.candidates, move |i, url| self.attempt(i, url)).await;

        match result {
            Ok(posts) => {
                self.cache.write(&posts);
                info!("Successfully fetched {} blog posts", posts.len());
                Ok(posts)
            }
            Err(Exhausted { attempts, last: Some(source) }) => {
                error!("All {} fetch attempts failed", attempts);
                Err(FeedError::Exhausted { attempts, source })
            }
            Err(Exhausted { last: None, .. }) => {
                error!("No retrieval paths configured for {}", self.config.feed_url);
                Err(FeedError::NoCandidates)
            }
        }
    }

    async fn attempt(&self, index: usize, url: &str) -> Result<Vec<Post>, FetchError> {
        if index > 0 {
            info!("Trying fallback {}...", index);
        }
        info!("Fetching blog posts from {}", url);

        let body = self.source.fetch(url).await?;
        let posts = parse_feed(body.as_bytes(), self.config.max_results, &self.config.fallback_author)?;

        if posts.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(posts)
    }
}
