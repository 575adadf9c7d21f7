use std::time::Duration;
use tracing::warn;

pub const DEFAULT_FEED_URL: &str = "https://blog.romangarms.com/feeds/posts/default";
pub const DEFAULT_MAX_RESULTS: usize = 50;
pub const DEFAULT_CACHE_DURATION: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_AUTHOR: &str = "Roman Garms";

/// Path the development server rewrites to the feed path
pub const DEV_PROXY_PATH: &str = "/api/blogger";

/// Public CORS proxies, tried in this order when proxying is enabled
pub const DEFAULT_CORS_PROXIES: [&str; 3] = [
    "https://corsproxy.io/?",
    "https://api.allorigins.win/raw?url=",
    "https://cors-anywhere.herokuapp.com/",
];

/// How candidate URLs are derived from the feed address.
/// Chosen once when the client is built; never inspected at request time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RetrievalStrategy {
    /// Deployed site: fetch the feed address and nothing else
    #[default]
    Direct,
    /// Local development behind a rewriting dev server at `origin`
    DevProxy { origin: String },
    /// Each proxy prefix gets the percent-encoded feed address appended.
    /// An empty list disables proxying.
    CorsProxies { proxies: Vec<String> },
    /// One proxy first, then the bare feed address
    ProxyThenDirect { proxy: String },
}

impl RetrievalStrategy {
    pub fn default_proxies() -> Self {
        RetrievalStrategy::CorsProxies {
            proxies: DEFAULT_CORS_PROXIES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Ordered list of URLs to try for `feed_url`
    pub fn candidates(&self, feed_url: &str) -> Vec<String> {
        match self {
            RetrievalStrategy::Direct => vec![feed_url.to_string()],
            RetrievalStrategy::DevProxy { origin } => {
                vec![format!("{}{}", origin.trim_end_matches('/'), DEV_PROXY_PATH)]
            }
            RetrievalStrategy::CorsProxies { proxies } if proxies.is_empty() => {
                vec![feed_url.to_string()]
            }
            RetrievalStrategy::CorsProxies { proxies } => {
                let encoded = urlencoding::encode(feed_url);
                proxies
                    .iter()
                    .map(|proxy| format!("{}{}", proxy, encoded))
                    .collect()
            }
            RetrievalStrategy::ProxyThenDirect { proxy } => vec![
                format!("{}{}", proxy, urlencoding::encode(feed_url)),
                feed_url.to_string(),
            ],
        }
    }

    pub fn is_proxied(&self) -> bool {
        !matches!(self, RetrievalStrategy::Direct)
    }
}

/// Fixed configuration of a feed client
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub feed_url: String,
    pub max_results: usize,
    pub cache_duration: Duration,
    pub fallback_author: String,
    pub strategy: RetrievalStrategy,
    /// Per-request timeout; `None` lets a request run until the network gives up
    pub request_timeout: Option<Duration>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            cache_duration: DEFAULT_CACHE_DURATION,
            fallback_author: DEFAULT_AUTHOR.to_string(),
            strategy: RetrievalStrategy::default(),
            request_timeout: None,
        }
    }
}

impl FeedConfig {
    /// Defaults overridden by `PORTFOLIO_FEED_URL`, `PORTFOLIO_FEED_MAX_RESULTS`
    /// and `PORTFOLIO_FEED_CACHE_SECS` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("PORTFOLIO_FEED_URL") {
            if !url.trim().is_empty() {
                config.feed_url = url.trim().to_string();
            }
        }
        if let Some(max) = parse_env_number("PORTFOLIO_FEED_MAX_RESULTS") {
            config.max_results = max as usize;
        }
        if let Some(secs) = parse_env_number("PORTFOLIO_FEED_CACHE_SECS") {
            config.cache_duration = Duration::from_secs(secs);
        }

        config
    }

    pub fn with_strategy(mut self, strategy: RetrievalStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn candidates(&self) -> Vec<String> {
        self.strategy.candidates(&self.feed_url)
    }
}

fn parse_env_number(key: &str) -> Option<u64> {
    let value = std::env::var(key).ok()?;
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a non-negative integer", key, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = "https://blog.example.com/feeds/posts/default";

    #[test]
    fn direct_uses_feed_url_only() {
        assert_eq!(RetrievalStrategy::Direct.candidates(FEED), vec![FEED.to_string()]);
    }

    #[test]
    fn dev_proxy_points_at_rewrite_path() {
        let strategy = RetrievalStrategy::DevProxy {
            origin: "http://localhost:5173/".to_string(),
        };
        assert_eq!(
            strategy.candidates(FEED),
            vec!["http://localhost:5173/api/blogger".to_string()]
        );
    }

    #[test]
    fn cors_proxies_encode_feed_url_in_order() {
        let candidates = RetrievalStrategy::default_proxies().candidates(FEED);
        assert_eq!(candidates.len(), 3);
        assert_eq!(
            candidates[0],
            "https://corsproxy.io/?https%3A%2F%2Fblog.example.com%2Ffeeds%2Fposts%2Fdefault"
        );
        assert!(candidates[1].starts_with("https://api.allorigins.win/raw?url=https%3A"));
        assert!(candidates[2].starts_with("https://cors-anywhere.herokuapp.com/https%3A"));
    }

    #[test]
    fn empty_proxy_list_falls_back_to_direct() {
        let strategy = RetrievalStrategy::CorsProxies { proxies: vec![] };
        assert_eq!(strategy.candidates(FEED), vec![FEED.to_string()]);
    }

    #[test]
    fn proxy_then_direct_has_two_candidates() {
        let strategy = RetrievalStrategy::ProxyThenDirect {
            proxy: "https://corsproxy.io/?".to_string(),
        };
        let candidates = strategy.candidates(FEED);
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].starts_with("https://corsproxy.io/?https%3A%2F%2F"));
        assert_eq!(candidates[1], FEED);
    }

    #[test]
    fn defaults_match_blog_settings() {
        let config = FeedConfig::default();
        assert_eq!(config.max_results, 50);
        assert_eq!(config.cache_duration, Duration::from_secs(1800));
        assert_eq!(config.strategy, RetrievalStrategy::Direct);
        assert!(config.request_timeout.is_none());
    }
}
