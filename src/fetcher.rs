use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::FetchError;

pub const FEED_ACCEPT: &str = "application/xml, text/xml, application/atom+xml";

/// Retrieves the raw feed document behind one candidate URL
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP feed source backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(FEED_ACCEPT));

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("portfolio-feed/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self { client: builder.build()? })
    }
}

#[async_trait]
impl FeedSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Every candidate failed
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: usize,
    /// Failure of the last candidate tried; `None` when there were no candidates
    pub last: Option<E>,
}

/// Tries `candidates` strictly in order and returns the first success.
/// The next attempt starts only after the previous one has failed.
pub async fn first_success<'a, T, E, F, Fut>(candidates: &'a [String], mut attempt: F) -> Result<T, Exhausted<E>>
where
    F: FnMut(usize, &'a str) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut last = None;

    for (i, url) in candidates.iter().enumerate() {
        match attempt(i, url.as_str()).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("Failed to fetch from candidate {} ({}): {}", i + 1, url, e);
                last = Some(e);
            }
        }
    }

    Err(Exhausted {
        attempts: candidates.len(),
        last,
    })
}
