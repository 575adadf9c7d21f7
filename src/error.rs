//! Error types for the feed client
//!
//! - `FetchError`: one candidate URL failed; the client moves on to the next
//! - `StorageError`: session cache I/O; always recovered inside the cache
//! - `FeedError`: the only error `fetch_posts` returns to callers

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Failed to parse RSS feed XML: {0}")]
    Parse(String),

    #[error("No posts found in RSS feed")]
    Empty,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt cache data: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to fetch blog posts: {source}")]
    Exhausted {
        attempts: usize,
        #[source]
        source: FetchError,
    },

    #[error("Failed to fetch blog posts: no retrieval paths configured")]
    NoCandidates,
}
