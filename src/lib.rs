//! Blog feed client for the portfolio post grid.
//!
//! [`FeedClient::fetch_posts`] returns the posts of one Atom feed, served
//! from a short-lived session cache when fresh and otherwise fetched through
//! an ordered list of candidate URLs.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod grid;
pub mod models;
pub mod parser;

pub use cache::{Clock, ManualClock, MemoryStorage, PostCache, SessionStorage, SystemClock};
pub use client::FeedClient;
pub use config::{FeedConfig, RetrievalStrategy};
pub use error::{FeedError, FetchError, StorageError};
pub use fetcher::{FeedSource, HttpSource};
pub use models::Post;
