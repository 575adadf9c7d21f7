use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Placeholder title for entries without a `<title>`
pub const UNTITLED: &str = "Untitled Post";

/// Link value used when an entry has no alternate HTML link
pub const NO_LINK: &str = "#";

/// One blog post as handed to the presentation layer.
/// Every field has a fallback, so a record never carries missing data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub published: DateTime<Utc>,
    pub content: String,
    pub url: String,
    pub categories: Vec<String>,
    pub author: String,
}

impl Post {
    pub fn has_link(&self) -> bool {
        self.url != NO_LINK
    }
}
