use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Link};
use feed_rs::parser;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::models::{Post, NO_LINK, UNTITLED};

const ALTERNATE: &str = "alternate";
const HTML: &str = "text/html";

static ENTRY_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<(?:entry|item)\b.*?</(?:entry|item)>").expect("valid entry regex"));
static PUBLISHED_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(?:published|pubDate)\b[^>]*>\s*([^<]*?)\s*</(?:published|pubDate)>")
        .expect("valid published regex")
});

/// Parses an Atom/RSS document into posts, in document order.
///
/// A document that does not parse fails as a whole. Fields missing from an
/// entry get their fallback values, so every entry yields a post. The result
/// is cut to `max_results` only after every entry has been mapped.
pub fn parse_feed(xml: &[u8], max_results: usize, fallback_author: &str) -> Result<Vec<Post>, FetchError> {
    let feed = parser::parse(xml).map_err(|e| FetchError::Parse(e.to_string()))?;
    debug!("Feed document contains {} entries", feed.entries.len());

    let mut raw_dates = raw_published(&String::from_utf8_lossy(xml));
    if raw_dates.len() != feed.entries.len() {
        debug!("Could not line up raw dates with {} entries", feed.entries.len());
        raw_dates = vec![None; feed.entries.len()];
    }

    let mut posts: Vec<Post> = feed.entries
        .into_iter()
        .zip(raw_dates)
        .map(|(entry, raw)| entry_to_post(entry, raw.as_deref(), fallback_author))
        .collect();

    posts.truncate(max_results);
    Ok(posts)
}

/// Maps a single feed entry to a post, filling every missing field.
///
/// `raw_published` is the text of the entry's `<published>` node, if it had
/// one; it only matters when feed-rs could not read it as a date.
pub fn entry_to_post(entry: Entry, raw_published: Option<&str>, fallback_author: &str) -> Post {
    let url = alternate_html_link(&entry.links)
        .map(|link| link.href.clone())
        .unwrap_or_else(|| NO_LINK.to_string());

    let published = match (entry.published, raw_published) {
        (Some(published), _) => published,
        (None, Some(raw)) if !raw.is_empty() => unreadable_date(&entry.id, raw, entry.updated),
        (None, _) => Utc::now(),
    };

    let title = entry.title
        .map(|t| t.content)
        .unwrap_or_else(|| UNTITLED.to_string());

    let content = entry.content
        .and_then(|c| c.body)
        .unwrap_or_default();

    let categories = entry.categories
        .into_iter()
        .map(|c| c.term)
        .filter(|term| !term.is_empty())
        .collect();

    let author = entry.authors
        .into_iter()
        .map(|a| a.name)
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| fallback_author.to_string());

    Post {
        title,
        published,
        content,
        url,
        categories,
        author,
    }
}

/// A `<published>` node was present but not a date feed-rs understands.
/// The entry's `<updated>` stamp is closer to the truth than the fetch time.
fn unreadable_date(id: &str, raw: &str, updated: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match updated {
        Some(updated) => {
            warn!("Entry {} has unreadable published date {:?}; using updated {}", id, raw, updated);
            updated
        }
        None => {
            warn!("Entry {} has unreadable published date {:?}; using current time", id, raw);
            Utc::now()
        }
    }
}

/// Text of each entry's `<published>` node, in document order
fn raw_published(xml: &str) -> Vec<Option<String>> {
    ENTRY_BLOCK
        .find_iter(xml)
        .map(|block| {
            PUBLISHED_TEXT
                .captures(block.as_str())
                .and_then(|cap| cap.get(1))
                .map(|m| m.as_str().to_string())
        })
        .collect()
}

fn alternate_html_link(links: &[Link]) -> Option<&Link> {
    links.iter().find(|link| {
        link.rel.as_deref() == Some(ALTERNATE) && link.media_type.as_deref() == Some(HTML)
    })
}
