//! Presentation helpers for the post grid and the post overlay.
//!
//! The feed client hands back posts in document order; everything here is
//! what the page does with them afterwards: newest-first ordering, card
//! summaries and the full-post view.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::error::FeedError;
use crate::models::Post;

pub const EXCERPT_LENGTH: usize = 250;
pub const CARD_TAG_LIMIT: usize = 4;
pub const EMPTY_EXCERPT: &str = "Click to read more about this project.";
pub const NO_POSTS: &str = "No blog posts found.";

static IMG_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img[^>]+src=["']([^"'>]+)["']"#).expect("valid image regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Sorts by publish date, newest first. Posts with equal dates keep their order.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.published.cmp(&a.published));
}

/// URL of the first `<img>` in the post body
pub fn preview_image(content: &str) -> Option<String> {
    IMG_SRC
        .captures(content)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Plain-text excerpt of an HTML body, cut to `max_len` characters
pub fn excerpt(content: &str, max_len: usize) -> String {
    if content.is_empty() {
        return EMPTY_EXCERPT.to_string();
    }

    let stripped = TAG.replace_all(content, " ");
    let text = WHITESPACE.replace_all(&stripped, " ");
    let text = text.trim();

    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_len).collect();
    format!("{}...", cut.trim_end())
}

/// Summary shown in the grid for one post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub excerpt: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub date: String,
    pub url: String,
}

impl Card {
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            excerpt: excerpt(&post.content, EXCERPT_LENGTH),
            image: preview_image(&post.content),
            tags: post.categories.iter().take(CARD_TAG_LIMIT).cloned().collect(),
            date: post.published.format("%b %Y").to_string(),
            url: post.url.clone(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.title, self.date)?;
        if !self.tags.is_empty() {
            writeln!(f, "  [{}]", self.tags.join("] ["))?;
        }
        if let Some(ref image) = self.image {
            writeln!(f, "  image: {}", image)?;
        }
        write!(f, "  {}", self.excerpt)
    }
}

/// Full view of a selected post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub title: String,
    pub date: String,
    pub byline: String,
    pub tags: Vec<String>,
    pub body: String,
    pub link: Option<(String, String)>,
}

impl Overlay {
    /// Builds the overlay with the body rendered as text `width` columns wide
    pub fn from_post(post: &Post, width: usize) -> Self {
        let link = post.has_link().then(|| {
            let label = reqwest::Url::parse(&post.url)
                .ok()
                .and_then(|u| u.host_str().map(|h| format!("View on {}", h)))
                .unwrap_or_else(|| "View original".to_string());
            (label, post.url.clone())
        });

        Self {
            title: post.title.clone(),
            date: post.published.format("%B %-d, %Y").to_string(),
            byline: format!("by {}", post.author),
            tags: post.categories.clone(),
            body: html2text::from_read(post.content.as_bytes(), width),
            link,
        }
    }
}

impl fmt::Display for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.title)?;
        writeln!(f, "{}  {}", self.date, self.byline)?;
        if !self.tags.is_empty() {
            writeln!(f, "[{}]", self.tags.join("] ["))?;
        }
        writeln!(f, "\n────────────────────────────────────────\n")?;
        writeln!(f, "{}", self.body.trim_end())?;
        if let Some((ref label, ref url)) = self.link {
            write!(f, "\n{}: {}", label, url)?;
        }
        Ok(())
    }
}

/// What the grid shows while and after posts load
#[derive(Debug)]
pub enum ViewState {
    Loading,
    Failed(String),
    Ready(Vec<Post>),
}

impl ViewState {
    /// Settles a fetch outcome into a displayable state, newest posts first
    pub fn from_result(result: Result<Vec<Post>, FeedError>) -> Self {
        match result {
            Ok(posts) if posts.is_empty() => ViewState::Failed(NO_POSTS.to_string()),
            Ok(mut posts) => {
                sort_newest_first(&mut posts);
                ViewState::Ready(posts)
            }
            Err(e) => ViewState::Failed(e.to_string()),
        }
    }

    pub fn cards(&self) -> Vec<Card> {
        match self {
            ViewState::Ready(posts) => posts.iter().map(Card::from_post).collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewState::Loading => write!(f, "Loading blog posts..."),
            ViewState::Failed(message) => write!(f, "Error Loading Posts\n{}", message),
            ViewState::Ready(posts) => write!(f, "{} blog posts", posts.len()),
        }
    }
}
