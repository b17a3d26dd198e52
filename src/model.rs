//! Records produced and passed around during a harvest

use serde::Serialize;
use url::Url;

/// A single normalized forum post, ready for downstream ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    /// Title of the thread the post belongs to
    pub title: String,

    /// Post body with any leading quoted text removed
    pub content: String,

    /// Always `None`: the forum markup gives no stable author field
    pub author: Option<String>,

    /// Absolute UTC timestamp, `YYYY-MM-DDTHH:MM:SS.00Z`
    pub created_at: String,

    /// Absolute permalink to this specific post
    pub url: String,

    /// Source site, see [`crate::SOURCE_DOMAIN`]
    pub domain: String,
}

/// A thread discovered on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadReference {
    /// Title shown on the listing, when the listing format carries one
    pub title: Option<String>,

    /// Page to fetch for the thread's newest posts
    pub url: Url,
}

impl ThreadReference {
    pub fn new(url: Url) -> Self {
        Self { title: None, url }
    }

    pub fn with_title(url: Url, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            url,
        }
    }
}

/// A sub-forum listing page selected for this run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForumReference {
    pub url: Url,
}

impl ForumReference {
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}
