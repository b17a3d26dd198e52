use serde::Deserialize;

/// Main configuration structure
///
/// Every section and field has a default, so an empty TOML document is a
/// valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

/// Harvest limits
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Oldest post age accepted, in seconds
    pub max_oldness_seconds: u64,

    /// Upper bound on items emitted by one run
    pub maximum_items_to_collect: usize,

    /// Posts whose stripped content has fewer characters are skipped
    pub min_post_length: usize,

    /// Prefix every item's content with `"<thread title>. "`
    pub include_title_in_content: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_oldness_seconds: DEFAULT_OLDNESS_SECONDS,
            maximum_items_to_collect: DEFAULT_MAXIMUM_ITEMS,
            min_post_length: DEFAULT_MIN_POST_LENGTH,
            include_title_in_content: false,
        }
    }
}

pub const DEFAULT_OLDNESS_SECONDS: u64 = 1000;
pub const DEFAULT_MAXIMUM_ITEMS: usize = 25;
pub const DEFAULT_MIN_POST_LENGTH: usize = 10;

/// Thread permalinks taken from one sub-forum page
pub const DEFAULT_THREADS_PER_FORUM: usize = 5;

/// HTTP client behaviour
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Pool of browser identifiers; one is picked at random per request
    pub user_agents: Vec<String>,

    /// Lower bound of the pause between sub-forum fetches (milliseconds)
    pub min_delay_ms: u64,

    /// Upper bound of the pause between sub-forum fetches (milliseconds)
    pub max_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 8,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            min_delay_ms: 1000,
            max_delay_ms: 3000,
        }
    }
}

pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (iPad; CPU OS 12_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.1 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.1 Safari/605.1.15",
];

/// Where and how the forum is read
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Homepage of the forum; also the base for post permalinks
    pub base_url: String,

    /// Sub-forum always harvested, relative to `base_url`
    pub general_forum: String,

    /// Additional sub-forums sampled at random from the homepage
    pub sampled_forums: usize,

    /// Thread permalinks taken from each sub-forum listing
    pub threads_per_forum: usize,

    /// Timezone the forum renders its times in (`Europe/Madrid`, `+01:00`, `UTC`)
    pub timezone: String,

    /// Which listing layout to walk
    pub listing: ListingFormat,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://forocoches.com/".to_string(),
            general_forum: "foro/forumdisplay.php?f=2".to_string(),
            sampled_forums: 3,
            threads_per_forum: DEFAULT_THREADS_PER_FORUM,
            timezone: "Europe/Madrid".to_string(),
            listing: ListingFormat::Forums,
        }
    }
}

/// Listing layouts the harvester understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingFormat {
    /// Homepage → sampled sub-forums → thread permalinks
    #[default]
    Forums,
    /// Homepage "latest threads" table with a posted-time column
    Legacy,
}
