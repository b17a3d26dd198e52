//! forocoches-feed: recent-post harvester for forocoches.com
//!
//! The forum has no API, so this crate fetches its HTML pages, walks the
//! sub-forum listings and thread pages, and turns every post published within
//! a configurable age window into a normalized [`Item`].

pub mod config;
pub mod crawler;
pub mod model;
pub mod timestamp;
pub mod url;

use thiserror::Error;

/// Main error type for harvesting operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTML parse error for {url}: {message}")]
    HtmlParse { url: String, message: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Not enough sub-forums to sample from: found {found}, need {required}")]
    InsufficientForums { found: usize, required: usize },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid parameters: {0}")]
    Parameters(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// Result type alias for harvesting operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// The constant `domain` attached to every item
pub const SOURCE_DOMAIN: &str = "forocoches.com";

// Re-export commonly used types
pub use config::Config;
pub use crawler::{query, Harvester, ItemStream};
pub use model::{ForumReference, Item, ThreadReference};
pub use timestamp::{Clock, FixedClock, SourceZone, SystemClock};
