//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and reading the harvest limits from a JSON parameter map.
//!
//! # Example
//!
//! ```no_run
//! use forocoches_feed::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("forocoches.toml")).unwrap();
//! println!("Collecting at most {} items", config.scraper.maximum_items_to_collect);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, HttpConfig, ListingFormat, ScraperConfig, SiteConfig, DEFAULT_MAXIMUM_ITEMS,
    DEFAULT_MIN_POST_LENGTH, DEFAULT_OLDNESS_SECONDS, DEFAULT_THREADS_PER_FORUM,
    DEFAULT_USER_AGENTS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
