//! Harvesting logic for the forum
//!
//! This module contains the scraping pipeline, including:
//! - HTTP fetching with user-agent rotation
//! - Sub-forum discovery and sampling
//! - Listing and thread page parsing
//! - Overall harvest coordination

mod coordinator;
mod fetcher;
mod forums;
mod listing;
mod scan;
mod thread;

pub use coordinator::{query, Harvester, ItemStream};
pub use fetcher::{build_http_client, Fetcher};
pub use forums::{list_forums, select_forums};
pub use listing::{list_recent_threads, list_thread_permalinks};
pub use scan::{scan_until_stop, Scan};
pub use thread::{parse_thread, strip_quote, today_time, ThreadContext, ThreadPage, TODAY_MARKER};
