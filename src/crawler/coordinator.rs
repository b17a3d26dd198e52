//! Harvest coordinator - main orchestration logic
//!
//! This module drives one harvest:
//! - Fetching the homepage and choosing what to walk (setup, fails loud)
//! - Walking sub-forum listings and thread pages (fails soft per unit)
//! - Capping the number of items and exposing them as a lazy stream

use crate::config::{validate, Config, ListingFormat};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::forums::{list_forums, select_forums};
use crate::crawler::listing::{list_recent_threads, list_thread_permalinks};
use crate::crawler::thread::{parse_thread, ThreadContext};
use crate::model::{ForumReference, Item, ThreadReference};
use crate::timestamp::{AgeWindow, Clock, SourceZone, SystemClock};
use crate::{ScrapeError, SOURCE_DOMAIN};
use async_stream::stream;
use futures::Stream;
use rand::Rng;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Lazy, finite stream of harvested items
pub type ItemStream = Pin<Box<dyn Stream<Item = Item> + Send>>;

/// One unit of work decided during setup
#[derive(Debug, Clone)]
enum Batch {
    /// A sub-forum whose listing still has to be fetched
    Forum(ForumReference),
    /// Threads already read from the legacy homepage table
    Listed(Vec<ThreadReference>),
}

/// Main harvest coordinator
///
/// Cheap to clone; the item stream owns its own clone.
#[derive(Clone)]
pub struct Harvester {
    config: Arc<Config>,
    fetcher: Fetcher,
    clock: Arc<dyn Clock>,
    zone: SourceZone,
    base_url: Url,
}

impl Harvester {
    /// Creates a harvester on the host clock
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Configuration is valid and the HTTP client was built
    /// * `Err(ScrapeError)` - Invalid configuration or client construction failed
    pub fn new(config: Config) -> Result<Self, ScrapeError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a harvester reading "now" and "today" from `clock`
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self, ScrapeError> {
        validate(&config)?;

        let fetcher = Fetcher::new(&config.http)?;
        let zone: SourceZone = config.site.timezone.parse()?;
        let base_url = Url::parse(&config.site.base_url)?;

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            clock,
            zone,
            base_url,
        })
    }

    /// Runs setup and returns the item stream
    ///
    /// Setup fetches the homepage and picks the sub-forums (or, for the legacy
    /// layout, reads the latest-threads table). Failures there are returned.
    /// After setup nothing is fetched until the stream is polled, and every
    /// forum or thread that fails is logged and skipped.
    pub async fn run(&self) -> Result<ItemStream, ScrapeError> {
        tracing::info!(
            "[{}] Scraping posts published less than {} seconds ago",
            SOURCE_DOMAIN,
            self.config.scraper.max_oldness_seconds
        );

        let batches = self.plan().await?;
        let harvester = self.clone();
        let max_items = self.config.scraper.maximum_items_to_collect;

        Ok(Box::pin(stream! {
            let mut yielded = 0usize;

            if max_items > 0 {
                'batches: for (index, batch) in batches.into_iter().enumerate() {
                    let threads = match batch {
                        Batch::Forum(forum) => {
                            if index > 0 {
                                harvester.politeness_pause().await;
                            }
                            harvester.harvest_forum(&forum).await
                        }
                        Batch::Listed(threads) => threads,
                    };

                    for thread in &threads {
                        for item in harvester.harvest_thread(thread).await {
                            yielded += 1;
                            tracing::info!(
                                "[{}] Found new post: {}, posted at {}, URL = {}",
                                SOURCE_DOMAIN,
                                item.title,
                                item.created_at,
                                item.url
                            );
                            yield item;

                            if yielded >= max_items {
                                break 'batches;
                            }
                        }
                    }
                }
            }

            tracing::info!("[{}] Harvest finished with {} items", SOURCE_DOMAIN, yielded);
        }))
    }

    /// Fetches the homepage and decides what to walk
    async fn plan(&self) -> Result<Vec<Batch>, ScrapeError> {
        let homepage = self.fetcher.fetch(&self.base_url).await?;

        match self.config.site.listing {
            ListingFormat::Forums => {
                let discovered = list_forums(&homepage, &self.base_url);
                tracing::info!("Discovered {} sub-forums", discovered.len());

                let general = self.base_url.join(&self.config.site.general_forum)?;
                let selected = {
                    let mut rng = rand::thread_rng();
                    select_forums(
                        &general,
                        &discovered,
                        self.config.site.sampled_forums,
                        &mut rng,
                    )?
                };

                for forum in &selected {
                    tracing::debug!("Selected sub-forum {}", forum.url);
                }
                Ok(selected.into_iter().map(Batch::Forum).collect())
            }
            ListingFormat::Legacy => {
                let threads = list_recent_threads(&homepage, &self.base_url, &self.window());
                tracing::info!("Found {} recent threads on the homepage", threads.len());
                Ok(vec![Batch::Listed(threads)])
            }
        }
    }

    /// Reads the thread permalinks of one sub-forum; empty on fetch failure
    async fn harvest_forum(&self, forum: &ForumReference) -> Vec<ThreadReference> {
        let html = match self.fetcher.fetch(&forum.url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Skipping sub-forum {}: {}", forum.url, e);
                return Vec::new();
            }
        };

        let threads =
            list_thread_permalinks(&html, &forum.url, self.config.site.threads_per_forum);
        tracing::debug!("{} threads listed on {}", threads.len(), forum.url);
        threads
    }

    /// Reads the in-window posts of one thread; empty on fetch failure
    async fn harvest_thread(&self, thread: &ThreadReference) -> Vec<Item> {
        let html = match self.fetcher.fetch(&thread.url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Skipping thread {}: {}", thread.url, e);
                return Vec::new();
            }
        };

        let ctx = ThreadContext {
            page_url: &thread.url,
            base_url: &self.base_url,
            listing_title: thread.title.as_deref(),
            window: self.window(),
            min_post_length: self.config.scraper.min_post_length,
            include_title_in_content: self.config.scraper.include_title_in_content,
        };
        parse_thread(&html, &ctx)
    }

    fn window(&self) -> AgeWindow {
        AgeWindow::from_clock(
            self.clock.as_ref(),
            self.zone,
            self.config.scraper.max_oldness_seconds,
        )
    }

    /// Random pause between sub-forum fetches
    async fn politeness_pause(&self) {
        let (min, max) = (self.config.http.min_delay_ms, self.config.http.max_delay_ms);
        let delay = if min >= max {
            min
        } else {
            rand::thread_rng().gen_range(min..=max)
        };

        if delay > 0 {
            tracing::debug!("Pausing {}ms before next sub-forum", delay);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}

/// Runs one harvest with the given configuration
///
/// # Example
///
/// ```no_run
/// use forocoches_feed::{query, Config};
/// use futures::StreamExt;
///
/// # async fn example() -> Result<(), forocoches_feed::ScrapeError> {
/// let mut items = query(Config::default()).await?;
/// while let Some(item) = items.next().await {
///     println!("{} {}", item.created_at, item.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn query(config: Config) -> Result<ItemStream, ScrapeError> {
    Harvester::new(config)?.run().await
}
