//! HTTP fetcher implementation
//!
//! One GET per page, no retries. Every request carries a User-Agent drawn at
//! random from the configured pool; the client enforces the request timeout.

use crate::config::HttpConfig;
use crate::ScrapeError;
use rand::seq::SliceRandom;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with the configured timeout
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use forocoches_feed::config::HttpConfig;
/// use forocoches_feed::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Page fetcher holding the shared client and the immutable User-Agent pool
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    user_agents: Arc<[String]>,
}

impl Fetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, ScrapeError> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, config.user_agents.clone()))
    }

    pub fn with_client(client: Client, user_agents: Vec<String>) -> Self {
        Self {
            client,
            user_agents: user_agents.into(),
        }
    }

    /// Picks a User-Agent uniformly at random; `None` only for an empty pool
    pub fn pick_user_agent(&self) -> Option<&str> {
        let mut rng = rand::thread_rng();
        self.user_agents.choose(&mut rng).map(String::as_str)
    }

    /// Fetches a page and returns its decoded body
    ///
    /// # Errors
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Request timed out | `ScrapeError::Timeout` |
    /// | Non-2xx status | `ScrapeError::Status` |
    /// | Connection / body failure | `ScrapeError::Http` |
    pub async fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
        let mut request = self.client.get(url.clone());
        if let Some(user_agent) = self.pick_user_agent() {
            request = request.header(USER_AGENT, user_agent);
        }

        tracing::debug!("GET {}", url);

        let response = request.send().await.map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify(url, e))
    }
}

/// Maps a transport failure onto the crate error taxonomy
fn classify(url: &Url, error: reqwest::Error) -> ScrapeError {
    if error.is_timeout() {
        ScrapeError::Timeout {
            url: url.to_string(),
        }
    } else {
        ScrapeError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
