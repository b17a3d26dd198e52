use crate::config::types::{Config, HttpConfig, ScraperConfig, SiteConfig};
use crate::timestamp::SourceZone;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_http_config(&config.http)?;
    validate_site_config(&config.site)?;
    Ok(())
}

/// Validates harvest limits
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.max_oldness_seconds < 1 {
        return Err(ConfigError::Validation(
            "max_oldness_seconds must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 || config.timeout_secs > 60 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 60, got {}",
            config.timeout_secs
        )));
    }

    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents cannot be empty".to_string(),
        ));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user_agents cannot contain blank entries".to_string(),
        ));
    }

    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min_delay_ms ({}) must not exceed max_delay_ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}

/// Validates site layout settings
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            base.scheme()
        )));
    }

    if config.general_forum.trim().is_empty() {
        return Err(ConfigError::Validation(
            "general_forum cannot be empty".to_string(),
        ));
    }

    base.join(&config.general_forum)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid general_forum: {}", e)))?;

    if config.threads_per_forum < 1 {
        return Err(ConfigError::Validation(format!(
            "threads_per_forum must be >= 1, got {}",
            config.threads_per_forum
        )));
    }

    config.timezone.parse::<SourceZone>()?;

    Ok(())
}
