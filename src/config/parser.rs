use crate::config::types::{Config, ScraperConfig};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use forocoches_feed::config::load_config;
///
/// let config = load_config(Path::new("forocoches.toml")).unwrap();
/// println!("Max age: {}s", config.scraper.max_oldness_seconds);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a harvest can be traced back to the exact
/// configuration it ran with.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

impl ScraperConfig {
    /// Reads the harvest limits from a JSON parameter map
    ///
    /// Anything other than an object (null, a list, a number) yields the
    /// defaults; missing keys fall back individually.
    ///
    /// ```
    /// use forocoches_feed::config::ScraperConfig;
    ///
    /// let params = serde_json::json!({ "max_oldness_seconds": 120 });
    /// let config = ScraperConfig::from_parameters(&params).unwrap();
    /// assert_eq!(config.max_oldness_seconds, 120);
    /// assert_eq!(config.maximum_items_to_collect, 25);
    /// ```
    pub fn from_parameters(parameters: &serde_json::Value) -> Result<Self, ConfigError> {
        if !parameters.is_object() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(parameters.clone())?)
    }
}

impl Config {
    /// Replaces the `[scraper]` section with limits read from a parameter map
    pub fn with_parameters(mut self, parameters: &serde_json::Value) -> Result<Self, ConfigError> {
        self.scraper = ScraperConfig::from_parameters(parameters)?;
        validate(&self)?;
        Ok(self)
    }
}
