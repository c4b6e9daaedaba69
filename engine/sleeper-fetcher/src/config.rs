use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PipelineError, Result};

/// Default roster cache lifetime in days
pub const CACHE_EXPIRY_DAYS: i64 = 7;

/// Default outbound request ceiling
pub const MAX_REQUESTS_PER_MINUTE: u32 = 500;

/// Configuration for the Sleeper fetcher
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Sleeper API endpoints
    pub api: ApiConfig,

    /// Roster cache settings
    pub cache: CacheConfig,

    /// Outbound request pacing
    pub rate_limit: RateLimitConfig,

    /// Where batch results are written
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Full roster endpoint
    pub roster_url: String,

    /// Base URL for the per-player stats and projections endpoints
    pub base_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Roster snapshot file
    pub roster_file: PathBuf,

    /// Snapshots this many days old (or older) are refetched
    pub expiry_days: i64,

    /// Ignore any existing snapshot
    pub force_refresh: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests_per_minute: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the merged CSV files
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            roster_url: "https://api.sleeper.app/v1/players/nfl".to_string(),
            base_url: "https://api.sleeper.com".to_string(),
            request_timeout_secs: 30,
            user_agent: concat!("sleeper-fetcher/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            roster_file: PathBuf::from("data/nfl_players_cache.csv"),
            expiry_days: CACHE_EXPIRY_DAYS,
            force_refresh: false,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { max_requests_per_minute: MAX_REQUESTS_PER_MINUTE }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("data") }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl RateLimitConfig {
    /// Minimum spacing between two consecutive requests
    pub fn interval(&self) -> Duration {
        Duration::from_nanos(60_000_000_000 / u64::from(self.max_requests_per_minute.max(1)))
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl FetcherConfig {
    /// Load configuration: defaults, then the optional TOML file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Start from the file if one was given
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| PipelineError::config(format!("invalid {}: {e}", path.display())))
    }

    /// Override with environment variables if present
    pub fn apply_env(&mut self) {
        // API endpoints
        if let Ok(url) = std::env::var("SLEEPER_ROSTER_URL") {
            self.api.roster_url = url;
        }

        if let Ok(url) = std::env::var("SLEEPER_API_BASE_URL") {
            self.api.base_url = url;
        }

        // Cache settings; unparsable numbers fall back to the defaults
        if let Ok(path) = std::env::var("SLEEPER_CACHE_FILE") {
            self.cache.roster_file = PathBuf::from(path);
        }

        if let Ok(days) = std::env::var("SLEEPER_CACHE_EXPIRY_DAYS") {
            self.cache.expiry_days = days.parse().unwrap_or(CACHE_EXPIRY_DAYS);
        }

        if let Ok(max) = std::env::var("SLEEPER_MAX_REQUESTS_PER_MINUTE") {
            self.rate_limit.max_requests_per_minute = max.parse().unwrap_or(MAX_REQUESTS_PER_MINUTE);
        }

        if let Ok(dir) = std::env::var("SLEEPER_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }

        // Logging
        if let Ok(level) = std::env::var("SLEEPER_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("SLEEPER_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit.max_requests_per_minute == 0 {
            return Err(PipelineError::config("max_requests_per_minute must be greater than 0"));
        }

        if self.cache.expiry_days <= 0 {
            return Err(PipelineError::config("cache expiry_days must be greater than 0"));
        }

        if self.api.roster_url.trim().is_empty() || self.api.base_url.trim().is_empty() {
            return Err(PipelineError::config("API URLs must not be empty"));
        }

        // Validate logging settings
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(PipelineError::config(format!("invalid log level: {other}"))),
        }

        match self.logging.format.as_str() {
            "json" | "pretty" => {}
            other => return Err(PipelineError::config(format!("invalid log format: {other}"))),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = FetcherConfig::default();
        assert_eq!(config.cache.expiry_days, 7);
        assert_eq!(config.rate_limit.max_requests_per_minute, 500);
        assert_eq!(config.rate_limit.interval(), Duration::from_millis(120));
        assert_eq!(config.api.roster_url, "https://api.sleeper.app/v1/players/nfl");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[cache]\nexpiry_days = 2\n\n[rate_limit]\nmax_requests_per_minute = 6000\n"
        )
        .unwrap();

        let config = FetcherConfig::from_file(file.path()).unwrap();
        assert_eq!(config.cache.expiry_days, 2);
        assert_eq!(config.rate_limit.interval(), Duration::from_millis(10));
        assert_eq!(config.api.base_url, "https://api.sleeper.com");
        assert_eq!(config.cache.roster_file, PathBuf::from("data/nfl_players_cache.csv"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache\nexpiry_days = ").unwrap();
        assert!(matches!(FetcherConfig::from_file(file.path()), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("SLEEPER_OUTPUT_DIR", "/tmp/sleeper-out");
        std::env::set_var("SLEEPER_CACHE_EXPIRY_DAYS", "not-a-number");

        let mut config = FetcherConfig::default();
        config.apply_env();

        std::env::remove_var("SLEEPER_OUTPUT_DIR");
        std::env::remove_var("SLEEPER_CACHE_EXPIRY_DAYS");

        assert_eq!(config.output.dir, PathBuf::from("/tmp/sleeper-out"));
        assert_eq!(config.cache.expiry_days, CACHE_EXPIRY_DAYS);
    }

    #[test]
    fn test_validation() {
        let mut config = FetcherConfig::default();
        config.rate_limit.max_requests_per_minute = 0;
        assert!(config.validate().is_err());

        let mut config = FetcherConfig::default();
        config.cache.expiry_days = 0;
        assert!(config.validate().is_err());

        let mut config = FetcherConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}
