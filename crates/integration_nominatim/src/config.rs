//! Nominatim client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Name of the rate-limit bucket shared by every request to the service
pub const RATE_LIMIT_BUCKET: &str = "nominatim_api";

/// Upper bound for `cache_ttl_hours` and `stale_ttl_hours` (ten years)
pub const MAX_TTL_HOURS: u64 = 24 * 365 * 10;

const SECS_PER_HOUR: u64 = 3600;

/// Configuration for the Nominatim geocoding client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominatimConfig {
    /// Base URL for the Nominatim API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// `User-Agent` header sent with every request (required by the usage policy)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Cache TTL in hours (0 to disable caching)
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,

    /// How long a response stays available as a stale fallback, in hours
    #[serde(default = "default_stale_ttl_hours")]
    pub stale_ttl_hours: u64,

    /// Maximum number of cached responses
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: u64,

    /// Maximum requests per second (0 to disable rate limiting)
    #[serde(default = "default_rate_limit_per_second")]
    pub rate_limit_per_second: u32,

    /// Serve a previously cached response instead of waiting when rate limited
    #[serde(default = "default_serve_stale_if_limited")]
    pub serve_stale_if_limited: bool,
}

fn default_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    concat!("nominatim-client-rs/", env!("CARGO_PKG_VERSION")).to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_cache_ttl_hours() -> u64 {
    24
}

const fn default_stale_ttl_hours() -> u64 {
    24 * 7
}

const fn default_cache_max_entries() -> u64 {
    1000
}

const fn default_rate_limit_per_second() -> u32 {
    1
}

const fn default_serve_stale_if_limited() -> bool {
    true
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            cache_ttl_hours: default_cache_ttl_hours(),
            stale_ttl_hours: default_stale_ttl_hours(),
            cache_max_entries: default_cache_max_entries(),
            rate_limit_per_second: default_rate_limit_per_second(),
            serve_stale_if_limited: default_serve_stale_if_limited(),
        }
    }
}

impl NominatimConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            rate_limit_per_second: 0,
            ..Default::default()
        }
    }

    /// Check if caching is enabled
    #[must_use]
    pub const fn caching_enabled(&self) -> bool {
        self.cache_ttl_hours > 0
    }

    /// Check if rate limiting is enabled
    #[must_use]
    pub const fn rate_limiting_enabled(&self) -> bool {
        self.rate_limit_per_second > 0
    }

    /// Fresh cache TTL
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_hours.saturating_mul(SECS_PER_HOUR))
    }

    /// Stale store TTL
    #[must_use]
    pub const fn stale_ttl(&self) -> Duration {
        Duration::from_secs(self.stale_ttl_hours.saturating_mul(SECS_PER_HOUR))
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("base_url must be an http(s) URL".to_string());
        }

        if self.user_agent.trim().is_empty() {
            return Err("user_agent must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.cache_max_entries == 0 {
            return Err("cache_max_entries must be greater than 0".to_string());
        }

        if self.cache_ttl_hours > MAX_TTL_HOURS {
            return Err(format!("cache_ttl_hours must be at most {MAX_TTL_HOURS}"));
        }

        if self.stale_ttl_hours > MAX_TTL_HOURS {
            return Err(format!("stale_ttl_hours must be at most {MAX_TTL_HOURS}"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NominatimConfig::default();
        assert_eq!(config.base_url, "https://nominatim.openstreetmap.org");
        assert!(config.user_agent.starts_with("nominatim-client-rs/"));
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.cache_ttl_hours, 24);
        assert_eq!(config.stale_ttl_hours, 168);
        assert_eq!(config.cache_max_entries, 1000);
        assert_eq!(config.rate_limit_per_second, 1);
        assert!(config.serve_stale_if_limited);
    }

    #[test]
    fn test_testing_config() {
        let config = NominatimConfig::for_testing();
        assert_eq!(config.timeout_secs, 5);
        assert!(config.caching_enabled());
        assert!(!config.rate_limiting_enabled());
    }

    #[test]
    fn test_caching_enabled() {
        let mut config = NominatimConfig::default();
        assert!(config.caching_enabled());

        config.cache_ttl_hours = 0;
        assert!(!config.caching_enabled());
    }

    #[test]
    fn test_validation_success() {
        assert!(NominatimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_empty_base_url() {
        let config = NominatimConfig {
            base_url: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_non_http_base_url() {
        let config = NominatimConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_empty_user_agent() {
        let config = NominatimConfig {
            user_agent: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let config = NominatimConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_ttl_ceiling() {
        let at_limit = NominatimConfig {
            cache_ttl_hours: MAX_TTL_HOURS,
            stale_ttl_hours: MAX_TTL_HOURS,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());

        let huge_cache_ttl = NominatimConfig {
            cache_ttl_hours: u64::MAX / 1000,
            ..Default::default()
        };
        assert!(huge_cache_ttl.validate().unwrap_err().contains("cache_ttl_hours"));

        let huge_stale_ttl = NominatimConfig {
            stale_ttl_hours: 10_000_000,
            ..Default::default()
        };
        assert!(huge_stale_ttl.validate().unwrap_err().contains("stale_ttl_hours"));
    }

    #[test]
    fn test_ttl_durations_saturate() {
        let config = NominatimConfig {
            cache_ttl_hours: u64::MAX,
            stale_ttl_hours: 2,
            ..Default::default()
        };
        assert_eq!(config.cache_ttl(), Duration::from_secs(u64::MAX));
        assert_eq!(config.stale_ttl(), Duration::from_secs(7200));
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: NominatimConfig =
            serde_json::from_str(r#"{"base_url": "http://localhost:8080"}"#).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.cache_ttl_hours, 24);
        assert_eq!(config.rate_limit_per_second, 1);
    }
}
