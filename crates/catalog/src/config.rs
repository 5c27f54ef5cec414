//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; the defaults point at the public Fake Store
//! API with the timeouts and retry budget the engine was written against.
//!
//! - `BAZAAR_API_BASE_URL` - Base URL of the catalog API
//!   (default: `https://fakestoreapi.com`)
//! - `BAZAAR_USER_ID` - User whose cart is tracked (default: 1)
//! - `BAZAAR_LIST_TIMEOUT_SECONDS` - Timeout for list reads (default: 10)
//! - `BAZAAR_ITEM_TIMEOUT_SECONDS` - Timeout for single-item reads and
//!   writes (default: 5)
//! - `BAZAAR_MAX_RETRIES` - Retry budget for transient read failures
//!   (default: 2)
//! - `BAZAAR_RETRY_BACKOFF_BASE_MS` - Base delay between retries; grows
//!   linearly per attempt (default: 250)
//! - `BAZAAR_PAGE_SIZE` - Default page size for the product list
//!   (default: 12)
//! - `BAZAAR_SEARCH_DEBOUNCE_MS` - Quiet window before a search query is
//!   applied (default: 300)

use std::time::Duration;

use thiserror::Error;
use url::Url;

use bazaar_core::UserId;

const DEFAULT_BASE_URL: &str = "https://fakestoreapi.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog engine configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog API
    pub base_url: Url,
    /// User whose cart is tracked client-side
    pub user_id: UserId,
    /// Timeout applied to list reads (`/products`, `/carts`)
    pub list_timeout: Duration,
    /// Timeout applied to single-item reads and writes
    pub item_timeout: Duration,
    /// Retry budget for transient read failures
    pub max_retries: u32,
    /// Base delay between retries; the n-th retry waits `n * base`
    pub retry_backoff_base: Duration,
    /// Default page size for the product list
    pub page_size: usize,
    /// Quiet window before a search query is applied
    pub search_debounce: Duration,
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but malformed (bad URL,
    /// non-numeric timeout, zero page size).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_env_or_default("BAZAAR_API_BASE_URL", DEFAULT_BASE_URL);
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("BAZAAR_API_BASE_URL".to_string(), e.to_string())
        })?;

        let user_id = UserId::new(parse_env("BAZAAR_USER_ID", 1)?);
        let list_timeout = Duration::from_secs(parse_env("BAZAAR_LIST_TIMEOUT_SECONDS", 10)?);
        let item_timeout = Duration::from_secs(parse_env("BAZAAR_ITEM_TIMEOUT_SECONDS", 5)?);
        let max_retries = parse_env("BAZAAR_MAX_RETRIES", 2)?;
        let retry_backoff_base =
            Duration::from_millis(parse_env("BAZAAR_RETRY_BACKOFF_BASE_MS", 250)?);
        let page_size = parse_env("BAZAAR_PAGE_SIZE", 12)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "BAZAAR_PAGE_SIZE".to_string(),
                "page size must be at least 1".to_string(),
            ));
        }
        let search_debounce = Duration::from_millis(parse_env("BAZAAR_SEARCH_DEBOUNCE_MS", 300)?);

        Ok(Self {
            base_url,
            user_id,
            list_timeout,
            item_timeout,
            max_retries,
            retry_backoff_base,
            page_size,
            search_debounce,
        })
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let base_url = Url::parse(DEFAULT_BASE_URL).expect("default base URL parses");
        Self {
            base_url,
            user_id: UserId::new(1),
            list_timeout: Duration::from_secs(10),
            item_timeout: Duration::from_secs(5),
            max_retries: 2,
            retry_backoff_base: Duration::from_millis(250),
            page_size: 12,
            search_debounce: Duration::from_millis(300),
        }
    }
}

/// Get an environment variable with a fallback default.
fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default when unset.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CatalogConfig::default();
        assert_eq!(config.base_url.as_str(), "https://fakestoreapi.com/");
        assert_eq!(config.page_size, 12);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.search_debounce, Duration::from_millis(300));
    }

    #[test]
    #[allow(unsafe_code)]
    fn test_invalid_base_url_rejected() {
        // SAFETY: tests run single-threaded within this module's scope and
        // the variable is removed before returning.
        unsafe { std::env::set_var("BAZAAR_API_BASE_URL", "not a url") };
        let result = CatalogConfig::from_env();
        unsafe { std::env::remove_var("BAZAAR_API_BASE_URL") };
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(name, _)) if name == "BAZAAR_API_BASE_URL"));
    }
}
