//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `ROCKETSHOES_API_URL` - Catalog API base URL (default: `http://localhost:3333`)
//! - `ROCKETSHOES_API_TOKEN` - Bearer token sent to the catalog API
//! - `ROCKETSHOES_STORAGE_PATH` - Cart storage file (default: `.rocketshoes/storage.json`)
//! - `ROCKETSHOES_HTTP_TIMEOUT_SECS` - Request timeout (default: none)
//! - `ROCKETSHOES_PRODUCT_CACHE_TTL_SECS` - Product cache TTL (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_STORAGE_PATH: &str = ".rocketshoes/storage.json";
const DEFAULT_PRODUCT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// File backing the cart key-value store
    pub storage_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Catalog (products and stock) API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL, always ending in `/` so endpoint paths join beneath it
    pub base_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// How long product metadata stays cached
    pub product_cache_ttl: Duration,
}

impl CatalogConfig {
    /// Configuration pointing at `base_url` with every other option at its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL does not parse or is not http(s).
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("ROCKETSHOES_API_URL", base_url)?,
            api_token: None,
            timeout: None,
            product_cache_ttl: Duration::from_secs(DEFAULT_PRODUCT_CACHE_TTL_SECS),
        })
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("ROCKETSHOES_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = parse_base_url("ROCKETSHOES_API_URL", &api_url)?;

        let api_token = lookup("ROCKETSHOES_API_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from);

        let timeout = lookup("ROCKETSHOES_HTTP_TIMEOUT_SECS")
            .map(|value| parse_secs("ROCKETSHOES_HTTP_TIMEOUT_SECS", &value))
            .transpose()?;

        let product_cache_ttl = lookup("ROCKETSHOES_PRODUCT_CACHE_TTL_SECS").map_or(
            Ok(Duration::from_secs(DEFAULT_PRODUCT_CACHE_TTL_SECS)),
            |value| parse_secs("ROCKETSHOES_PRODUCT_CACHE_TTL_SECS", &value),
        )?;

        let storage_path = lookup("ROCKETSHOES_STORAGE_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from);

        Ok(Self {
            catalog: CatalogConfig {
                base_url,
                api_token,
                timeout,
                product_cache_ttl,
            },
            storage_path,
            sentry_dsn: lookup("SENTRY_DSN"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an http(s) base URL, normalizing the path to end with `/`.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Parse a whole number of seconds.
fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CartConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.catalog.base_url.as_str(), "http://localhost:3333/");
        assert!(config.catalog.api_token.is_none());
        assert!(config.catalog.timeout.is_none());
        assert_eq!(config.catalog.product_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.storage_path, PathBuf::from(".rocketshoes/storage.json"));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = CartConfig::from_lookup(lookup_from(&[
            ("ROCKETSHOES_API_URL", "https://api.rocketshoes.dev/v1"),
            ("ROCKETSHOES_API_TOKEN", "tok_123"),
            ("ROCKETSHOES_HTTP_TIMEOUT_SECS", "5"),
            ("ROCKETSHOES_PRODUCT_CACHE_TTL_SECS", "0"),
            ("ROCKETSHOES_STORAGE_PATH", "/tmp/cart.json"),
        ]))
        .unwrap();

        assert_eq!(config.catalog.base_url.as_str(), "https://api.rocketshoes.dev/v1/");
        assert_eq!(
            config.catalog.api_token.unwrap().expose_secret(),
            "tok_123"
        );
        assert_eq!(config.catalog.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.catalog.product_cache_ttl, Duration::ZERO);
        assert_eq!(config.storage_path, PathBuf::from("/tmp/cart.json"));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let config =
            CartConfig::from_lookup(lookup_from(&[("ROCKETSHOES_API_TOKEN", "  ")])).unwrap();
        assert!(config.catalog.api_token.is_none());
    }

    #[test]
    fn test_invalid_url() {
        let err = CartConfig::from_lookup(lookup_from(&[("ROCKETSHOES_API_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "ROCKETSHOES_API_URL"));

        let err = CartConfig::from_lookup(lookup_from(&[("ROCKETSHOES_API_URL", "ftp://host")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = CartConfig::from_lookup(lookup_from(&[(
            "ROCKETSHOES_HTTP_TIMEOUT_SECS",
            "soon",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config =
            CartConfig::from_lookup(lookup_from(&[("ROCKETSHOES_API_TOKEN", "tok_secret")]))
                .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("tok_secret"));
    }
}
