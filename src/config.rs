//! Configuration Module
//!
//! Handles loading and validating governance configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::error::{GatekeeperError, Result};

/// Governance configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum command length in characters
    pub max_command_length: usize,
    /// Maximum serialized context size in bytes
    pub max_context_bytes: usize,
    /// Maximum number of entries in the response cache
    pub cache_max_entries: usize,
    /// Maximum number of entries in the prediction cache
    pub prediction_cache_max_entries: usize,
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Requests admitted per caller within the window
    pub rate_limit_max_requests: usize,
    /// Sliding window length in seconds
    pub rate_limit_window: u64,
    /// Minimum spacing between two requests of one caller, 0 disables
    pub rate_limit_min_interval: u64,
    /// Pool of provider credentials
    pub provider_keys: Vec<String>,
    /// Seconds a failed credential stays out of rotation
    pub credential_cooldown: u64,
    /// Commands shorter than this may take the social fast-path
    pub short_query_threshold: usize,
    /// Suggested retry delay after a provider quota error
    pub quota_retry_after: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_COMMAND_LENGTH` (default: 2000)
    /// - `MAX_CONTEXT_BYTES` (default: 10000)
    /// - `CACHE_MAX_ENTRIES` (default: 1000)
    /// - `PREDICTION_CACHE_MAX_ENTRIES` (default: 500)
    /// - `DEFAULT_TTL` (default: 300)
    /// - `CLEANUP_INTERVAL` (default: 60)
    /// - `RATE_LIMIT_MAX_REQUESTS` (default: 10)
    /// - `RATE_LIMIT_WINDOW` (default: 60)
    /// - `RATE_LIMIT_MIN_INTERVAL` (default: 0)
    /// - `PROVIDER_API_KEYS` comma separated, falls back to `PROVIDER_API_KEY`
    /// - `CREDENTIAL_COOLDOWN` (default: 60)
    /// - `SHORT_QUERY_THRESHOLD` (default: 50)
    /// - `QUOTA_RETRY_AFTER` (default: 60)
    /// - `SERVER_PORT` (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_command_length: env_or("MAX_COMMAND_LENGTH", defaults.max_command_length),
            max_context_bytes: env_or("MAX_CONTEXT_BYTES", defaults.max_context_bytes),
            cache_max_entries: env_or("CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            prediction_cache_max_entries: env_or(
                "PREDICTION_CACHE_MAX_ENTRIES",
                defaults.prediction_cache_max_entries,
            ),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            rate_limit_max_requests: env_or(
                "RATE_LIMIT_MAX_REQUESTS",
                defaults.rate_limit_max_requests,
            ),
            rate_limit_window: env_or("RATE_LIMIT_WINDOW", defaults.rate_limit_window),
            rate_limit_min_interval: env_or(
                "RATE_LIMIT_MIN_INTERVAL",
                defaults.rate_limit_min_interval,
            ),
            provider_keys: provider_keys_from_env(),
            credential_cooldown: env_or("CREDENTIAL_COOLDOWN", defaults.credential_cooldown),
            short_query_threshold: env_or(
                "SHORT_QUERY_THRESHOLD",
                defaults.short_query_threshold,
            ),
            quota_retry_after: env_or("QUOTA_RETRY_AFTER", defaults.quota_retry_after),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }

    /// Builder-style override of the credential pool.
    pub fn with_provider_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.provider_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    // == Validate ==
    /// Rejects configurations the layer cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.provider_keys.is_empty() {
            return Err(GatekeeperError::Config(
                "no provider credentials configured (set PROVIDER_API_KEYS)".to_string(),
            ));
        }
        if self.cache_max_entries == 0 || self.prediction_cache_max_entries == 0 {
            return Err(GatekeeperError::Config(
                "cache sizes must be greater than zero".to_string(),
            ));
        }
        if self.rate_limit_max_requests == 0 || self.rate_limit_window == 0 {
            return Err(GatekeeperError::Config(
                "rate limit requires at least one request per non-empty window".to_string(),
            ));
        }
        if self.max_command_length == 0 {
            return Err(GatekeeperError::Config(
                "max command length must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_command_length: 2000,
            max_context_bytes: 10_000,
            cache_max_entries: 1000,
            prediction_cache_max_entries: 500,
            default_ttl: 300,
            cleanup_interval: 60,
            rate_limit_max_requests: 10,
            rate_limit_window: 60,
            rate_limit_min_interval: 0,
            provider_keys: Vec::new(),
            credential_cooldown: 60,
            short_query_threshold: 50,
            quota_retry_after: 60,
            server_port: 3000,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Reads the credential pool, preferring the multi-key variable.
pub fn provider_keys_from_env() -> Vec<String> {
    let raw = env::var("PROVIDER_API_KEYS")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| env::var("PROVIDER_API_KEY").ok())
        .unwrap_or_default();
    parse_key_list(&raw)
}

fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}
