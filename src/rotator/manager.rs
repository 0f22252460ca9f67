//! Credential Manager Module
//!
//! Thread-safe owner of the provider credential pool. Constructed once from
//! configuration and passed by reference to whoever needs a credential.

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::clock::current_timestamp_ms;
use crate::config::{provider_keys_from_env, Config};
use crate::error::{GatekeeperError, Result};
use crate::rotator::{mask_credential, CredentialPool, CredentialStats};

// == Credential Manager ==
#[derive(Debug)]
pub struct CredentialManager {
    pool: Mutex<CredentialPool>,
}

impl CredentialManager {
    // == Constructor ==
    /// Fails fast on an empty pool.
    pub fn new(keys: Vec<String>, cooldown_seconds: u64) -> Result<Self> {
        let keys = check_keys(keys)?;
        info!(credentials = keys.len(), cooldown_seconds, "credential pool loaded");
        Ok(Self {
            pool: Mutex::new(CredentialPool::new(keys, cooldown_seconds)),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.provider_keys.clone(), config.credential_cooldown)
    }

    // == Next Key ==
    /// Next eligible credential in rotation, or `None` when every one is
    /// cooling down.
    pub fn next_key(&self) -> Option<String> {
        self.next_key_at(current_timestamp_ms())
    }

    pub fn next_key_at(&self, now_ms: u64) -> Option<String> {
        let mut pool = self.pool.lock();
        let key = pool.next_key_at(now_ms);
        if key.is_none() {
            warn!(credentials = pool.len(), "all provider credentials are cooling down");
        }
        key
    }

    // == Mark Failed ==
    pub fn mark_failed(&self, key: &str) {
        self.mark_failed_at(key, current_timestamp_ms());
    }

    pub fn mark_failed_at(&self, key: &str, now_ms: u64) {
        if self.pool.lock().mark_failed_at(key, now_ms) {
            warn!(credential = %mask_credential(key), "credential marked failed, cooling down");
        }
    }

    // == Reload ==
    /// Re-reads the credential pool from the environment.
    ///
    /// Resets the cursor and failure map. On an empty result the current
    /// pool is kept and an error returned.
    pub fn reload(&self) -> Result<usize> {
        self.replace_keys(provider_keys_from_env())
    }

    /// Installs a new key set, resetting rotation state.
    pub fn replace_keys(&self, keys: Vec<String>) -> Result<usize> {
        let keys = check_keys(keys)?;
        let count = keys.len();
        self.pool.lock().replace_keys(keys);
        info!(credentials = count, "credential pool reloaded");
        Ok(count)
    }

    pub fn stats(&self) -> CredentialStats {
        self.pool.lock().stats_at(current_timestamp_ms())
    }

    pub fn len(&self) -> usize {
        self.pool.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.lock().is_empty()
    }
}

fn check_keys(keys: Vec<String>) -> Result<Vec<String>> {
    let keys: Vec<String> = keys
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    if keys.is_empty() {
        return Err(GatekeeperError::Config(
            "credential pool must contain at least one key".to_string(),
        ));
    }
    Ok(keys)
}
