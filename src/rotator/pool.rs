//! Credential Pool Module
//!
//! Round-robin credential selection with per-credential failure cooldown.

use std::collections::HashMap;

use serde::Serialize;

use crate::clock::secs_to_ms;

// == Credential Stats ==
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CredentialStats {
    pub total: usize,
    pub available: usize,
    pub in_cooldown: usize,
    /// Selections per credential, keyed by a masked label
    pub usage: Vec<CredentialUsage>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CredentialUsage {
    pub label: String,
    pub selections: u64,
    pub cooling_down: bool,
}

// == Credential Pool ==
/// Unsynchronized pool state; [`CredentialManager`](crate::rotator::CredentialManager)
/// owns it behind a lock.
#[derive(Debug, Clone)]
pub struct CredentialPool {
    keys: Vec<String>,
    cursor: usize,
    failed_at: HashMap<String, u64>,
    usage: HashMap<String, u64>,
    cooldown_ms: u64,
}

impl CredentialPool {
    pub fn new(keys: Vec<String>, cooldown_seconds: u64) -> Self {
        Self {
            keys,
            cursor: 0,
            failed_at: HashMap::new(),
            usage: HashMap::new(),
            cooldown_ms: secs_to_ms(cooldown_seconds),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    // == Cooldown ==
    /// True while the credential's last failure is younger than the cooldown.
    pub fn is_cooling_down(&self, key: &str, now_ms: u64) -> bool {
        self.failed_at
            .get(key)
            .is_some_and(|&failed| now_ms.saturating_sub(failed) < self.cooldown_ms)
    }

    // == Next Key ==
    /// Scans at most `len()` slots from the cursor and returns the first
    /// credential not cooling down, advancing the cursor past it.
    pub fn next_key_at(&mut self, now_ms: u64) -> Option<String> {
        let size = self.keys.len();
        for offset in 0..size {
            let index = (self.cursor + offset) % size;
            let key = &self.keys[index];
            if self.is_cooling_down(key, now_ms) {
                continue;
            }

            let key = key.clone();
            // Lazily forget failures whose cooldown has passed.
            self.failed_at.remove(&key);
            *self.usage.entry(key.clone()).or_insert(0) += 1;
            self.cursor = (index + 1) % size;
            return Some(key);
        }
        None
    }

    // == Mark Failed ==
    /// Records a failure; unknown credentials are ignored.
    pub fn mark_failed_at(&mut self, key: &str, now_ms: u64) -> bool {
        if !self.keys.iter().any(|k| k == key) {
            return false;
        }
        self.failed_at.insert(key.to_string(), now_ms);
        true
    }

    /// Replaces the key set and clears cursor, failures and usage.
    pub fn replace_keys(&mut self, keys: Vec<String>) {
        self.keys = keys;
        self.cursor = 0;
        self.failed_at.clear();
        self.usage.clear();
    }

    pub fn stats_at(&self, now_ms: u64) -> CredentialStats {
        let usage: Vec<CredentialUsage> = self
            .keys
            .iter()
            .map(|key| CredentialUsage {
                label: mask_credential(key),
                selections: self.usage.get(key).copied().unwrap_or(0),
                cooling_down: self.is_cooling_down(key, now_ms),
            })
            .collect();
        let in_cooldown = usage.iter().filter(|u| u.cooling_down).count();

        CredentialStats {
            total: self.keys.len(),
            available: self.keys.len() - in_cooldown,
            in_cooldown,
            usage,
        }
    }
}

/// Shows only the last four characters of a credential.
pub fn mask_credential(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
