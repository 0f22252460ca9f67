//! Credential Rotator Module
//!
//! Round-robin selection over provider credentials with failure cooldown.

mod manager;
mod pool;

pub use manager::CredentialManager;
pub use pool::{mask_credential, CredentialPool, CredentialStats, CredentialUsage};
