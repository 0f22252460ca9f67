//! Cache Key Module
//!
//! Deterministic, field-order-independent cache keys.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{GatekeeperError, Result};

/// Builds `namespace:<sha256>` from a JSON payload.
///
/// Object keys are sorted recursively before hashing, so two payloads that
/// differ only in field order map to the same key.
pub fn make_key(namespace: &str, payload: &Value) -> String {
    let mut canonical = String::new();
    write_canonical(payload, &mut canonical);
    hash_with_namespace(namespace, &canonical)
}

/// Serializes `payload` first, then derives the key like [`make_key`].
pub fn make_key_from<T: Serialize>(namespace: &str, payload: &T) -> Result<String> {
    let value = serde_json::to_value(payload)
        .map_err(|e| GatekeeperError::Internal(format!("cannot derive cache key: {e}")))?;
    Ok(make_key(namespace, &value))
}

/// Key for a plain text payload.
pub fn hash_text(namespace: &str, text: &str) -> String {
    hash_with_namespace(namespace, text)
}

fn hash_with_namespace(namespace: &str, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    format!("{}:{}", namespace, hex::encode(hasher.finalize()))
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
