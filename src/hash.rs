//! Content hashing for the generation pipeline
//!
//! Every cache decision and manifest entry keys off a SHA-256 hex
//! digest of exact UTF-8 bytes. The full digest is always what gets
//! stored; truncation is for display only.

use sha2::{Digest, Sha256};

/// Number of hex characters shown in human-readable output
pub const SHORT_HASH_LEN: usize = 12;

/// SHA-256 hex digest of a string's UTF-8 bytes
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// SHA-256 hex digest of raw bytes
pub fn bytes_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Stable hash of a JSON value: keys are sorted before hashing so two
/// documents with the same content but different key order agree.
pub fn json_hash(value: &serde_json::Value) -> String {
    content_hash(&canonical_json(value))
}

/// Render a JSON value with object keys in sorted order
pub fn canonical_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .iter()
                .map(|k| {
                    format!(
                        "{}:{}",
                        serde_json::Value::String((*k).clone()),
                        canonical_json(&map[*k])
                    )
                })
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        serde_json::Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", rendered.join(","))
        }
        other => other.to_string(),
    }
}

/// Combine per-file hashes into one aggregate output hash.
///
/// Order-independent: the same file set always yields the same hash
/// regardless of generation order.
pub fn aggregate_hash(hashes: &[String]) -> String {
    let mut sorted: Vec<&String> = hashes.iter().collect();
    sorted.sort();
    let joined = sorted
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    content_hash(&joined)
}

/// First [`SHORT_HASH_LEN`] chars of a hash, for display
pub fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(SHORT_HASH_LEN)]
}
