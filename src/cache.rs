//! Build cache for incremental generation
//!
//! Maps a step key to the input/output hashes of its last run so that
//! an unchanged step can be skipped. Strictly a performance layer:
//! clearing the cache never changes program output, only timing — any
//! missing or inconsistent entry degrades to "do the work".

use crate::error::{SpecforgeError, SpecforgeResult};
use crate::resource::ResourceTracker;
use crate::step::StepKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Persisted cache file name, at the project root
pub const CACHE_FILE_NAME: &str = ".specforge-cache.json";

/// One cache entry per step key, last-write-wins, no history
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub step_key: StepKey,
    pub input_hash: String,
    pub output_hash: String,

    /// Provenance locator of the step's source, if any
    pub source_locator: Option<String>,

    /// Resource digest snapshot taken at record time; compared against
    /// the tracker's current digest by [`BuildCache::stale_steps`]
    pub source_digest: Option<String>,

    /// Nondeterministic steps are never cache hits
    pub deterministic: bool,

    pub recorded_at: DateTime<Utc>,
}

/// Outcome of a cache check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDecision {
    /// Input unchanged and deterministic: the step can be skipped
    Unchanged,

    /// Step must run; carries the previously recorded input hash if one exists
    Changed { previous_hash: Option<String> },
}

/// In-memory build cache, one lock over the whole map
#[derive(Debug, Default)]
pub struct BuildCache {
    entries: Mutex<BTreeMap<StepKey, CacheEntry>>,
}

impl BuildCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether a step's input has changed since its last run.
    ///
    /// `Unchanged` requires all three: an entry exists, its stored
    /// input hash equals `input_hash`, and `deterministic` is true.
    pub fn check(&self, step_key: &StepKey, input_hash: &str, deterministic: bool) -> CacheDecision {
        let entries = self.entries.lock().expect("cache store poisoned");

        let Some(entry) = entries.get(step_key) else {
            return CacheDecision::Changed {
                previous_hash: None,
            };
        };

        if !deterministic || !entry.deterministic {
            return CacheDecision::Changed {
                previous_hash: Some(entry.input_hash.clone()),
            };
        }

        if entry.input_hash != input_hash {
            return CacheDecision::Changed {
                previous_hash: Some(entry.input_hash.clone()),
            };
        }

        CacheDecision::Unchanged
    }

    /// Upsert the single entry for `step_key`
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &self,
        step_key: &StepKey,
        input_hash: &str,
        output_hash: &str,
        source_locator: Option<&str>,
        source_digest: Option<&str>,
        deterministic: bool,
    ) {
        let mut entries = self.entries.lock().expect("cache store poisoned");
        entries.insert(
            step_key.clone(),
            CacheEntry {
                step_key: step_key.clone(),
                input_hash: input_hash.to_string(),
                output_hash: output_hash.to_string(),
                source_locator: source_locator.map(str::to_string),
                source_digest: source_digest.map(str::to_string),
                deterministic,
                recorded_at: Utc::now(),
            },
        );
    }

    /// Remove one step's entry; returns whether it existed
    pub fn invalidate(&self, step_key: &StepKey) -> bool {
        let mut entries = self.entries.lock().expect("cache store poisoned");
        entries.remove(step_key).is_some()
    }

    /// Remove every entry recorded against `source_locator`
    pub fn invalidate_by_source(&self, source_locator: &str) -> Vec<StepKey> {
        let mut entries = self.entries.lock().expect("cache store poisoned");
        let keys: Vec<StepKey> = entries
            .iter()
            .filter(|(_, e)| e.source_locator.as_deref() == Some(source_locator))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &keys {
            entries.remove(key);
        }
        keys
    }

    /// Clear every entry, returning the count removed.
    ///
    /// Holds the store lock for the full sweep so no concurrent
    /// check/record observes a partially cleared map.
    pub fn invalidate_all(&self) -> usize {
        let mut entries = self.entries.lock().expect("cache store poisoned");
        let count = entries.len();
        entries.clear();
        debug!("Invalidated {} cache entries", count);
        count
    }

    /// Snapshot of all entries, for display
    pub fn status(&self) -> Vec<CacheEntry> {
        let entries = self.entries.lock().expect("cache store poisoned");
        entries.values().cloned().collect()
    }

    /// Cache file path for a project root
    pub fn path_for(project_root: &Path) -> PathBuf {
        project_root.join(CACHE_FILE_NAME)
    }

    /// Load a persisted cache.
    ///
    /// Cache durability is a host choice, not a correctness
    /// requirement: a missing, unreadable, or corrupt file yields an
    /// empty cache, which degrades every step to "changed".
    pub async fn load(project_root: &Path) -> Self {
        let cache = Self::new();
        let path = Self::path_for(project_root);
        if !path.exists() {
            return cache;
        }

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Ignoring unreadable cache file {}: {}", path.display(), e);
                return cache;
            }
        };
        let records: Vec<CacheEntryRecord> = match serde_json::from_str(&content) {
            Ok(r) => r,
            Err(e) => {
                warn!("Ignoring corrupt cache file {}: {}", path.display(), e);
                return cache;
            }
        };

        let mut entries = cache.entries.lock().expect("cache store poisoned");
        for record in records {
            let Some(step_key) = StepKey::parse(&record.step_key) else {
                warn!("Skipping cache entry with malformed key '{}'", record.step_key);
                continue;
            };
            entries.insert(
                step_key.clone(),
                CacheEntry {
                    step_key,
                    input_hash: record.input_hash,
                    output_hash: record.output_hash,
                    source_locator: record.source_locator,
                    source_digest: record.source_digest,
                    deterministic: record.deterministic,
                    recorded_at: record.recorded_at,
                },
            );
        }
        drop(entries);
        cache
    }

    /// Persist the cache for the next invocation
    pub async fn save(&self, project_root: &Path) -> SpecforgeResult<()> {
        let records: Vec<CacheEntryRecord> = self
            .status()
            .into_iter()
            .map(|e| CacheEntryRecord {
                step_key: e.step_key.to_string(),
                input_hash: e.input_hash,
                output_hash: e.output_hash,
                source_locator: e.source_locator,
                source_digest: e.source_digest,
                deterministic: e.deterministic,
                recorded_at: e.recorded_at,
            })
            .collect();

        let path = Self::path_for(project_root);
        let content = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| SpecforgeError::io(format!("writing cache {}", path.display()), e))?;
        Ok(())
    }

    /// Steps whose recorded source digest no longer matches the
    /// tracker's current digest.
    ///
    /// Preview signal for planning output only; real work is always
    /// re-validated with [`check`](Self::check) first.
    pub fn stale_steps(&self, tracker: &ResourceTracker) -> Vec<StepKey> {
        let entries = self.entries.lock().expect("cache store poisoned");
        entries
            .values()
            .filter(|e| {
                let (Some(locator), Some(recorded)) = (&e.source_locator, &e.source_digest) else {
                    return false;
                };
                match tracker.digest(locator) {
                    Some(current) => current != *recorded,
                    None => true, // source disappeared from tracking
                }
            })
            .map(|e| e.step_key.clone())
            .collect()
    }
}

/// On-disk representation of one cache entry
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntryRecord {
    step_key: String,
    input_hash: String,
    output_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_locator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_digest: Option<String>,
    deterministic: bool,
    recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(spec: &str) -> StepKey {
        StepKey::new("sdk", "rust", spec)
    }

    #[test]
    fn check_missing_entry_is_changed() {
        let cache = BuildCache::new();
        let decision = cache.check(&key("user"), "h1", true);
        assert_eq!(
            decision,
            CacheDecision::Changed {
                previous_hash: None
            }
        );
    }

    #[test]
    fn record_then_check_unchanged() {
        let cache = BuildCache::new();
        cache.record(&key("user"), "h1", "o1", Some("spec:user"), Some("d1"), true);
        assert_eq!(cache.check(&key("user"), "h1", true), CacheDecision::Unchanged);
    }

    #[test]
    fn check_hash_mismatch_is_changed() {
        let cache = BuildCache::new();
        cache.record(&key("user"), "h1", "o1", None, None, true);
        assert_eq!(
            cache.check(&key("user"), "h2", true),
            CacheDecision::Changed {
                previous_hash: Some("h1".to_string())
            }
        );
    }

    #[test]
    fn nondeterministic_never_hits() {
        let cache = BuildCache::new();
        cache.record(&key("user"), "h1", "o1", None, None, false);
        // Identical hash immediately after record: still changed
        assert!(matches!(
            cache.check(&key("user"), "h1", false),
            CacheDecision::Changed { .. }
        ));
        // Even a deterministic check against a nondeterministic entry re-runs
        assert!(matches!(
            cache.check(&key("user"), "h1", true),
            CacheDecision::Changed { .. }
        ));
    }

    #[test]
    fn cache_locality() {
        let cache = BuildCache::new();
        cache.record(&key("a"), "ha", "oa", None, None, true);
        cache.record(&key("b"), "hb", "ob", None, None, true);

        // Changing a's input does not disturb b
        assert!(matches!(
            cache.check(&key("a"), "ha-new", true),
            CacheDecision::Changed { .. }
        ));
        assert_eq!(cache.check(&key("b"), "hb", true), CacheDecision::Unchanged);
    }

    #[test]
    fn invalidate_single_and_all() {
        let cache = BuildCache::new();
        cache.record(&key("a"), "h", "o", None, None, true);
        cache.record(&key("b"), "h", "o", None, None, true);

        assert!(cache.invalidate(&key("a")));
        assert!(!cache.invalidate(&key("a")));
        assert_eq!(cache.invalidate_all(), 1);
        assert!(cache.status().is_empty());
    }

    #[test]
    fn invalidate_by_source() {
        let cache = BuildCache::new();
        cache.record(&key("a"), "h", "o", Some("spec:a"), Some("d"), true);
        cache.record(&key("b"), "h", "o", Some("spec:b"), Some("d"), true);

        let removed = cache.invalidate_by_source("spec:a");
        assert_eq!(removed, vec![key("a")]);
        assert!(matches!(
            cache.check(&key("a"), "h", true),
            CacheDecision::Changed { .. }
        ));
        assert_eq!(cache.check(&key("b"), "h", true), CacheDecision::Unchanged);
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cache = BuildCache::new();
        cache.record(&key("user"), "h1", "o1", Some("spec:user"), Some("d1"), true);
        cache.save(dir.path()).await.unwrap();

        let loaded = BuildCache::load(dir.path()).await;
        assert_eq!(loaded.check(&key("user"), "h1", true), CacheDecision::Unchanged);
        assert!(matches!(
            loaded.check(&key("user"), "h2", true),
            CacheDecision::Changed { .. }
        ));
    }

    #[tokio::test]
    async fn load_corrupt_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(BuildCache::path_for(dir.path()), "{corrupt").unwrap();
        let loaded = BuildCache::load(dir.path()).await;
        assert!(loaded.status().is_empty());
    }

    #[tokio::test]
    async fn load_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let loaded = BuildCache::load(dir.path()).await;
        assert!(loaded.status().is_empty());
    }

    #[test]
    fn stale_steps_tracks_digest_drift() {
        let cache = BuildCache::new();
        let tracker = ResourceTracker::new();

        tracker.upsert("spec:a", "spec", "d1");
        cache.record(&key("a"), "h", "o", Some("spec:a"), Some("d1"), true);
        assert!(cache.stale_steps(&tracker).is_empty());

        tracker.upsert("spec:a", "spec", "d2");
        assert_eq!(cache.stale_steps(&tracker), vec![key("a")]);

        // Stale preview does not affect check(): explicit hash still rules
        assert_eq!(cache.check(&key("a"), "h", true), CacheDecision::Unchanged);
    }
}
