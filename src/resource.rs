//! Resource provenance tracking
//!
//! Records the last-known content digest of each named input. This is
//! display/preview metadata only: cache decisions always use an
//! explicitly supplied input hash, never this store.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Latest-value-only provenance record for one input
#[derive(Debug, Clone)]
pub struct Resource {
    /// Stable identifier (e.g. "spec:user")
    pub locator: String,

    /// What kind of input this is (e.g. "spec", "config")
    pub kind: String,

    /// Last observed content digest
    pub digest: String,

    /// When the digest was last updated
    pub updated_at: DateTime<Utc>,
}

/// In-memory provenance store, keyed by locator
#[derive(Debug, Default)]
pub struct ResourceTracker {
    resources: Mutex<BTreeMap<String, Resource>>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent overwrite of the latest digest for `locator`
    pub fn upsert(&self, locator: &str, kind: &str, digest: &str) {
        let mut resources = self.resources.lock().expect("resource store poisoned");
        resources.insert(
            locator.to_string(),
            Resource {
                locator: locator.to_string(),
                kind: kind.to_string(),
                digest: digest.to_string(),
                updated_at: Utc::now(),
            },
        );
    }

    /// Current digest for a locator, if tracked
    pub fn digest(&self, locator: &str) -> Option<String> {
        let resources = self.resources.lock().expect("resource store poisoned");
        resources.get(locator).map(|r| r.digest.clone())
    }

    /// Snapshot of all tracked resources, for reporting
    pub fn all(&self) -> Vec<Resource> {
        let resources = self.resources.lock().expect("resource store poisoned");
        resources.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_and_lookup() {
        let tracker = ResourceTracker::new();
        tracker.upsert("spec:user", "spec", "abc");
        assert_eq!(tracker.digest("spec:user"), Some("abc".to_string()));
        assert_eq!(tracker.digest("spec:other"), None);
    }

    #[test]
    fn upsert_overwrites() {
        let tracker = ResourceTracker::new();
        tracker.upsert("spec:user", "spec", "v1");
        tracker.upsert("spec:user", "spec", "v2");
        assert_eq!(tracker.digest("spec:user"), Some("v2".to_string()));
        assert_eq!(tracker.all().len(), 1);
    }

    #[test]
    fn all_is_sorted_by_locator() {
        let tracker = ResourceTracker::new();
        tracker.upsert("spec:b", "spec", "1");
        tracker.upsert("spec:a", "spec", "2");
        let locators: Vec<String> = tracker.all().into_iter().map(|r| r.locator).collect();
        assert_eq!(locators, vec!["spec:a", "spec:b"]);
    }
}
