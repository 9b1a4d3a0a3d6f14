//! Specification manifest loading
//!
//! Specs arrive as JSON manifest documents produced by an external
//! parser/normalizer; this module only loads them, names them by file
//! stem, and computes a stable content digest for cache keying. A
//! malformed spec is excluded from the run with a warning rather than
//! aborting generation.

use crate::error::{SpecforgeError, SpecforgeResult};
use crate::hash;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// One loaded specification manifest
#[derive(Debug, Clone)]
pub struct SpecDocument {
    /// Spec name, taken from the file stem
    pub name: String,

    /// Source file path
    pub path: PathBuf,

    /// Parsed manifest content
    pub manifest: serde_json::Value,

    /// Canonical content digest (key-order independent)
    pub digest: String,
}

impl SpecDocument {
    /// Parse a spec manifest from a JSON string
    pub fn parse(name: &str, path: &Path, content: &str) -> SpecforgeResult<Self> {
        let manifest: serde_json::Value =
            serde_json::from_str(content).map_err(|e| SpecforgeError::SpecParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if !manifest.is_object() {
            return Err(SpecforgeError::SpecParse {
                path: path.to_path_buf(),
                reason: "spec manifest must be a JSON object".to_string(),
            });
        }

        let digest = hash::json_hash(&manifest);
        Ok(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            manifest,
            digest,
        })
    }

    /// Provenance locator for this spec, used by the resource tracker
    pub fn locator(&self) -> String {
        format!("spec:{}", self.name)
    }
}

/// Result of scanning a specs directory
#[derive(Debug, Default)]
pub struct SpecSet {
    /// Successfully parsed specs, sorted by name
    pub specs: Vec<SpecDocument>,

    /// Paths that failed to parse, with reasons (run continues)
    pub skipped: Vec<(PathBuf, String)>,
}

/// Load every `*.json` spec manifest under `specs_dir`.
///
/// Missing directory and empty directory both yield an empty set; the
/// caller decides whether that is fatal.
pub async fn load_specs(specs_dir: &Path) -> SpecforgeResult<SpecSet> {
    let mut set = SpecSet::default();

    if !specs_dir.is_dir() {
        debug!("Specs directory {} does not exist", specs_dir.display());
        return Ok(set);
    }

    let mut entries = fs::read_dir(specs_dir)
        .await
        .map_err(|e| SpecforgeError::io(format!("reading specs dir {}", specs_dir.display()), e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SpecforgeError::io("reading specs dir entry", e))?
    {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let content = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Skipping unreadable spec {}: {}", path.display(), e);
                set.skipped.push((path, e.to_string()));
                continue;
            }
        };

        match SpecDocument::parse(name, &path, &content) {
            Ok(spec) => {
                debug!("Loaded spec '{}' ({})", spec.name, hash::short_hash(&spec.digest));
                set.specs.push(spec);
            }
            Err(e) => {
                warn!("Skipping malformed spec {}: {}", path.display(), e);
                set.skipped.push((path, e.to_string()));
            }
        }
    }

    set.specs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_valid_spec() {
        let spec = SpecDocument::parse(
            "user",
            Path::new("/specs/user.json"),
            r#"{"entity": "User", "fields": {"id": "uuid"}}"#,
        )
        .unwrap();
        assert_eq!(spec.name, "user");
        assert_eq!(spec.digest.len(), 64);
        assert_eq!(spec.locator(), "spec:user");
    }

    #[test]
    fn digest_ignores_key_order() {
        let a = SpecDocument::parse("s", Path::new("a.json"), r#"{"a": 1, "b": 2}"#).unwrap();
        let b = SpecDocument::parse("s", Path::new("b.json"), r#"{"b": 2, "a": 1}"#).unwrap();
        assert_eq!(a.digest, b.digest);
    }

    #[test]
    fn parse_rejects_non_object() {
        let err = SpecDocument::parse("s", Path::new("s.json"), "[1, 2]").unwrap_err();
        assert!(matches!(err, SpecforgeError::SpecParse { .. }));
    }

    #[tokio::test]
    async fn load_specs_sorted_and_skips_malformed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("beta.json"), r#"{"x": 1}"#).unwrap();
        std::fs::write(dir.path().join("alpha.json"), r#"{"y": 2}"#).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{nope").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let set = load_specs(dir.path()).await.unwrap();
        let names: Vec<&str> = set.specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(set.skipped.len(), 1);
    }

    #[tokio::test]
    async fn load_specs_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let set = load_specs(&dir.path().join("nope")).await.unwrap();
        assert!(set.specs.is_empty());
        assert!(set.skipped.is_empty());
    }
}
