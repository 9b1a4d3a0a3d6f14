//! Content-addressed write, audit, and clean
//!
//! `write` is deliberately I/O-free: it compares the new content hash
//! against the tracked entry and tells the caller whether bytes need
//! to touch disk. A dry run can therefore compute exact write counts
//! without mutating anything. `audit` and `clean` do the disk work.

use crate::emit::tracking::{TrackedFile, TrackingManifest};
use crate::error::{SpecforgeError, SpecforgeResult};
use crate::hash;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tracing::{debug, warn};

/// Result of a content-addressed write decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Whether the content differs from the tracked entry; the caller
    /// writes bytes to disk iff this is true
    pub written: bool,

    /// Full content hash of the (new) content
    pub hash: String,
}

/// Audit classification of one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// On disk, hash matches the manifest
    Current,
    /// On disk, hash differs (hand-edited after generation)
    Drifted,
    /// In the manifest, absent from disk
    Missing,
    /// On disk under the output dir, not in the manifest at all
    Orphaned,
}

impl FileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Drifted => "drifted",
            Self::Missing => "missing",
            Self::Orphaned => "orphaned",
        }
    }
}

/// One audited path with its classification
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub path: PathBuf,
    pub state: FileState,
}

/// In-memory file manifest with content-addressed write decisions
#[derive(Debug, Default)]
pub struct Emitter {
    manifest: Mutex<BTreeMap<PathBuf, TrackedFile>>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate the in-memory manifest from a previously persisted one
    pub fn from_manifest(manifest: &TrackingManifest) -> Self {
        let map = manifest
            .files
            .iter()
            .map(|f| (f.path.clone(), f.clone()))
            .collect();
        Self {
            manifest: Mutex::new(map),
        }
    }

    /// Decide whether `content` differs from the tracked entry for
    /// `path`, updating the entry when it does. Performs no I/O.
    pub fn write(
        &self,
        path: &Path,
        relative_path: &Path,
        content: &str,
        target: &str,
        concept: Option<&str>,
        sources: &[String],
    ) -> WriteOutcome {
        let content_hash = hash::content_hash(content);
        let mut manifest = self.manifest.lock().expect("emitter manifest poisoned");

        if let Some(existing) = manifest.get(path) {
            if existing.hash == content_hash {
                return WriteOutcome {
                    written: false,
                    hash: content_hash,
                };
            }
        }

        manifest.insert(
            path.to_path_buf(),
            TrackedFile {
                path: path.to_path_buf(),
                relative_path: relative_path.to_path_buf(),
                hash: content_hash.clone(),
                target: target.to_string(),
                concept: concept.map(str::to_string),
                sources: sources.to_vec(),
            },
        );

        WriteOutcome {
            written: true,
            hash: content_hash,
        }
    }

    /// Drop a tracked entry (after its file was deleted as an orphan)
    pub fn remove(&self, path: &Path) -> bool {
        let mut manifest = self.manifest.lock().expect("emitter manifest poisoned");
        manifest.remove(path).is_some()
    }

    /// All tracked entries
    pub fn tracked(&self) -> Vec<TrackedFile> {
        let manifest = self.manifest.lock().expect("emitter manifest poisoned");
        manifest.values().cloned().collect()
    }

    /// Tracked entries restricted to one output directory
    pub fn manifest_for(&self, output_dir: &Path) -> Vec<TrackedFile> {
        let manifest = self.manifest.lock().expect("emitter manifest poisoned");
        manifest
            .values()
            .filter(|f| f.path.starts_with(output_dir))
            .cloned()
            .collect()
    }

    /// Source locators one output file traces back to
    pub fn trace(&self, path: &Path) -> Option<Vec<String>> {
        let manifest = self.manifest.lock().expect("emitter manifest poisoned");
        manifest.get(path).map(|f| f.sources.clone())
    }

    /// Output files produced from one source locator
    pub fn affected(&self, source: &str) -> Vec<PathBuf> {
        let manifest = self.manifest.lock().expect("emitter manifest poisoned");
        manifest
            .values()
            .filter(|f| f.sources.iter().any(|s| s == source))
            .map(|f| f.path.clone())
            .collect()
    }

    /// Classify every tracked or discovered file under `output_dir`
    pub async fn audit(&self, output_dir: &Path) -> SpecforgeResult<Vec<AuditEntry>> {
        let tracked = self.manifest_for(output_dir);
        let tracked_paths: HashSet<PathBuf> = tracked.iter().map(|f| f.path.clone()).collect();
        let mut entries = Vec::new();

        for file in &tracked {
            let state = match fs::read(&file.path).await {
                Ok(bytes) => {
                    if hash::bytes_hash(&bytes) == file.hash {
                        FileState::Current
                    } else {
                        FileState::Drifted
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileState::Missing,
                Err(e) => {
                    return Err(SpecforgeError::io(
                        format!("auditing {}", file.path.display()),
                        e,
                    ))
                }
            };
            entries.push(AuditEntry {
                path: file.path.clone(),
                state,
            });
        }

        for path in walk_files(output_dir).await? {
            if !tracked_paths.contains(&path) {
                entries.push(AuditEntry {
                    path,
                    state: FileState::Orphaned,
                });
            }
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    /// Delete every on-disk file under `output_dir` not present in
    /// `keep`. Never touches paths outside `output_dir`. Returns the
    /// removed (or would-be removed, when `dry_run`) paths.
    pub async fn clean(
        &self,
        output_dir: &Path,
        keep: &HashSet<PathBuf>,
        dry_run: bool,
    ) -> SpecforgeResult<Vec<PathBuf>> {
        let mut removed = Vec::new();

        for path in walk_files(output_dir).await? {
            if keep.contains(&path) {
                continue;
            }

            if dry_run {
                debug!("Would remove {}", path.display());
            } else if let Err(e) = fs::remove_file(&path).await {
                // Per-file failure aborts only this file's removal
                warn!("Failed to remove {}: {}", path.display(), e);
                continue;
            }

            if !dry_run {
                self.remove(&path);
            }
            removed.push(path);
        }

        removed.sort();
        Ok(removed)
    }
}

/// Collect every regular file under `dir`, depth-first.
/// A missing directory yields an empty list.
async fn walk_files(dir: &Path) -> SpecforgeResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }

    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let mut entries = fs::read_dir(&current)
            .await
            .map_err(|e| SpecforgeError::io(format!("reading {}", current.display()), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SpecforgeError::io(format!("reading {}", current.display()), e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| SpecforgeError::io(format!("stat {}", path.display()), e))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                files.push(path);
            }
        }
    }
    Ok(files)
}
