//! Durable tracking manifest
//!
//! The JSON manifest at the project root is the only state that
//! survives process restarts, and the ground truth for orphan
//! detection: every file a previous run emitted, with its content
//! hash and the per-target base directories in effect at the time.

use crate::error::{SpecforgeError, SpecforgeResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Tracking manifest file name, at the project root
pub const MANIFEST_FILE_NAME: &str = ".specforge-manifest.json";

/// One emitted file as recorded in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedFile {
    /// Absolute path on disk
    pub path: PathBuf,

    /// Path relative to the file's base output directory
    pub relative_path: PathBuf,

    /// Full-length content hash
    pub hash: String,

    /// Producing generator label (e.g. "sdk/rust")
    pub target: String,

    /// Logical concept the file belongs to, if the generator says
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,

    /// Source locators this file traces back to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

/// The durable on-disk manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingManifest {
    /// When this manifest was written
    pub generated_at: DateTime<Utc>,

    /// Every file tracked as generated
    pub files: Vec<TrackedFile>,

    /// Base output directory per generator label
    pub target_dirs: BTreeMap<String, PathBuf>,
}

impl TrackingManifest {
    pub fn new(files: Vec<TrackedFile>, target_dirs: BTreeMap<String, PathBuf>) -> Self {
        Self {
            generated_at: Utc::now(),
            files,
            target_dirs,
        }
    }

    /// Manifest path for a project root
    pub fn path_for(project_root: &Path) -> PathBuf {
        project_root.join(MANIFEST_FILE_NAME)
    }

    /// Load the manifest if one exists.
    ///
    /// A missing file is `Ok(None)`; an unreadable or malformed file
    /// is an error the caller may degrade to "no previous manifest".
    pub async fn load(project_root: &Path) -> SpecforgeResult<Option<Self>> {
        let path = Self::path_for(project_root);
        if !path.exists() {
            debug!("No tracking manifest at {}", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| SpecforgeError::ManifestRead {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let manifest: Self =
            serde_json::from_str(&content).map_err(|e| SpecforgeError::ManifestRead {
                path,
                reason: e.to_string(),
            })?;
        Ok(Some(manifest))
    }

    /// Persist the manifest at the project root
    pub async fn save(&self, project_root: &Path) -> SpecforgeResult<()> {
        let path = Self::path_for(project_root);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)
            .await
            .map_err(|e| SpecforgeError::io(format!("writing manifest {}", path.display()), e))?;
        debug!("Wrote tracking manifest with {} files", self.files.len());
        Ok(())
    }
}
