//! Error types for Specforge
//!
//! All modules use `SpecforgeResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Specforge operations
pub type SpecforgeResult<T> = Result<T, SpecforgeError>;

/// All errors that can occur in Specforge
#[derive(Error, Debug)]
pub enum SpecforgeError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output directory for '{a}' overlaps with '{b}': {dir}")]
    OutputOverlap { a: String, b: String, dir: PathBuf },

    // Input errors
    #[error("No specifications found in {0}")]
    NoSpecsFound(PathBuf),

    #[error("No generators configured. Add targets, sdks, or spec_formats to .specforge.toml")]
    NoGeneratorsConfigured,

    #[error("Failed to parse specification {path}: {reason}")]
    SpecParse { path: PathBuf, reason: String },

    // Run ledger errors
    #[error("A generation run is already open: {0}")]
    RunAlreadyOpen(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    // Kind graph errors
    #[error("Unknown kind: {0}. Define it before connecting edges.")]
    UnknownKind(String),

    // Generator errors
    #[error("Generator '{name}' failed for spec '{spec}': {reason}")]
    GeneratorFailed {
        name: String,
        spec: String,
        reason: String,
    },

    // Run-level failure
    #[error("{failed} of {total} generation steps failed")]
    StepsFailed { failed: usize, total: usize },

    // Tracking manifest errors
    #[error("Failed to read tracking manifest {path}: {reason}")]
    ManifestRead { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid path: {path}: {reason}")]
    PathInvalid { path: PathBuf, reason: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl SpecforgeError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound(_) => Some("Run: specforge init"),
            Self::NoSpecsFound(_) => {
                Some("Add spec manifests (*.json) to the configured specs directory")
            }
            Self::NoGeneratorsConfigured => {
                Some("Edit .specforge.toml and list at least one target, sdk, or spec format")
            }
            Self::RunAlreadyOpen(_) => {
                Some("Complete the open run before beginning another")
            }
            _ => None,
        }
    }
}
