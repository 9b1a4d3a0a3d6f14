//! Configuration schema for Specforge
//!
//! Project configuration lives in `.specforge.toml` at the project
//! root; a global fallback is read from `~/.config/specforge/config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project layout settings
    pub project: ProjectConfig,

    /// Enabled generators per family
    pub generators: GeneratorsConfig,

    /// Output directory overrides
    pub output: OutputConfig,
}

/// Project layout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory containing spec manifests, relative to project root
    pub specs_dir: PathBuf,

    /// Default output directory, relative to project root
    pub output_dir: PathBuf,

    /// Delete orphaned files during generation (default: true)
    pub clean_orphans: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            specs_dir: PathBuf::from("specs"),
            output_dir: PathBuf::from("generated"),
            clean_orphans: true,
        }
    }
}

/// Enabled generators, by family
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorsConfig {
    /// Target generators (e.g. "openapi", "graphql")
    pub targets: Vec<String>,

    /// SDK language generators (e.g. "rust", "typescript")
    pub sdks: Vec<String>,

    /// Spec-format generators (e.g. "jsonschema")
    pub spec_formats: Vec<String>,
}

impl GeneratorsConfig {
    /// Total number of configured generator names across all families
    pub fn count(&self) -> usize {
        self.targets.len() + self.sdks.len() + self.spec_formats.len()
    }
}

/// Per-family output directory overrides, relative to project root.
///
/// A name without an override shares the default output tree; an
/// override redirects that one target/SDK/format to its own location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Per-target override directories
    pub targets: BTreeMap<String, PathBuf>,

    /// Per-SDK-language override directories
    pub sdks: BTreeMap<String, PathBuf>,

    /// Per-spec-format override directories
    pub spec_formats: BTreeMap<String, PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[project]"));
        assert!(toml.contains("[generators]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.project.specs_dir, PathBuf::from("specs"));
        assert!(config.project.clean_orphans);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [project]
            output_dir = "out"

            [generators]
            sdks = ["rust"]

            [output.sdks]
            rust = "bindings/rust"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.project.output_dir, PathBuf::from("out"));
        assert_eq!(config.project.specs_dir, PathBuf::from("specs")); // default preserved
        assert_eq!(config.generators.sdks, vec!["rust"]);
        assert_eq!(
            config.output.sdks.get("rust"),
            Some(&PathBuf::from("bindings/rust"))
        );
    }

    #[test]
    fn generator_count() {
        let mut config = Config::default();
        assert_eq!(config.generators.count(), 0);
        config.generators.targets.push("openapi".into());
        config.generators.sdks.push("rust".into());
        assert_eq!(config.generators.count(), 2);
    }
}
