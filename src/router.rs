//! Output routing
//!
//! Maps a generator's logical file path onto the project's configured
//! directory layout. Virtual paths are prefix-tagged:
//!
//! - `<target>/…`        — target generator output
//! - `sdk/<lang>/…`      — SDK binding output
//! - `specs/<format>/…`  — spec-format output
//!
//! If the matched prefix has a configured override directory, the
//! prefix segments are stripped and the remainder joins onto the
//! override; otherwise the whole virtual path joins onto the default
//! output directory. One SDK language can thus live in an independent
//! tree while everything else shares one.

use crate::config::Config;
use crate::error::{SpecforgeError, SpecforgeResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Generator family, determines the virtual-path prefix scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Target,
    Sdk,
    SpecFormat,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::Sdk => "sdk",
            Self::SpecFormat => "spec",
        }
    }
}

/// Resolved routing table, all paths absolute
#[derive(Debug, Clone)]
pub struct OutputRouter {
    default_dir: PathBuf,
    target_dirs: BTreeMap<String, PathBuf>,
    sdk_dirs: BTreeMap<String, PathBuf>,
    spec_format_dirs: BTreeMap<String, PathBuf>,
}

impl OutputRouter {
    /// Build a router from project config, absolutizing every
    /// directory against the project root.
    pub fn from_config(config: &Config, project_root: &Path) -> Self {
        let absolutize = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                project_root.join(p)
            }
        };
        Self {
            default_dir: absolutize(&config.project.output_dir),
            target_dirs: config
                .output
                .targets
                .iter()
                .map(|(k, v)| (k.clone(), absolutize(v)))
                .collect(),
            sdk_dirs: config
                .output
                .sdks
                .iter()
                .map(|(k, v)| (k.clone(), absolutize(v)))
                .collect(),
            spec_format_dirs: config
                .output
                .spec_formats
                .iter()
                .map(|(k, v)| (k.clone(), absolutize(v)))
                .collect(),
        }
    }

    /// Reject overlapping override directories: equal, or one nested
    /// inside the other. Either would make orphan reconciliation and
    /// clean claim each other's files.
    pub fn validate(&self) -> SpecforgeResult<()> {
        let overrides: Vec<(&String, &PathBuf)> = self
            .target_dirs
            .iter()
            .chain(self.sdk_dirs.iter())
            .chain(self.spec_format_dirs.iter())
            .collect();

        for (i, (name_a, dir_a)) in overrides.iter().enumerate() {
            for (name_b, dir_b) in &overrides[i + 1..] {
                if dir_a.starts_with(dir_b) || dir_b.starts_with(dir_a) {
                    let deeper = if dir_a.starts_with(dir_b) { dir_a } else { dir_b };
                    return Err(SpecforgeError::OutputOverlap {
                        a: (*name_a).clone(),
                        b: (*name_b).clone(),
                        dir: (*deeper).clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Resolve a virtual path to a concrete absolute path
    pub fn resolve(&self, virtual_path: &str) -> PathBuf {
        let normalized = virtual_path.replace('\\', "/");
        let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["sdk", lang, rest @ ..] if self.sdk_dirs.contains_key(*lang) => {
                join_segments(&self.sdk_dirs[*lang], rest)
            }
            ["specs", format, rest @ ..] if self.spec_format_dirs.contains_key(*format) => {
                join_segments(&self.spec_format_dirs[*format], rest)
            }
            [target, rest @ ..] if self.target_dirs.contains_key(*target) => {
                join_segments(&self.target_dirs[*target], rest)
            }
            _ => join_segments(&self.default_dir, &segments),
        }
    }

    /// Base directory a generator's output lands under, for the
    /// tracking manifest's `targetDirs` map
    pub fn base_dir(&self, family: Family, name: &str) -> PathBuf {
        let dirs = match family {
            Family::Target => &self.target_dirs,
            Family::Sdk => &self.sdk_dirs,
            Family::SpecFormat => &self.spec_format_dirs,
        };
        dirs.get(name).cloned().unwrap_or_else(|| self.default_dir.clone())
    }

    /// The project-wide default output directory
    pub fn default_dir(&self) -> &Path {
        &self.default_dir
    }

    /// Every distinct output directory the router can produce into
    pub fn all_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.default_dir.clone()];
        for dir in self
            .target_dirs
            .values()
            .chain(self.sdk_dirs.values())
            .chain(self.spec_format_dirs.values())
        {
            if !dirs.contains(dir) {
                dirs.push(dir.clone());
            }
        }
        dirs
    }
}

fn join_segments(base: &Path, segments: &[&str]) -> PathBuf {
    let mut path = base.to_path_buf();
    for segment in segments {
        path.push(segment);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> OutputRouter {
        let toml = r#"
            [project]
            output_dir = "generated"

            [output.targets]
            openapi = "api"

            [output.sdks]
            rust = "bindings/rust"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        OutputRouter::from_config(&config, Path::new("/project"))
    }

    #[test]
    fn target_override_strips_prefix() {
        let r = router();
        assert_eq!(
            r.resolve("openapi/v1/service.yaml"),
            PathBuf::from("/project/api/v1/service.yaml")
        );
    }

    #[test]
    fn sdk_override_strips_two_segments() {
        let r = router();
        assert_eq!(
            r.resolve("sdk/rust/src/user.rs"),
            PathBuf::from("/project/bindings/rust/src/user.rs")
        );
    }

    #[test]
    fn unmatched_prefix_joins_whole_path_on_default() {
        let r = router();
        assert_eq!(
            r.resolve("graphql/schema.graphql"),
            PathBuf::from("/project/generated/graphql/schema.graphql")
        );
        // sdk language without an override shares the default tree
        assert_eq!(
            r.resolve("sdk/typescript/index.ts"),
            PathBuf::from("/project/generated/sdk/typescript/index.ts")
        );
    }

    #[test]
    fn base_dir_respects_overrides() {
        let r = router();
        assert_eq!(r.base_dir(Family::Sdk, "rust"), PathBuf::from("/project/bindings/rust"));
        assert_eq!(
            r.base_dir(Family::Sdk, "typescript"),
            PathBuf::from("/project/generated")
        );
        assert_eq!(r.base_dir(Family::Target, "openapi"), PathBuf::from("/project/api"));
    }

    #[test]
    fn absolute_override_kept_as_is() {
        let toml = r#"
            [output.targets]
            openapi = "/elsewhere/api"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let r = OutputRouter::from_config(&config, Path::new("/project"));
        assert_eq!(
            r.resolve("openapi/spec.yaml"),
            PathBuf::from("/elsewhere/api/spec.yaml")
        );
    }

    #[test]
    fn validate_rejects_duplicate_override_dirs() {
        let toml = r#"
            [output.targets]
            openapi = "shared"

            [output.sdks]
            rust = "shared"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let r = OutputRouter::from_config(&config, Path::new("/project"));
        assert!(matches!(
            r.validate().unwrap_err(),
            SpecforgeError::OutputOverlap { .. }
        ));
        assert!(router().validate().is_ok());
    }

    #[test]
    fn validate_rejects_nested_override_dirs() {
        let toml = r#"
            [output.targets]
            openapi = "shared"

            [output.sdks]
            rust = "shared/rust"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let r = OutputRouter::from_config(&config, Path::new("/project"));
        match r.validate().unwrap_err() {
            SpecforgeError::OutputOverlap { dir, .. } => {
                assert_eq!(dir, PathBuf::from("/project/shared/rust"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // Sibling directories under a shared parent are fine
        assert!(router().validate().is_ok());
    }

    #[test]
    fn all_dirs_deduplicated() {
        let r = router();
        let dirs = r.all_dirs();
        assert_eq!(dirs.len(), 3);
        assert!(dirs.contains(&PathBuf::from("/project/generated")));
        assert!(dirs.contains(&PathBuf::from("/project/api")));
    }
}
