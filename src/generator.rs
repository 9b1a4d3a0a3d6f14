//! Generator seam
//!
//! Generators turn one spec manifest into a list of (virtual path,
//! content) pairs for one target, SDK language, or spec format. They
//! are pluggable: the registry is populated at startup from the
//! project config, and a configured name with no implementation is a
//! normal "skip this target" outcome, not an error.

use crate::error::SpecforgeResult;
use crate::router::Family;
use crate::spec::SpecDocument;
use async_trait::async_trait;
use std::sync::Arc;

/// One produced file, with a virtual (router-resolvable) path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Prefix-tagged logical path (e.g. "sdk/rust/user/mod.rs")
    pub path: String,

    /// Exact UTF-8 file content
    pub content: String,
}

/// A per-target generator function
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generator name within its family (e.g. "rust")
    fn name(&self) -> &str;

    /// Which family the generator belongs to
    fn family(&self) -> Family;

    /// Whether output is a pure function of the input. Nondeterministic
    /// generators are never cache hits.
    fn deterministic(&self) -> bool {
        true
    }

    /// Produce files for one spec
    async fn generate(&self, spec: &SpecDocument) -> SpecforgeResult<Vec<GeneratedFile>>;

    /// Label used in tracking manifests and virtual-path prefixes
    fn label(&self) -> String {
        match self.family() {
            Family::Target => self.name().to_string(),
            Family::Sdk => format!("sdk/{}", self.name()),
            Family::SpecFormat => format!("specs/{}", self.name()),
        }
    }
}

/// Name → generator registry populated at startup
#[derive(Default)]
pub struct GeneratorRegistry {
    generators: Vec<Arc<dyn Generator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator. Later registrations of the same
    /// (family, name) shadow earlier ones.
    pub fn register(&mut self, generator: Arc<dyn Generator>) {
        self.generators
            .retain(|g| !(g.family() == generator.family() && g.name() == generator.name()));
        self.generators.push(generator);
    }

    /// Look up one generator
    pub fn get(&self, family: Family, name: &str) -> Option<Arc<dyn Generator>> {
        self.generators
            .iter()
            .find(|g| g.family() == family && g.name() == name)
            .cloned()
    }

    /// All registered generators, optionally filtered by family
    /// and/or name
    pub fn select(
        &self,
        family: Option<Family>,
        name: Option<&str>,
    ) -> Vec<Arc<dyn Generator>> {
        self.generators
            .iter()
            .filter(|g| family.is_none_or(|f| g.family() == f))
            .filter(|g| name.is_none_or(|n| g.name() == n))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}
