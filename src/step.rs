//! Step identity
//!
//! One step is one (generator, specification) unit of work. The key
//! `family:generator:spec` is unique within a run and is the map key
//! for both the build cache and the run ledger.

use std::fmt;

/// Composite step identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepKey {
    /// Generator family ("target", "sdk", "spec")
    pub family: String,

    /// Generator name within the family
    pub generator: String,

    /// Specification name
    pub spec: String,
}

impl StepKey {
    pub fn new(
        family: impl Into<String>,
        generator: impl Into<String>,
        spec: impl Into<String>,
    ) -> Self {
        Self {
            family: family.into(),
            generator: generator.into(),
            spec: spec.into(),
        }
    }
}

impl StepKey {
    /// Parse a `family:generator:spec` string
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.splitn(3, ':');
        let family = parts.next()?;
        let generator = parts.next()?;
        let spec = parts.next()?;
        if family.is_empty() || generator.is_empty() || spec.is_empty() {
            return None;
        }
        Some(Self::new(family, generator, spec))
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.family, self.generator, self.spec)
    }
}
