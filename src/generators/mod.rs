//! Built-in generators
//!
//! Small reference generators so the pipeline is usable end-to-end:
//! SDK type bindings for Rust and TypeScript, an OpenAPI target, and
//! a JSON Schema spec format. Real projects are expected to grow
//! richer generators behind the same [`Generator`] trait.

pub mod schema;
pub mod sdk;

use crate::config::Config;
use crate::generator::{Generator, GeneratorRegistry};
use crate::router::Family;
use std::sync::Arc;
use tracing::warn;

/// Probe the built-in catalog for every generator name the config
/// enables. Unknown names are returned (and skipped), not errors.
pub fn registry_from_config(config: &Config) -> (GeneratorRegistry, Vec<String>) {
    let mut registry = GeneratorRegistry::new();
    let mut missing = Vec::new();

    let mut probe = |family: Family, name: &str| match builtin(family, name) {
        Some(generator) => registry.register(generator),
        None => {
            warn!("No {} generator named '{}' is available; skipping", family.as_str(), name);
            missing.push(format!("{}:{}", family.as_str(), name));
        }
    };

    for name in &config.generators.targets {
        probe(Family::Target, name);
    }
    for name in &config.generators.sdks {
        probe(Family::Sdk, name);
    }
    for name in &config.generators.spec_formats {
        probe(Family::SpecFormat, name);
    }

    (registry, missing)
}

fn builtin(family: Family, name: &str) -> Option<Arc<dyn Generator>> {
    match (family, name) {
        (Family::Target, "openapi") => Some(Arc::new(schema::OpenApiGenerator)),
        (Family::Sdk, "rust") => Some(Arc::new(sdk::RustSdkGenerator)),
        (Family::Sdk, "typescript") => Some(Arc::new(sdk::TypeScriptSdkGenerator)),
        (Family::SpecFormat, "jsonschema") => Some(Arc::new(schema::JsonSchemaGenerator)),
        _ => None,
    }
}
