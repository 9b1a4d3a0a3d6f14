//! CLI command implementations

pub mod audit;
pub mod clean;
pub mod config;
pub mod generate;
pub mod init;
pub mod kinds;
pub mod plan;

pub use audit::execute as audit;
pub use clean::execute as clean;
pub use config::execute as config;
pub use generate::execute as generate;
pub use init::execute as init;
pub use kinds::execute as kinds;
pub use plan::execute as plan;

use crate::cache::BuildCache;
use crate::config::Config;
use crate::error::SpecforgeResult;
use crate::generators::registry_from_config;
use crate::orchestrator::GenerationOrchestrator;
use crate::router::OutputRouter;
use crate::spec::{load_specs, SpecSet};
use std::path::Path;

/// Assemble the full pipeline for generate/plan: load specs, build
/// the generator registry from config, hydrate the build cache and
/// the emitter manifest.
pub(crate) async fn build_pipeline(
    config: &Config,
    project_root: &Path,
) -> SpecforgeResult<(GenerationOrchestrator, SpecSet)> {
    let specs_dir = if config.project.specs_dir.is_absolute() {
        config.project.specs_dir.clone()
    } else {
        project_root.join(&config.project.specs_dir)
    };
    let specs = load_specs(&specs_dir).await?;

    let (registry, _missing) = registry_from_config(config);
    let router = OutputRouter::from_config(config, project_root);
    let cache = BuildCache::load(project_root).await;

    let orchestrator = GenerationOrchestrator::prepare(project_root, router, registry, cache).await?;
    Ok((orchestrator, specs))
}
