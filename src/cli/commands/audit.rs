//! Audit command - compare generated output against the manifest

use crate::config::Config;
use crate::emit::{Emitter, FileState, TrackingManifest};
use crate::error::SpecforgeResult;
use crate::router::OutputRouter;
use console::style;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Execute the audit command
pub async fn execute(config: &Config, project_root: &Path) -> SpecforgeResult<()> {
    let Some(manifest) = TrackingManifest::load(project_root).await? else {
        println!("No tracking manifest found. Run: specforge generate");
        return Ok(());
    };
    let emitter = Emitter::from_manifest(&manifest);
    let router = OutputRouter::from_config(config, project_root);

    let mut states: BTreeMap<PathBuf, FileState> = BTreeMap::new();
    for dir in router.all_dirs() {
        for entry in emitter.audit(&dir).await? {
            states.entry(entry.path).or_insert(entry.state);
        }
    }

    if states.is_empty() {
        println!("Nothing to audit.");
        return Ok(());
    }

    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for (path, state) in &states {
        *counts.entry(state.as_str()).or_default() += 1;
        let label = match state {
            FileState::Current => style("current ").green(),
            FileState::Drifted => style("drifted ").yellow(),
            FileState::Missing => style("missing ").red(),
            FileState::Orphaned => style("orphaned").magenta(),
        };
        println!("{} {}", label, path.display());
    }

    println!();
    let summary: Vec<String> = counts
        .iter()
        .map(|(state, count)| format!("{} {}", count, state))
        .collect();
    println!("{} file(s): {}", states.len(), summary.join(", "));
    Ok(())
}
