//! Clean command - delete untracked files from the output directories

use crate::cli::args::CleanArgs;
use crate::config::Config;
use crate::emit::{Emitter, TrackingManifest};
use crate::error::{SpecforgeError, SpecforgeResult};
use crate::router::OutputRouter;
use console::style;
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Execute the clean command
pub async fn execute(args: CleanArgs, config: &Config, project_root: &Path) -> SpecforgeResult<()> {
    let manifest = TrackingManifest::load(project_root).await?;
    let keep: HashSet<PathBuf> = manifest
        .as_ref()
        .map(|m| m.files.iter().map(|f| f.path.clone()).collect())
        .unwrap_or_default();
    let emitter = match &manifest {
        Some(m) => Emitter::from_manifest(m),
        None => Emitter::new(),
    };
    let router = OutputRouter::from_config(config, project_root);

    if !args.dry_run && !args.yes {
        let dirs: Vec<String> = router
            .all_dirs()
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        println!(
            "This deletes every untracked file under: {}",
            dirs.join(", ")
        );
        print!("Continue? [y/N] ");
        io::stdout()
            .flush()
            .map_err(|e| SpecforgeError::io("flushing stdout", e))?;

        let mut answer = String::new();
        io::stdin()
            .read_line(&mut answer)
            .map_err(|e| SpecforgeError::io("reading confirmation", e))?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let mut removed = Vec::new();
    for dir in router.all_dirs() {
        removed.extend(emitter.clean(&dir, &keep, args.dry_run).await?);
    }

    if removed.is_empty() {
        println!("Nothing to clean.");
        return Ok(());
    }

    let verb = if args.dry_run { "Would remove" } else { "Removed" };
    println!("{} {} file(s):", verb, style(removed.len()).bold());
    for path in &removed {
        println!("  {}", style(path.display()).dim());
    }
    Ok(())
}
