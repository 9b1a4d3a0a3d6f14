//! Generate command - run the generation pipeline

use crate::cli::args::GenerateArgs;
use crate::cli::commands::build_pipeline;
use crate::config::Config;
use crate::error::{SpecforgeError, SpecforgeResult};
use crate::orchestrator::RunOptions;
use console::style;
use std::path::Path;
use tracing::debug;

/// Execute the generate command
pub async fn execute(args: GenerateArgs, config: &Config, project_root: &Path) -> SpecforgeResult<()> {
    let (orchestrator, specs) = build_pipeline(config, project_root).await?;
    debug!(
        "Generating from {} specs in {}",
        specs.specs.len(),
        project_root.display()
    );

    let options = RunOptions {
        force: args.force,
        dry_run: args.dry_run,
        family: args.family.map(Into::into),
        only: args.only,
        clean_orphans: config.project.clean_orphans && !args.no_clean,
    };
    let report = orchestrator.run(&specs, &options).await?;

    if !report.dry_run {
        orchestrator.cache().save(project_root).await?;
    }

    for warning in &report.warnings {
        eprintln!("{} {}", style("Warning:").yellow(), warning);
    }

    let prefix = if report.dry_run { "Would write" } else { "Wrote" };
    println!(
        "{} {} file(s), {} unchanged ({} steps: {} executed, {} cached, {} failed)",
        prefix,
        style(report.files_written).bold(),
        report.files_skipped,
        report.summary.total,
        style(report.summary.executed).green(),
        style(report.summary.cached).cyan(),
        if report.summary.failed > 0 {
            style(report.summary.failed).red()
        } else {
            style(report.summary.failed).dim()
        },
    );

    if !report.removed.is_empty() {
        let verb = if report.dry_run { "Would remove" } else { "Removed" };
        println!("{} {} orphaned file(s):", verb, report.removed.len());
        for path in &report.removed {
            println!("  {}", style(path.display()).dim());
        }
    }

    for (step, reason) in &report.failures {
        eprintln!("{} {}: {}", style("Failed:").red().bold(), step, reason);
    }

    if report.failed() {
        return Err(SpecforgeError::StepsFailed {
            failed: report.summary.failed as usize,
            total: report.summary.total as usize,
        });
    }
    Ok(())
}
