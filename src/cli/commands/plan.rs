//! Plan command - dry-run preview of the step matrix

use crate::cli::args::PlanArgs;
use crate::cli::commands::build_pipeline;
use crate::config::Config;
use crate::error::SpecforgeResult;
use crate::orchestrator::RunOptions;
use crate::plan::StepStatus;
use console::style;
use std::path::Path;

/// Execute the plan command
pub async fn execute(args: PlanArgs, config: &Config, project_root: &Path) -> SpecforgeResult<()> {
    let (orchestrator, specs) = build_pipeline(config, project_root).await?;

    let options = RunOptions {
        force: false,
        dry_run: true,
        family: args.family.map(Into::into),
        only: args.only,
        clean_orphans: config.project.clean_orphans,
    };
    let report = orchestrator.run(&specs, &options).await?;

    let records = orchestrator.plan().status(report.run_id)?;
    println!("{:<40} {:<10} {:>6}", "STEP", "STATUS", "FILES");
    println!("{}", "-".repeat(58));
    for record in &records {
        let status = match record.status {
            StepStatus::Done => style("generate").green().to_string(),
            StepStatus::Cached => style("cached").cyan().to_string(),
            StepStatus::Failed => style("failed").red().to_string(),
        };
        println!(
            "{:<40} {:<10} {:>6}",
            record.step_key.to_string(),
            status,
            record.files_produced
        );
    }

    println!();
    println!(
        "Would write {} file(s), leave {} unchanged, remove {} orphan(s)",
        style(report.files_written).bold(),
        report.files_skipped,
        report.removed.len(),
    );
    Ok(())
}
