//! Specforge - incremental artifact generation
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use specforge::cli::{Cli, Commands};
use specforge::config::ConfigManager;
use specforge::error::SpecforgeResult;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> SpecforgeResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("specforge=warn"),
        1 => EnvFilter::new("specforge=info"),
        _ => EnvFilter::new("specforge=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Init command doesn't need config loading
    if let Commands::Init(args) = cli.command {
        return specforge::cli::commands::init(args).await;
    }

    let cwd = std::env::current_dir()
        .map_err(|e| specforge::error::SpecforgeError::io("getting current directory", e))?;

    // Project root: --project, else the directory holding the nearest
    // .specforge.toml, else cwd
    let local_config = ConfigManager::find_local_config(cli.project.as_deref().unwrap_or(&cwd));
    let project_root: PathBuf = match (&cli.project, &local_config) {
        (Some(root), _) => root.clone(),
        (None, Some(path)) => path.parent().unwrap_or(&cwd).to_path_buf(),
        (None, None) => cwd.clone(),
    };
    debug!("Project root: {}", project_root.display());

    // Config precedence: --config, then project-local, then global
    let (config, config_path) = if let Some(path) = cli.config {
        let manager = ConfigManager::with_path(path.clone());
        (manager.load_from_file(&path).await?, Some(path))
    } else if let Some(path) = local_config {
        debug!("Found local config: {}", path.display());
        let manager = ConfigManager::with_path(path.clone());
        (manager.load_from_file(&path).await?, Some(path))
    } else {
        let manager = ConfigManager::new();
        let path = manager.path().exists().then(|| manager.path().to_path_buf());
        (manager.load().await?, path)
    };

    match cli.command {
        Commands::Init(_) => unreachable!("Init handled above"),
        Commands::Generate(args) => {
            specforge::cli::commands::generate(args, &config, &project_root).await
        }
        Commands::Plan(args) => specforge::cli::commands::plan(args, &config, &project_root).await,
        Commands::Audit => specforge::cli::commands::audit(&config, &project_root).await,
        Commands::Clean(args) => {
            specforge::cli::commands::clean(args, &config, &project_root).await
        }
        Commands::Kinds => specforge::cli::commands::kinds(&config).await,
        Commands::Config(args) => {
            specforge::cli::commands::config(args, &config, config_path.as_deref()).await
        }
    }
}
