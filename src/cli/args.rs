//! CLI argument definitions using clap derive

use crate::router::Family;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Specforge - incremental artifact generation
///
/// Turns spec manifests into SDK bindings, API schemas, and spec
/// documents, regenerating only what changed.
#[derive(Parser, Debug)]
#[command(name = "specforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SPECFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Project root (defaults to the directory containing
    /// .specforge.toml, found by walking up from the current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the generation pipeline
    Generate(GenerateArgs),

    /// Preview what a generation run would do, without writing
    Plan(PlanArgs),

    /// Compare generated output against the tracking manifest
    Audit,

    /// Delete untracked files from the output directories
    Clean(CleanArgs),

    /// Show the pipeline's kind graph
    Kinds,

    /// Show or manage configuration
    Config(ConfigArgs),

    /// Initialize a project-local .specforge.toml config
    Init(InitArgs),
}

/// Generator family filter
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyArg {
    /// Target generators
    Target,
    /// SDK language generators
    Sdk,
    /// Spec-format generators
    Spec,
}

impl From<FamilyArg> for Family {
    fn from(value: FamilyArg) -> Self {
        match value {
            FamilyArg::Target => Family::Target,
            FamilyArg::Sdk => Family::Sdk,
            FamilyArg::Spec => Family::SpecFormat,
        }
    }
}

/// Arguments for the generate command
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Ignore the build cache and regenerate everything
    #[arg(short, long)]
    pub force: bool,

    /// Compute what would happen without writing or deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Only run generators of one family
    #[arg(long, value_enum)]
    pub family: Option<FamilyArg>,

    /// Only run the generator with this name
    #[arg(long)]
    pub only: Option<String>,

    /// Keep orphaned files instead of deleting them
    #[arg(long)]
    pub no_clean: bool,
}

/// Arguments for the plan command
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Only plan generators of one family
    #[arg(long, value_enum)]
    pub family: Option<FamilyArg>,

    /// Only plan the generator with this name
    #[arg(long)]
    pub only: Option<String>,
}

/// Arguments for the clean command
#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// List what would be deleted without deleting
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path in use
    Path,

    /// Write a default global configuration file
    Init,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite existing .specforge.toml
    #[arg(short, long)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,
}
