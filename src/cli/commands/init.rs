//! Init command - create project-local .specforge.toml

use crate::cli::args::InitArgs;
use crate::config::LOCAL_CONFIG_NAME;
use crate::error::{SpecforgeError, SpecforgeResult};
use console::style;
use tokio::fs;

/// Template for project-local config
const INIT_TEMPLATE: &str = r#"# Specforge project configuration
# Settings here override your global config (~/.config/specforge/config.toml)

[project]
# specs_dir = "specs"          # where *.json spec manifests live
# output_dir = "generated"     # default output tree
# clean_orphans = true         # delete files whose spec disappeared

[generators]
targets = ["openapi"]
sdks = ["rust", "typescript"]
spec_formats = ["jsonschema"]

# Redirect one generator's output to its own directory:
# [output.sdks]
# rust = "bindings/rust"
"#;

/// Execute the init command
pub async fn execute(args: InitArgs) -> SpecforgeResult<()> {
    let dir = match args.path {
        Some(path) => path,
        None => std::env::current_dir()
            .map_err(|e| SpecforgeError::io("getting current directory", e))?,
    };
    let target = dir.join(LOCAL_CONFIG_NAME);

    if target.exists() && !args.force {
        return Err(SpecforgeError::User(format!(
            "{} already exists (use --force to overwrite)",
            target.display()
        )));
    }

    fs::create_dir_all(&dir)
        .await
        .map_err(|e| SpecforgeError::io(format!("creating {}", dir.display()), e))?;
    fs::write(&target, INIT_TEMPLATE)
        .await
        .map_err(|e| SpecforgeError::io(format!("writing {}", target.display()), e))?;

    println!("{} {}", style("Created").green().bold(), target.display());
    println!("Add spec manifests under specs/ and run: specforge generate");
    Ok(())
}
