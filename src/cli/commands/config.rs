//! Config command - show or manage configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::SpecforgeResult;
use std::path::Path;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    config_path: Option<&Path>,
) -> SpecforgeResult<()> {
    match args.action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
        ConfigAction::Path => {
            match config_path {
                Some(path) => println!("{}", path.display()),
                None => println!(
                    "{} (defaults, file missing)",
                    ConfigManager::default_config_path().display()
                ),
            }
            Ok(())
        }
        ConfigAction::Init => {
            let manager = ConfigManager::new();
            manager.save(&Config::default()).await?;
            println!("Wrote {}", manager.path().display());
            Ok(())
        }
    }
}
