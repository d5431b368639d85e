//! Init command

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use metcalf_core::config::{DEFAULT_CONFIG_JSON, DEFAULT_CONFIG_TEMPLATE};

use crate::cli::output;
use crate::cli::Cli;

/// Write a starter Metcalf.json
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self
            .output
            .clone()
            .unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_JSON));

        write_template(&config_path, self.force)?;

        if !cli.quiet {
            output::success(&format!(
                "Created configuration at {}",
                output::path_style().apply_to(config_path.display())
            ));
            println!();
            println!("Next steps:");
            println!("  1. Edit {} to describe your sets and tasks", config_path.display());
            println!("  2. Run {} to preview the queue", style("metcalf list").cyan());
            println!("  3. Run {} to execute it", style("metcalf").cyan());
        }

        Ok(())
    }
}

/// Write the starter template, refusing to replace an existing file unless forced
fn write_template(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use metcalf_core::config::load_config;

    #[test]
    fn test_writes_loadable_template() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_JSON);

        write_template(&path, false).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.command.as_deref(), Some("echo"));
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_JSON);
        std::fs::write(&path, "{}").unwrap();

        assert!(write_template(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

        write_template(&path, true).unwrap();
        assert!(load_config(&path).is_ok());
    }
}
