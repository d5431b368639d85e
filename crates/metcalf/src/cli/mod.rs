//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::debug;

use metcalf_core::config::{find_config, load_config, Config, DEFAULT_CONFIG_JSON};
use metcalf_core::{ConfigError, MetcalfError};

use commands::{InitCommand, ListCommand, RunCommand};

/// Metcalf - run a matrix of build jobs with bounded concurrency
#[derive(Debug, Parser)]
#[command(name = "metcalf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print each job's command and arguments
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (default: Metcalf.json in the working directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run options when no subcommand is given
    #[command(flatten)]
    pub run: RunCommand,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the queue and run it (the default)
    Run(RunCommand),

    /// Show the jobs a run would execute
    List(ListCommand),

    /// Write a starter configuration
    Init(InitCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Some(Commands::Run(ref cmd)) => cmd.execute(&self),
            Some(Commands::List(ref cmd)) => cmd.execute(&self),
            Some(Commands::Init(ref cmd)) => cmd.execute(&self),
            None => self.run.execute(&self),
        }
    }

    /// Locate and load the configuration for this invocation
    pub fn load_configuration(&self) -> anyhow::Result<(Config, PathBuf)> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => {
                let cwd = std::env::current_dir()?;
                find_config(&cwd).ok_or_else(|| {
                    ConfigFailure::new(
                        Path::new(DEFAULT_CONFIG_JSON),
                        ConfigError::NotFound(cwd.clone()).into(),
                    )
                })?
            }
        };

        debug!(path = %path.display(), "loading configuration");
        let config = load_config(&path).map_err(|e| ConfigFailure::new(&path, e))?;
        Ok((config, path))
    }
}

/// A configuration problem found before any job was admitted
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ConfigFailure {
    /// Config file name, as shown to the user
    pub file: String,
    pub error: MetcalfError,
}

impl ConfigFailure {
    pub fn new(path: &Path, error: MetcalfError) -> Self {
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { file, error }
    }

    /// Full user-facing message
    pub fn message(&self) -> String {
        if self.error.as_config().concerns_contents() {
            format!(
                "{} Please check the {} file. Nothing was metcalfed.",
                self.error, self.file
            )
        } else {
            format!("{} Nothing was metcalfed.", self.error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_default_invocation_runs() {
        let cli = Cli::try_parse_from(["metcalf", "--tasks", "build,test", "--max-workers", "3"])
            .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(
            cli.run.selection.tasks,
            Some(vec!["build".to_string(), "test".to_string()])
        );
        assert_eq!(cli.run.max_workers, Some(3));
    }

    #[test]
    fn test_run_subcommand_with_globals() {
        let cli = Cli::try_parse_from([
            "metcalf",
            "run",
            "--set",
            "env=prod,dev",
            "--command",
            "echo",
            "--verbose",
            "--format",
            "json",
        ])
        .unwrap();

        let Some(Commands::Run(run)) = &cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(
            run.selection.sets,
            vec![(
                "env".to_string(),
                vec!["prod".to_string(), "dev".to_string()]
            )]
        );
        assert_eq!(run.command_override.as_deref(), Some("echo"));
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_rejects_malformed_set() {
        assert!(Cli::try_parse_from(["metcalf", "--set", "env"]).is_err());
        assert!(Cli::try_parse_from(["metcalf", "--set", "env="]).is_err());
    }

    #[test]
    fn test_config_failure_message() {
        let failure = ConfigFailure::new(
            Path::new("/work/Metcalf.json"),
            ConfigError::SetNotFound {
                set: "os".to_string(),
                task: "build".to_string(),
            }
            .into(),
        );

        assert_eq!(
            failure.message(),
            "Set \"os\" not found for task ID \"build\". Please check the Metcalf.json file. Nothing was metcalfed."
        );
    }

    #[test]
    fn test_missing_file_message_has_no_check_hint() {
        let failure = ConfigFailure::new(
            Path::new(DEFAULT_CONFIG_JSON),
            ConfigError::NotFound(PathBuf::from("/work")).into(),
        );

        assert_eq!(
            failure.message(),
            "No configuration file found in /work. Nothing was metcalfed."
        );
    }

    #[test]
    fn test_missing_config_is_a_config_failure() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("Metcalf.json");
        let cli = Cli::try_parse_from([
            OsStr::new("metcalf"),
            OsStr::new("--config"),
            missing.as_os_str(),
        ])
        .unwrap();

        let err = cli.load_configuration().unwrap_err();
        assert!(err.downcast_ref::<ConfigFailure>().is_some());
    }

    #[test]
    fn test_loads_explicit_config() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("matrix.json");
        std::fs::write(
            &path,
            r#"{"command": "echo", "tasks": {"a": {"run": [], "title": "a", "commandArgs": []}}}"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            OsStr::new("metcalf"),
            OsStr::new("--config"),
            path.as_os_str(),
        ])
        .unwrap();
        let (config, loaded) = cli.load_configuration().unwrap();
        assert_eq!(loaded, path);
        assert_eq!(config.command.as_deref(), Some("echo"));
    }
}
