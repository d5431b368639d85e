//! List command

use clap::Args;
use tracing::info;

use metcalf_tasks::{build_queue, Job};

use super::SelectionArgs;
use crate::cli::output;
use crate::cli::{Cli, ConfigFailure, OutputFormat};

/// Show the jobs a run would execute, without running them
#[derive(Debug, Clone, Default, Args)]
pub struct ListCommand {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Show jobs as if every job ran this command
    #[arg(long = "command", value_name = "CMD")]
    pub command_override: Option<String>,
}

impl ListCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let (config, path) = cli.load_configuration()?;
        let mut queue = build_queue(&config, &self.selection.to_selection())
            .map_err(|e| ConfigFailure::new(&path, e))?;
        info!(jobs = queue.len(), "executing list command");

        if let Some(command) = &self.command_override {
            for job in &mut queue {
                job.command = command.clone();
            }
        }

        if cli.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&queue)?);
            return Ok(());
        }

        if cli.quiet {
            return Ok(());
        }

        if queue.is_empty() {
            output::warning("No jobs in queue");
            return Ok(());
        }

        for (index, job) in queue.iter().enumerate() {
            for line in job_lines(index + 1, job, cli.verbose) {
                println!("{}", line);
            }
        }
        println!();
        println!("{} job{}", queue.len(), if queue.len() == 1 { "" } else { "s" });

        Ok(())
    }
}

fn job_lines(position: usize, job: &Job, verbose: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "  {}: {}",
        position,
        output::title_style().apply_to(&job.title)
    )];

    if verbose {
        lines.push(output::key_value("Task", &job.task));
        if !job.combination.is_empty() {
            lines.push(output::key_value("Sets", &job.combination.to_string()));
        }
        lines.push(output::key_value("Command", &job.command));
        lines.push(output::key_value("Arguments", &format!("{:?}", job.args)));
        if !job.create_dirs.is_empty() {
            lines.push(output::key_value("Directories", &job.create_dirs.join(", ")));
        }
    }

    lines
}
