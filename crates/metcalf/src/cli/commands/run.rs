//! Run command - build the job queue and execute it

use std::sync::Arc;

use clap::Args;
use tracing::info;

use metcalf_tasks::scheduler::resolve_max_workers;
use metcalf_tasks::{
    build_queue, CommandLauncher, JobStatus, QueueRunner, RunEvent, RunReport, RunReporter,
    RunnerOptions, TracingReporter,
};

use super::SelectionArgs;
use crate::cli::output::{self, framed, rule};
use crate::cli::{Cli, ConfigFailure, OutputFormat};

/// Build the job queue and run it
#[derive(Debug, Clone, Default, Args)]
pub struct RunCommand {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Maximum concurrent jobs (overrides maxWorkers)
    #[arg(long, value_name = "N")]
    pub max_workers: Option<i64>,

    /// Run this command for every job instead of the configured one
    #[arg(long = "command", value_name = "CMD")]
    pub command_override: Option<String>,
}

impl RunCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let cwd = std::env::current_dir()?;
        let (config, path) = cli.load_configuration()?;

        let queue = build_queue(&config, &self.selection.to_selection())
            .map_err(|e| ConfigFailure::new(&path, e))?;
        let max_workers = resolve_max_workers(self.max_workers, config.max_workers);
        info!(jobs = queue.len(), max_workers, "executing run command");

        let reporter: Arc<dyn RunReporter> = if cli.quiet || cli.format == OutputFormat::Json {
            Arc::new(TracingReporter)
        } else {
            Arc::new(ConsoleReporter::new(cli.verbose))
        };

        let options = RunnerOptions {
            max_workers,
            command_override: self.command_override.clone(),
            root_dir: cwd.clone(),
        };
        let runner = QueueRunner::new(options, Arc::new(CommandLauncher::new(&cwd)), reporter);
        let report = runner.run(queue).await;

        if cli.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
        }

        // Failed jobs are reported, not turned into a failing exit status
        Ok(())
    }
}

/// JSON summary of a finished run
fn report_json(report: &RunReport) -> serde_json::Value {
    serde_json::json!({
        "done": report.done,
        "successful": report.successful,
        "failed": report.failed,
        "duration": report.duration_label(),
        "duration_ms": report.duration.as_millis() as u64,
    })
}

/// Lines of the final report block
fn report_lines(report: &RunReport) -> Vec<String> {
    let failed = if report.failed.is_empty() {
        "0".to_string()
    } else {
        format!("{} ({})", report.failed.len(), report.failed.join(", "))
    };

    vec![
        rule(),
        framed(&format!("Done:       {}", report.done)),
        framed(&format!("Successful: {}", report.successful.len())),
        framed(&format!("Failed:     {}", failed)),
        framed(""),
        framed(&format!("Duration:   {}s", report.duration_label())),
        rule(),
    ]
}

/// Progress line for an admitted job, plus its command and arguments when verbose
fn job_started_lines(
    position: usize,
    title: &str,
    command: &str,
    args: &[String],
    verbose: bool,
) -> Vec<String> {
    let mut lines = vec![format!(
        "  {}: {}",
        position,
        output::title_style().apply_to(title)
    )];

    if verbose {
        lines.push(output::key_value("Command", command));
        lines.push(output::key_value("Arguments", &format!("{:?}", args)));
        lines.push(String::new());
    }

    lines
}

/// Console reporter printing the queue header, progress lines and report
struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl RunReporter for ConsoleReporter {
    fn report(&self, event: &RunEvent) {
        match event {
            RunEvent::QueueStarted { total, .. } => {
                println!("{}", rule());
                println!("{}", framed(&format!("{} BUILDS IN QUEUE", total)));
                println!("{}", rule());
                println!();
            }
            RunEvent::JobStarted {
                position,
                title,
                command,
                args,
                ..
            } => {
                for line in job_started_lines(*position, title, command, args, self.verbose) {
                    println!("{}", line);
                }
            }
            RunEvent::JobFinished {
                title,
                status: JobStatus::Failed,
                exit_code,
                ..
            } => {
                if self.verbose {
                    let reason = match exit_code {
                        Some(code) => format!("exited with code {}", code),
                        None => "could not be started".to_string(),
                    };
                    output::warning(&format!("{} {}", title, reason));
                }
            }
            RunEvent::JobFinished { .. } => {}
            RunEvent::QueueFinished(report) => {
                println!();
                for line in report_lines(report) {
                    println!("{}", line);
                }
            }
        }
    }
}
