//! Queue runner - bounded-concurrency job execution on tokio
//!
//! One control loop owns the whole [`QueueState`]. It fills every worker
//! slot up front, then handles completions one at a time: record the
//! outcome, admit the next pending job, and finalize once the last job is
//! done. Job bodies run as spawned tasks that only await their process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::{Id, JoinSet};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use metcalf_core::config::DEFAULT_MAX_WORKERS;

use crate::job::{Job, JobStatus};
use crate::launcher::ProcessLauncher;
use crate::reporter::{RunEvent, RunReporter};

/// Final outcome of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Jobs admitted, all of which reached a terminal status
    pub done: usize,
    /// Titles of successful jobs, in completion order
    pub successful: Vec<String>,
    /// Titles of failed jobs, in completion order
    pub failed: Vec<String>,
    /// Wall-clock time from start to finalization
    pub duration: Duration,
}

impl RunReport {
    /// Whether every job succeeded
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Duration as `m:ss`
    pub fn duration_label(&self) -> String {
        format_duration(self.duration)
    }
}

/// Format a duration as whole minutes and zero-padded seconds, e.g. `1:05`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Worker count from an explicit request, else the configured value, else 1.
/// Non-positive values count as 1.
pub fn resolve_max_workers(requested: Option<i64>, configured: Option<i64>) -> usize {
    requested
        .or(configured)
        .and_then(|n| usize::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_MAX_WORKERS)
}

/// Scheduler state for one run.
///
/// Jobs are admitted strictly in queue order through a cursor; every
/// admitted job is completed exactly once.
#[derive(Debug)]
pub struct QueueState {
    jobs: Vec<Job>,
    statuses: Vec<JobStatus>,
    cursor: usize,
    running: usize,
    successful: Vec<String>,
    failed: Vec<String>,
    started: Instant,
}

impl QueueState {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self {
            statuses: vec![JobStatus::Pending; jobs.len()],
            jobs,
            cursor: 0,
            running: 0,
            successful: Vec::new(),
            failed: Vec::new(),
            started: Instant::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn job(&self, index: usize) -> Option<&Job> {
        self.jobs.get(index)
    }

    pub fn status(&self, index: usize) -> Option<JobStatus> {
        self.statuses.get(index).copied()
    }

    /// Number of admitted jobs
    pub fn admitted(&self) -> usize {
        self.cursor
    }

    pub fn running(&self) -> usize {
        self.running
    }

    /// Number of jobs with a terminal status
    pub fn completed(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.completed() >= self.jobs.len()
    }

    /// Admit the next pending job, returning its index
    pub fn admit(&mut self) -> Option<usize> {
        if self.cursor >= self.jobs.len() {
            return None;
        }
        let index = self.cursor;
        self.cursor += 1;
        self.running += 1;
        self.statuses[index] = JobStatus::Running;
        Some(index)
    }

    /// Record the terminal status of a running job.
    ///
    /// Returns false, changing nothing, if the job is not running or the
    /// status is not terminal.
    pub fn complete(&mut self, index: usize, status: JobStatus) -> bool {
        if !status.is_terminal() || self.status(index) != Some(JobStatus::Running) {
            return false;
        }

        self.statuses[index] = status;
        self.running -= 1;
        let title = self.jobs[index].title.clone();
        match status {
            JobStatus::Successful => self.successful.push(title),
            _ => self.failed.push(title),
        }
        true
    }

    /// Snapshot the results so far
    pub fn report(&self) -> RunReport {
        RunReport {
            done: self.cursor,
            successful: self.successful.clone(),
            failed: self.failed.clone(),
            duration: self.started.elapsed(),
        }
    }
}

/// Options for the queue runner
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Maximum concurrent jobs
    pub max_workers: usize,
    /// Command replacing every job's own command; arguments are kept
    pub command_override: Option<String>,
    /// Directory job directories are created in
    pub root_dir: PathBuf,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            command_override: None,
            root_dir: std::env::current_dir().unwrap_or_default(),
        }
    }
}

/// What a spawned job reports back to the control loop
#[derive(Debug)]
struct JobOutcome {
    index: usize,
    status: JobStatus,
    exit_code: Option<i32>,
    duration: Duration,
}

/// Runs a job queue with at most `max_workers` jobs at a time
pub struct QueueRunner {
    options: RunnerOptions,
    launcher: Arc<dyn ProcessLauncher>,
    reporter: Arc<dyn RunReporter>,
}

impl QueueRunner {
    /// Create a new runner
    pub fn new(
        options: RunnerOptions,
        launcher: Arc<dyn ProcessLauncher>,
        reporter: Arc<dyn RunReporter>,
    ) -> Self {
        Self {
            options,
            launcher,
            reporter,
        }
    }

    /// Run every job to a terminal status and return the final report.
    ///
    /// Failed jobs never stop the run.
    pub async fn run(&self, jobs: Vec<Job>) -> RunReport {
        let max_workers = self.options.max_workers.max(1);
        let mut state = QueueState::new(jobs);
        let mut in_flight: JoinSet<JobOutcome> = JoinSet::new();
        let mut slots: HashMap<Id, usize> = HashMap::new();

        info!(jobs = state.len(), max_workers, "running queue");
        self.reporter.report(&RunEvent::QueueStarted {
            total: state.len(),
            max_workers,
        });

        while state.running() < max_workers {
            let Some(index) = state.admit() else {
                break;
            };
            self.start(&state, index, &mut in_flight, &mut slots);
        }

        while !state.is_complete() {
            let Some(joined) = in_flight.join_next_with_id().await else {
                warn!(
                    completed = state.completed(),
                    total = state.len(),
                    "no jobs left in flight before the queue completed"
                );
                break;
            };

            let outcome = match joined {
                Ok((id, outcome)) => {
                    slots.remove(&id);
                    outcome
                }
                Err(err) => {
                    let Some(index) = slots.remove(&err.id()) else {
                        continue;
                    };
                    warn!(error = %err, "job task aborted");
                    JobOutcome {
                        index,
                        status: JobStatus::Failed,
                        exit_code: None,
                        duration: Duration::ZERO,
                    }
                }
            };

            self.finish(&mut state, outcome);

            if let Some(index) = state.admit() {
                self.start(&state, index, &mut in_flight, &mut slots);
            }
            debug_assert!(state.running() <= max_workers);
        }

        let report = state.report();
        info!(
            done = report.done,
            successful = report.successful.len(),
            failed = report.failed.len(),
            "queue finished"
        );
        self.reporter.report(&RunEvent::QueueFinished(report.clone()));
        report
    }

    fn start(
        &self,
        state: &QueueState,
        index: usize,
        in_flight: &mut JoinSet<JobOutcome>,
        slots: &mut HashMap<Id, usize>,
    ) {
        let Some(job) = state.job(index).cloned() else {
            return;
        };
        let command = self
            .options
            .command_override
            .clone()
            .unwrap_or_else(|| job.command.clone());

        self.reporter.report(&RunEvent::JobStarted {
            position: index + 1,
            total: state.len(),
            task: job.task.clone(),
            title: job.title.clone(),
            command: command.clone(),
            args: job.args.clone(),
        });

        let launcher = Arc::clone(&self.launcher);
        let root_dir = self.options.root_dir.clone();
        let handle = in_flight.spawn(async move {
            execute_job(index, &job, &command, &root_dir, launcher.as_ref()).await
        });
        slots.insert(handle.id(), index);
    }

    fn finish(&self, state: &mut QueueState, outcome: JobOutcome) {
        if !state.complete(outcome.index, outcome.status) {
            warn!(index = outcome.index, "ignoring completion for a job that is not running");
            return;
        }

        let title = state
            .job(outcome.index)
            .map(|job| job.title.clone())
            .unwrap_or_default();
        self.reporter.report(&RunEvent::JobFinished {
            position: outcome.index + 1,
            title,
            status: outcome.status,
            exit_code: outcome.exit_code,
            duration: outcome.duration,
        });
    }
}

/// Create the job's directories, then launch it and wait for it to exit.
/// Anything that keeps the process from running counts as a failure.
async fn execute_job(
    index: usize,
    job: &Job,
    command: &str,
    root_dir: &Path,
    launcher: &dyn ProcessLauncher,
) -> JobOutcome {
    let started = Instant::now();
    let failed = |exit_code: Option<i32>| JobOutcome {
        index,
        status: JobStatus::Failed,
        exit_code,
        duration: started.elapsed(),
    };

    for dir in &job.create_dirs {
        if let Err(e) = tokio::fs::create_dir_all(root_dir.join(dir)).await {
            warn!(title = %job.title, dir = %dir, error = %e, "failed to create directory");
            return failed(None);
        }
    }

    match launcher.launch(command, job).await {
        Ok(code) => {
            debug!(title = %job.title, exit_code = code, "job exited");
            JobOutcome {
                index,
                status: JobStatus::from_exit_code(code),
                exit_code: Some(code),
                duration: started.elapsed(),
            }
        }
        Err(e) => {
            warn!(title = %job.title, command, error = %e, "failed to launch job");
            failed(None)
        }
    }
}
