//! Run progress reporting

use std::time::Duration;

use crate::job::JobStatus;
use crate::scheduler::RunReport;

/// Events emitted while a queue runs
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// The runner is about to admit the first jobs
    QueueStarted { total: usize, max_workers: usize },
    /// A job was admitted and its process is being launched
    JobStarted {
        /// 1-based admission position
        position: usize,
        total: usize,
        task: String,
        title: String,
        command: String,
        args: Vec<String>,
    },
    /// A job reached its terminal status
    JobFinished {
        position: usize,
        title: String,
        status: JobStatus,
        exit_code: Option<i32>,
        duration: Duration,
    },
    /// Every job finished; emitted exactly once per run
    QueueFinished(RunReport),
}

/// Trait for reporting queue progress
pub trait RunReporter: Send + Sync {
    /// Handle a run event
    fn report(&self, event: &RunEvent);
}

/// Simple reporter that logs to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl RunReporter for TracingReporter {
    fn report(&self, event: &RunEvent) {
        match event {
            RunEvent::QueueStarted { total, max_workers } => {
                tracing::info!(total, max_workers, "queue started");
            }
            RunEvent::JobStarted {
                position,
                total,
                title,
                command,
                ..
            } => {
                tracing::info!("Starting {}/{} {}: {}", position, total, title, command);
            }
            RunEvent::JobFinished {
                title,
                status,
                exit_code,
                duration,
                ..
            } => match status {
                JobStatus::Successful => {
                    tracing::info!("{} completed in {:.1}s", title, duration.as_secs_f64());
                }
                _ => {
                    tracing::error!(
                        exit_code = ?exit_code,
                        "{} failed after {:.1}s",
                        title,
                        duration.as_secs_f64()
                    );
                }
            },
            RunEvent::QueueFinished(report) => {
                tracing::info!(
                    "All jobs complete: {}/{} succeeded, {} failed ({})",
                    report.successful.len(),
                    report.done,
                    report.failed.len(),
                    report.duration_label()
                );
            }
        }
    }
}

/// Reporter that collects events for later inspection (useful for testing)
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: std::sync::Mutex<Vec<RunEvent>>,
}

impl CollectingReporter {
    /// Get all collected events
    pub fn events(&self) -> Vec<RunEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Titles of started jobs, in admission order
    pub fn started_titles(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RunEvent::JobStarted { title, .. } => Some(title),
                _ => None,
            })
            .collect()
    }

    /// Number of final reports emitted
    pub fn finished_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, RunEvent::QueueFinished(_)))
            .count()
    }
}

impl RunReporter for CollectingReporter {
    fn report(&self, event: &RunEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
