//! Metcalf Tasks - Task matrix expansion and execution
//!
//! This crate expands task definitions into concrete jobs (one per
//! combination of the sets a task runs over) and executes the resulting
//! queue as external processes under a worker limit.

pub mod expander;
pub mod job;
pub mod launcher;
pub mod queue;
pub mod reporter;
pub mod scheduler;
pub mod sets;

pub use expander::TaskExpander;
pub use job::{Job, JobStatus, SetCombination};
pub use launcher::{CommandLauncher, ProcessLauncher};
pub use queue::{build_queue, QueueSelection};
pub use reporter::{CollectingReporter, RunEvent, RunReporter, TracingReporter};
pub use scheduler::{QueueRunner, QueueState, RunReport, RunnerOptions};
pub use sets::{ResolvedSet, SetFilters, SetResolver};
