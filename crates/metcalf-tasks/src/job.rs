//! Job types

use std::fmt;

use serde::{Deserialize, Serialize};

/// One element of a task's cartesian product: a value per set, in the
/// order the task lists its sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCombination(Vec<(String, String)>);

impl SetCombination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the combination with one more axis
    pub fn with(mut self, set: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((set.into(), value.into()));
        self
    }

    /// Value chosen for `set`, if the combination covers it
    pub fn get(&self, set: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == set)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SetCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{}", pairs.join(", "))
    }
}

/// A fully resolved unit of work, ready to launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Task the job was expanded from
    pub task: String,
    /// Command to execute
    pub command: String,
    /// Title shown in progress lines and the final report
    pub title: String,
    /// Command arguments
    pub args: Vec<String>,
    /// Directories to create before launch, relative to the run root
    pub create_dirs: Vec<String>,
    /// Set values the job was built from
    pub combination: SetCombination,
}

/// Lifecycle of a job inside the queue runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Waiting for a worker slot
    Pending,
    /// Process launched, exit not yet observed
    Running,
    /// Exited with code 0
    Successful,
    /// Exited nonzero, or could not be started
    Failed,
}

impl JobStatus {
    /// Whether the job has reached a final state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Successful | Self::Failed)
    }

    /// Terminal status for an observed exit code
    pub fn from_exit_code(code: i32) -> Self {
        if code == 0 {
            Self::Successful
        } else {
            Self::Failed
        }
    }
}
